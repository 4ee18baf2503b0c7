use crate::state::AppState;
use axum::Router;

pub mod amc;
pub mod department;
pub mod jobs;
pub mod leave;
pub mod rma;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(department::router())
        .merge(amc::router())
        .merge(jobs::router())
        .merge(rma::router())
        .merge(leave::router())
}

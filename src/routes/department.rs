use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/departments",
            get(commands::department::get_departments),
        )
        .route(
            "/api/departments/save",
            post(commands::department::save_department),
        )
        .route(
            "/api/departments/deactivate/{id}",
            post(commands::department::deactivate_department),
        )
}

use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/amc/contracts", get(commands::amc::get_amc_contracts))
        .route("/api/amc/create", post(commands::amc::create_amc_contract))
        .route("/api/amc/renew", post(commands::amc::renew_amc_contract))
        .route("/api/amc/lookup", get(commands::amc::lookup_amc))
        .route(
            "/api/amc/upcoming-renewals",
            get(commands::amc::get_upcoming_renewals),
        )
        .route(
            "/api/amc/service-events",
            post(commands::amc::add_service_event),
        )
        .route(
            "/api/amc/{amc_id}/history",
            get(commands::amc::get_service_history),
        )
}

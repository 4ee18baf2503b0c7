use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/rma/tickets", get(commands::rma::get_rma_tickets))
        .route("/api/rma/create", post(commands::rma::create_rma_ticket))
        .route(
            "/api/rma/advance-status",
            post(commands::rma::advance_rma_status),
        )
        .route("/api/rma/otp/generate", post(commands::rma::generate_rma_otp))
        .route("/api/rma/otp/verify", post(commands::rma::verify_rma_otp))
}

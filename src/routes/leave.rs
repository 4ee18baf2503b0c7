use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/leave/policies", get(commands::leave::get_leave_policies))
        .route(
            "/api/leave/policies/save",
            post(commands::leave::save_leave_policy),
        )
        .route(
            "/api/leave/requests",
            get(commands::leave::get_leave_requests),
        )
        .route(
            "/api/leave/requests/create",
            post(commands::leave::create_leave_request),
        )
        .route(
            "/api/leave/requests/decide",
            post(commands::leave::decide_leave_request),
        )
        .route(
            "/api/leave/requests/{request_id}/history",
            get(commands::leave::get_leave_history),
        )
        .route("/api/leave/balance", get(commands::leave::get_leave_balance))
}

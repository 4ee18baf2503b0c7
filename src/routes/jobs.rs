use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/jobs", get(commands::jobs::get_jobs))
        .route("/api/jobs/create", post(commands::jobs::create_job))
        .route("/api/jobs/update", post(commands::jobs::update_job))
        .route("/api/jobs/lines", post(commands::jobs::update_job_lines))
        .route(
            "/api/jobs/advance-status",
            post(commands::jobs::advance_job_status),
        )
        .route("/api/jobs/board", get(commands::jobs::get_job_board))
        .route("/api/jobs/{job_id}", get(commands::jobs::get_job_detail))
}

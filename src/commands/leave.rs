use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::commands::utils::{parse_date_required, resolve_today};
use crate::core::date_math;
use crate::core::leave::{self, HalfDay};
use crate::db::{LeaveApproval, LeavePolicy, LeaveRequest};
use crate::error::{FixpointError, FixpointResult};
use crate::state::AppState;

pub async fn get_leave_policies(
    State(state): State<AppState>,
) -> FixpointResult<Json<Vec<LeavePolicy>>> {
    Ok(Json(
        sqlx::query_as::<_, LeavePolicy>("SELECT * FROM leave_policies ORDER BY leave_type ASC")
            .fetch_all(&state.pool)
            .await?,
    ))
}

#[derive(Deserialize)]
pub struct SavePolicyPayload {
    pub leave_type: String,
    pub annual_quota: f64,
    pub max_days_per_request: f64,
    pub advance_notice_days: i32,
}

pub async fn save_leave_policy(
    State(state): State<AppState>,
    Json(payload): Json<SavePolicyPayload>,
) -> FixpointResult<Json<i32>> {
    let policy_id: i32 = sqlx::query_scalar(
        "INSERT INTO leave_policies (leave_type, annual_quota, max_days_per_request, advance_notice_days)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (leave_type) DO UPDATE SET
           annual_quota = EXCLUDED.annual_quota,
           max_days_per_request = EXCLUDED.max_days_per_request,
           advance_notice_days = EXCLUDED.advance_notice_days
         RETURNING policy_id",
    )
    .bind(&payload.leave_type)
    .bind(payload.annual_quota)
    .bind(payload.max_days_per_request)
    .bind(payload.advance_notice_days)
    .fetch_one(&state.pool)
    .await?;
    Ok(Json(policy_id))
}

async fn fetch_policy(pool: &crate::db::DbPool, leave_type: &str) -> FixpointResult<LeavePolicy> {
    sqlx::query_as::<_, LeavePolicy>("SELECT * FROM leave_policies WHERE leave_type = $1")
        .bind(leave_type)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| FixpointError::Validation(format!("Unknown leave type '{}'", leave_type)))
}

/// Approved days already booked by the user for this type in the year of
/// `start`. Pending requests do not reserve balance.
async fn approved_days_in_year(
    pool: &crate::db::DbPool,
    user_id: &str,
    leave_type: &str,
    year: i32,
) -> FixpointResult<f64> {
    let used: (Option<f64>,) = sqlx::query_as(
        "SELECT SUM(days) FROM leave_requests
         WHERE user_id = $1 AND leave_type = $2 AND status = 'Approved'
         AND EXTRACT(YEAR FROM start_date)::int = $3",
    )
    .bind(user_id)
    .bind(leave_type)
    .bind(year)
    .fetch_one(pool)
    .await?;
    Ok(used.0.unwrap_or(0.0))
}

#[derive(Deserialize)]
pub struct CreateLeavePayload {
    pub user_id: String,
    pub leave_type: String,
    pub start_date: String,
    pub end_date: String,
    pub half_day: Option<String>,
    pub exclude_weekends: Option<bool>,
    pub reason: Option<String>,
    pub as_of: Option<String>,
}

pub async fn create_leave_request(
    State(state): State<AppState>,
    Json(payload): Json<CreateLeavePayload>,
) -> FixpointResult<Json<Value>> {
    let today = resolve_today(payload.as_of.as_deref());
    let start = parse_date_required(&payload.start_date, "start date")?;
    let end = parse_date_required(&payload.end_date, "end date")?;

    let half_day = payload
        .half_day
        .as_deref()
        .filter(|h| !h.trim().is_empty())
        .map(|h| h.parse::<HalfDay>())
        .transpose()?;
    if half_day.is_some() && start != end {
        return Err(FixpointError::Validation(
            "A half-day request must start and end on the same date".to_string(),
        ));
    }

    let policy = fetch_policy(&state.pool, &payload.leave_type).await?;
    let days = leave::compute_days(start, end, payload.exclude_weekends.unwrap_or(true), half_day)?;

    if days > policy.max_days_per_request {
        return Err(FixpointError::Validation(format!(
            "{} allows at most {} day(s) per request",
            policy.leave_type, policy.max_days_per_request
        )));
    }
    if date_math::days_between(today, start) < policy.advance_notice_days as i64 {
        return Err(FixpointError::Validation(format!(
            "{} requires {} day(s) advance notice",
            policy.leave_type, policy.advance_notice_days
        )));
    }

    let used = approved_days_in_year(&state.pool, &payload.user_id, &payload.leave_type, start.year())
        .await?;
    leave::check_balance(days, policy.annual_quota - used, &payload.leave_type)?;

    let request_id: i32 = sqlx::query_scalar(
        "INSERT INTO leave_requests (user_id, leave_type, start_date, end_date, half_day, days, reason, status)
         VALUES ($1, $2, $3, $4, $5, $6, $7, 'Pending') RETURNING request_id",
    )
    .bind(&payload.user_id)
    .bind(&payload.leave_type)
    .bind(start)
    .bind(end)
    .bind(&payload.half_day)
    .bind(days)
    .bind(&payload.reason)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(json!({ "request_id": request_id, "days": days })))
}

#[derive(Deserialize)]
pub struct DecideLeavePayload {
    pub request_id: i32,
    pub action: String, // 'Approved' | 'Rejected'
    pub actor: String,
    pub actor_role: Option<String>,
    pub comment: Option<String>,
}

/// Pending -> Approved | Rejected, both terminal. Every decision appends
/// one immutable history entry.
pub async fn decide_leave_request(
    State(state): State<AppState>,
    Json(payload): Json<DecideLeavePayload>,
) -> FixpointResult<Json<Value>> {
    if payload.action != "Approved" && payload.action != "Rejected" {
        return Err(FixpointError::Validation(format!(
            "Unknown decision '{}'",
            payload.action
        )));
    }

    let request = sqlx::query_as::<_, LeaveRequest>(
        "SELECT * FROM leave_requests WHERE request_id = $1",
    )
    .bind(payload.request_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| {
        FixpointError::Validation(format!("Leave request {} not found", payload.request_id))
    })?;
    if request.status != "Pending" {
        return Err(FixpointError::Validation(format!(
            "Leave request {} has already been {}",
            request.request_id,
            request.status.to_lowercase()
        )));
    }

    let mut tx = state.pool.begin().await?;
    sqlx::query("UPDATE leave_requests SET status = $1, updated_at = NOW() WHERE request_id = $2")
        .bind(&payload.action)
        .bind(payload.request_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query(
        "INSERT INTO leave_approvals (request_id, action, actor, actor_role, comment)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(payload.request_id)
    .bind(&payload.action)
    .bind(&payload.actor)
    .bind(&payload.actor_role)
    .bind(&payload.comment)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok(Json(json!({ "success": true, "status": payload.action })))
}

#[derive(Deserialize)]
pub struct LeaveListQuery {
    pub user_id: Option<String>,
}

pub async fn get_leave_requests(
    State(state): State<AppState>,
    Query(q): Query<LeaveListQuery>,
) -> FixpointResult<Json<Vec<LeaveRequest>>> {
    let requests = match q.user_id {
        Some(user_id) => {
            sqlx::query_as::<_, LeaveRequest>(
                "SELECT * FROM leave_requests WHERE user_id = $1 ORDER BY created_at DESC",
            )
            .bind(user_id)
            .fetch_all(&state.pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, LeaveRequest>(
                "SELECT * FROM leave_requests ORDER BY created_at DESC",
            )
            .fetch_all(&state.pool)
            .await?
        }
    };
    Ok(Json(requests))
}

pub async fn get_leave_history(
    State(state): State<AppState>,
    Path(request_id): Path<i32>,
) -> FixpointResult<Json<Vec<LeaveApproval>>> {
    Ok(Json(
        sqlx::query_as::<_, LeaveApproval>(
            "SELECT * FROM leave_approvals WHERE request_id = $1 ORDER BY id ASC",
        )
        .bind(request_id)
        .fetch_all(&state.pool)
        .await?,
    ))
}

#[derive(Deserialize)]
pub struct BalanceQuery {
    pub user_id: String,
    pub leave_type: String,
    pub year: Option<i32>,
    pub as_of: Option<String>,
}

#[derive(Serialize)]
pub struct LeaveBalance {
    pub leave_type: String,
    pub annual_quota: f64,
    pub used: f64,
    pub available: f64,
}

pub async fn get_leave_balance(
    State(state): State<AppState>,
    Query(q): Query<BalanceQuery>,
) -> FixpointResult<Json<LeaveBalance>> {
    let year = q
        .year
        .unwrap_or_else(|| resolve_today(q.as_of.as_deref()).year());
    let policy = fetch_policy(&state.pool, &q.leave_type).await?;
    let used = approved_days_in_year(&state.pool, &q.user_id, &q.leave_type, year).await?;
    Ok(Json(LeaveBalance {
        leave_type: policy.leave_type,
        annual_quota: policy.annual_quota,
        used,
        available: policy.annual_quota - used,
    }))
}

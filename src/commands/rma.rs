use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::commands::amc::AsOfQuery;
use crate::commands::utils::{parse_date_required, resolve_today};
use crate::core::rma::{self, OtpEntry, RmaStatus};
use crate::core::warranty::{self, Warranty};
use crate::db::RmaTicket;
use crate::error::{FixpointError, FixpointResult};
use crate::state::AppState;

#[derive(Serialize)]
pub struct RmaTicketView {
    #[serde(flatten)]
    pub ticket: RmaTicket,
    pub warranty: Warranty,
}

async fn fetch_ticket(pool: &crate::db::DbPool, rma_id: &str) -> FixpointResult<RmaTicket> {
    sqlx::query_as::<_, RmaTicket>("SELECT * FROM rma_tickets WHERE rma_id = $1")
        .bind(rma_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| FixpointError::Validation(format!("RMA ticket {} not found", rma_id)))
}

pub async fn get_rma_tickets(
    State(state): State<AppState>,
    Query(q): Query<AsOfQuery>,
) -> FixpointResult<Json<Vec<RmaTicketView>>> {
    let today = resolve_today(q.as_of.as_deref());
    let tickets = sqlx::query_as::<_, RmaTicket>(
        "SELECT * FROM rma_tickets ORDER BY created_at DESC",
    )
    .fetch_all(&state.pool)
    .await?;

    let mut views = Vec::with_capacity(tickets.len());
    for ticket in tickets {
        let warranty =
            warranty::compute_warranty(ticket.purchase_date, ticket.warranty_years.max(0) as u32, today)?;
        views.push(RmaTicketView { ticket, warranty });
    }
    Ok(Json(views))
}

#[derive(Deserialize)]
pub struct CreateRmaPayload {
    pub customer_name: String,
    pub mobile_number: String,
    pub part_name: String,
    pub part_serial: Option<String>,
    pub purchase_date: String,
    pub warranty_years: i32,
    pub service_center: Option<String>,
    pub replacement_charge: Option<f64>,
}

pub async fn create_rma_ticket(
    State(state): State<AppState>,
    Json(payload): Json<CreateRmaPayload>,
) -> FixpointResult<Json<String>> {
    if payload.warranty_years < 0 {
        return Err(FixpointError::Validation(
            "Warranty years cannot be negative".to_string(),
        ));
    }
    let purchase_date = parse_date_required(&payload.purchase_date, "purchase date")?;

    let rma_id = format!("RMA-{}", uuid::Uuid::new_v4().to_string()[..8].to_uppercase());
    sqlx::query(
        "INSERT INTO rma_tickets (rma_id, customer_name, mobile_number, part_name, part_serial,
         purchase_date, warranty_years, service_center, replacement_charge, status)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'Inbox')",
    )
    .bind(&rma_id)
    .bind(&payload.customer_name)
    .bind(&payload.mobile_number)
    .bind(&payload.part_name)
    .bind(&payload.part_serial)
    .bind(purchase_date)
    .bind(payload.warranty_years)
    .bind(&payload.service_center)
    .bind(payload.replacement_charge.unwrap_or(0.0))
    .execute(&state.pool)
    .await?;

    Ok(Json(rma_id))
}

#[derive(Deserialize)]
pub struct AdvanceRmaPayload {
    pub rma_id: String,
}

/// Moves a ticket one step along Inbox -> In-Company -> Outbox. The final
/// hop is refused here; it only happens through OTP verification.
pub async fn advance_rma_status(
    State(state): State<AppState>,
    Json(payload): Json<AdvanceRmaPayload>,
) -> FixpointResult<Json<Value>> {
    let ticket = fetch_ticket(&state.pool, &payload.rma_id).await?;
    let next = rma::validate_plain_advance(ticket.status.parse::<RmaStatus>()?)?;

    sqlx::query("UPDATE rma_tickets SET status = $1, updated_at = NOW() WHERE rma_id = $2")
        .bind(next.to_string())
        .bind(&payload.rma_id)
        .execute(&state.pool)
        .await?;
    Ok(Json(json!({ "success": true, "status": next })))
}

#[derive(Deserialize)]
pub struct GenerateOtpPayload {
    pub rma_id: String,
    pub as_of: Option<String>,
}

/// Issues a fresh 4-digit code for the ticket, replacing any earlier one.
/// The code lives only in memory; in production it goes out by SMS, here
/// it is returned so the operator screen can show it.
pub async fn generate_rma_otp(
    State(state): State<AppState>,
    Json(payload): Json<GenerateOtpPayload>,
) -> FixpointResult<Json<Value>> {
    let ticket = fetch_ticket(&state.pool, &payload.rma_id).await?;
    if ticket.status.parse::<RmaStatus>()? != RmaStatus::Outbox {
        return Err(FixpointError::Validation(
            "OTP can only be generated for a ticket in Outbox".to_string(),
        ));
    }

    let code = rma::generate_code(&mut rand::rng());
    let issued_at = resolve_today(payload.as_of.as_deref())
        .and_hms_opt(0, 0, 0)
        .unwrap_or_else(|| chrono::Local::now().naive_local());

    let mut store = state
        .otp_store
        .lock()
        .map_err(|_| FixpointError::Internal("OTP store poisoned".to_string()))?;
    store.insert(
        payload.rma_id.clone(),
        OtpEntry {
            code: code.clone(),
            issued_at,
            attempts: 0,
        },
    );

    Ok(Json(json!({ "rma_id": payload.rma_id, "otp": code })))
}

#[derive(Deserialize)]
pub struct VerifyOtpPayload {
    pub rma_id: String,
    pub otp: String,
    pub as_of: Option<String>,
}

/// Exact match delivers the ticket and stamps the delivery date. On a
/// mismatch nothing changes and the code stays valid for another try.
pub async fn verify_rma_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpPayload>,
) -> FixpointResult<Json<Value>> {
    let ticket = fetch_ticket(&state.pool, &payload.rma_id).await?;
    if ticket.status.parse::<RmaStatus>()? != RmaStatus::Outbox {
        return Err(FixpointError::Validation(
            "Only a ticket in Outbox can be delivered".to_string(),
        ));
    }

    let today = resolve_today(payload.as_of.as_deref());
    let now = today
        .and_hms_opt(0, 0, 0)
        .unwrap_or_else(|| chrono::Local::now().naive_local());

    {
        let mut store = state
            .otp_store
            .lock()
            .map_err(|_| FixpointError::Internal("OTP store poisoned".to_string()))?;
        let entry = store.get_mut(&payload.rma_id).ok_or_else(|| {
            FixpointError::OtpMismatch(
                "No OTP has been generated for this ticket. Please generate one first.".to_string(),
            )
        })?;

        match rma::verify(entry, &payload.otp, state.otp_policy, now) {
            Ok(()) => {
                store.remove(&payload.rma_id);
            }
            Err(e) => {
                entry.attempts += 1;
                return Err(e);
            }
        }
    }

    sqlx::query(
        "UPDATE rma_tickets SET status = 'Delivered', delivered_date = $1, updated_at = NOW()
         WHERE rma_id = $2",
    )
    .bind(today)
    .bind(&payload.rma_id)
    .execute(&state.pool)
    .await?;

    Ok(Json(json!({
        "success": true,
        "status": RmaStatus::Delivered,
        "delivered_date": today,
    })))
}

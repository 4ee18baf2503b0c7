use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::commands::utils::{parse_date_required, resolve_today};
use crate::core::amc::{self, AmcStatus};
use crate::core::date_math;
use crate::db::{AmcContract, AmcServiceEvent};
use crate::error::{FixpointError, FixpointResult};
use crate::state::AppState;

/// Contract record plus the values every surface derives from it.
#[derive(Serialize)]
pub struct AmcContractView {
    #[serde(flatten)]
    pub contract: AmcContract,
    pub status: AmcStatus,
    pub days_to_expiry: i64,
}

fn to_view(contract: AmcContract, today: chrono::NaiveDate) -> AmcContractView {
    let status = amc::derive_status(contract.end_date, today);
    let days_to_expiry = date_math::days_between(today, contract.end_date);
    AmcContractView {
        contract,
        status,
        days_to_expiry,
    }
}

#[derive(Deserialize)]
pub struct AsOfQuery {
    pub as_of: Option<String>,
}

pub async fn get_amc_contracts(
    State(state): State<AppState>,
    Query(q): Query<AsOfQuery>,
) -> FixpointResult<Json<Vec<AmcContractView>>> {
    let today = resolve_today(q.as_of.as_deref());
    let contracts = sqlx::query_as::<_, AmcContract>(
        "SELECT * FROM amc_contracts ORDER BY end_date ASC",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(
        contracts.into_iter().map(|c| to_view(c, today)).collect(),
    ))
}

#[derive(Deserialize)]
pub struct CreateAmcPayload {
    pub qr_code_id: String,
    pub customer_name: String,
    pub mobile_number: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub device_serial: String,
    pub device_name: String,
    pub device_type: Option<String>,
    pub start_date: String,
    pub period_months: u32,
    pub amc_amount: f64,
    pub services_included: Option<Vec<String>>,
}

pub async fn create_amc_contract(
    State(state): State<AppState>,
    Json(payload): Json<CreateAmcPayload>,
) -> FixpointResult<Json<String>> {
    if payload.period_months == 0 {
        return Err(FixpointError::Validation(
            "Contract period must be at least one month".to_string(),
        ));
    }
    let start_date = parse_date_required(&payload.start_date, "start date")?;
    let end_date = date_math::add_months_back_one_day(start_date, payload.period_months)?;

    let amc_id = format!("AMC-{}", uuid::Uuid::new_v4().to_string()[..8].to_uppercase());
    sqlx::query(
        "INSERT INTO amc_contracts (amc_id, qr_code_id, customer_name, mobile_number, email, address,
         device_serial, device_name, device_type, start_date, end_date, amc_amount, services_included)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
    )
    .bind(&amc_id)
    .bind(&payload.qr_code_id)
    .bind(&payload.customer_name)
    .bind(&payload.mobile_number)
    .bind(&payload.email)
    .bind(&payload.address)
    .bind(&payload.device_serial)
    .bind(&payload.device_name)
    .bind(&payload.device_type)
    .bind(start_date)
    .bind(end_date)
    .bind(payload.amc_amount)
    .bind(payload.services_included.map(|s| json!(s)))
    .execute(&state.pool)
    .await?;

    Ok(Json(amc_id))
}

#[derive(Deserialize)]
pub struct RenewAmcPayload {
    pub amc_id: String,
    pub new_end_date: String,
    pub new_amount: Option<f64>,
}

pub async fn renew_amc_contract(
    State(state): State<AppState>,
    Json(payload): Json<RenewAmcPayload>,
) -> FixpointResult<Json<Value>> {
    let new_end = parse_date_required(&payload.new_end_date, "renewal end date")?;

    let current: Option<(chrono::NaiveDate,)> =
        sqlx::query_as("SELECT end_date FROM amc_contracts WHERE amc_id = $1")
            .bind(&payload.amc_id)
            .fetch_optional(&state.pool)
            .await?;
    let (current_end,) = current.ok_or_else(|| {
        FixpointError::Validation(format!("AMC contract {} not found", payload.amc_id))
    })?;

    amc::validate_renewal(current_end, new_end)?;

    sqlx::query(
        "UPDATE amc_contracts SET end_date = $1, amc_amount = COALESCE($2, amc_amount),
         updated_at = NOW() WHERE amc_id = $3",
    )
    .bind(new_end)
    .bind(payload.new_amount)
    .bind(&payload.amc_id)
    .execute(&state.pool)
    .await?;

    Ok(Json(json!({ "success": true, "end_date": new_end })))
}

#[derive(Deserialize)]
pub struct LookupQuery {
    pub qr_code_id: Option<String>,
    pub mobile: Option<String>,
    pub as_of: Option<String>,
}

/// QR first, mobile as fallback. A miss returns null rather than an error:
/// no contract simply means a walk-in customer.
pub async fn lookup_amc(
    State(state): State<AppState>,
    Query(q): Query<LookupQuery>,
) -> FixpointResult<Json<Option<AmcContractView>>> {
    let today = resolve_today(q.as_of.as_deref());
    let contracts = sqlx::query_as::<_, AmcContract>("SELECT * FROM amc_contracts")
        .fetch_all(&state.pool)
        .await?;

    let hit = q
        .qr_code_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .and_then(|id| amc::find_by_qr(&contracts, id))
        .or_else(|| {
            q.mobile
                .as_deref()
                .filter(|m| !m.trim().is_empty())
                .and_then(|m| amc::find_by_mobile(&contracts, m))
        });

    Ok(Json(hit.cloned().map(|c| to_view(c, today))))
}

#[derive(Deserialize)]
pub struct RenewalWindowQuery {
    pub window_days: Option<i64>,
    pub as_of: Option<String>,
}

pub async fn get_upcoming_renewals(
    State(state): State<AppState>,
    Query(q): Query<RenewalWindowQuery>,
) -> FixpointResult<Json<Vec<AmcContractView>>> {
    let today = resolve_today(q.as_of.as_deref());
    let window = q.window_days.unwrap_or(amc::EXPIRY_WARNING_DAYS);
    let contracts = sqlx::query_as::<_, AmcContract>("SELECT * FROM amc_contracts")
        .fetch_all(&state.pool)
        .await?;

    Ok(Json(
        amc::upcoming_renewals(&contracts, window, today)
            .into_iter()
            .map(|(c, _)| to_view(c.clone(), today))
            .collect(),
    ))
}

#[derive(Deserialize)]
pub struct ServiceEventPayload {
    pub amc_id: String,
    pub service_date: String,
    pub description: String,
    pub job_id: Option<String>,
}

pub async fn add_service_event(
    State(state): State<AppState>,
    Json(payload): Json<ServiceEventPayload>,
) -> FixpointResult<Json<i32>> {
    let service_date = parse_date_required(&payload.service_date, "service date")?;
    let event_id: i32 = sqlx::query_scalar(
        "INSERT INTO amc_service_events (amc_id, service_date, description, job_id)
         VALUES ($1, $2, $3, $4) RETURNING event_id",
    )
    .bind(&payload.amc_id)
    .bind(service_date)
    .bind(&payload.description)
    .bind(&payload.job_id)
    .fetch_one(&state.pool)
    .await?;
    Ok(Json(event_id))
}

pub async fn get_service_history(
    State(state): State<AppState>,
    Path(amc_id): Path<String>,
) -> FixpointResult<Json<Vec<AmcServiceEvent>>> {
    Ok(Json(
        sqlx::query_as::<_, AmcServiceEvent>(
            "SELECT * FROM amc_service_events WHERE amc_id = $1 ORDER BY service_date ASC, event_id ASC",
        )
        .bind(amc_id)
        .fetch_all(&state.pool)
        .await?,
    ))
}

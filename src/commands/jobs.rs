use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::commands::utils::resolve_today;
use crate::core::amc;
use crate::core::billing::{self, JobTotals, PartLine, ServiceLine, DEFAULT_GST_PERCENT};
use crate::core::jobs::{self, JobStatus};
use crate::db::{AmcContract, Job, JobPart, JobService};
use crate::error::{FixpointError, FixpointResult};
use crate::state::AppState;

async fn fetch_job(pool: &crate::db::DbPool, job_id: &str) -> FixpointResult<Job> {
    sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE job_id = $1")
        .bind(job_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| FixpointError::Validation(format!("Job {} not found", job_id)))
}

async fn fetch_lines(
    pool: &crate::db::DbPool,
    job_id: &str,
) -> FixpointResult<(Vec<JobPart>, Vec<JobService>)> {
    let parts = sqlx::query_as::<_, JobPart>(
        "SELECT * FROM job_parts WHERE job_id = $1 ORDER BY position ASC, id ASC",
    )
    .bind(job_id)
    .fetch_all(pool)
    .await?;
    let services = sqlx::query_as::<_, JobService>(
        "SELECT * FROM job_services WHERE job_id = $1 ORDER BY position ASC, id ASC",
    )
    .bind(job_id)
    .fetch_all(pool)
    .await?;
    Ok((parts, services))
}

fn compute_totals(job: &Job, parts: &[JobPart], services: &[JobService]) -> JobTotals {
    let part_lines: Vec<PartLine> = parts
        .iter()
        .map(|p| PartLine {
            price: p.price,
            qty: p.qty,
            gst_percent: p.gst_percent,
        })
        .collect();
    let service_lines: Vec<ServiceLine> = services
        .iter()
        .map(|s| ServiceLine {
            price: s.price,
            original_price: s.original_price,
            is_chargeable: s.is_chargeable,
        })
        .collect();
    billing::compute_job_totals(job.base_charge, &part_lines, &service_lines, DEFAULT_GST_PERCENT)
}

#[derive(Deserialize)]
pub struct CreateJobPayload {
    pub customer_name: String,
    pub mobile_number: String,
    pub device_serial: Option<String>,
    pub device_name: String,
    pub device_type: Option<String>,
    pub problem_description: Option<String>,
    pub service_type: String,
    pub department_id: i32,
    /// QR from the device sticker, if scanned at intake.
    pub qr_code_id: Option<String>,
    pub as_of: Option<String>,
}

/// Intake: the base charge is copied from the department rate table for
/// the chosen visit type and stays editable on the job afterwards. If an
/// AMC is found (QR first, mobile fallback), coverage is snapshotted here
/// and never re-derived, so bills stay correct after the contract lapses.
pub async fn create_job(
    State(state): State<AppState>,
    Json(payload): Json<CreateJobPayload>,
) -> FixpointResult<Json<Value>> {
    let today = resolve_today(payload.as_of.as_deref());

    let dept: Option<(f64, f64, f64)> = sqlx::query_as(
        "SELECT base_charge_insite, base_charge_outsite, base_charge_remote
         FROM departments WHERE department_id = $1 AND is_active = TRUE",
    )
    .bind(payload.department_id)
    .fetch_optional(&state.pool)
    .await?;
    let (insite, outsite, remote) = dept.ok_or_else(|| {
        FixpointError::Validation(format!(
            "Department {} not found or inactive",
            payload.department_id
        ))
    })?;

    let base_charge = match payload.service_type.as_str() {
        "Insite" => insite,
        "Outsite" => outsite,
        "Remote" => remote,
        other => {
            return Err(FixpointError::Validation(format!(
                "Unknown service type '{}'",
                other
            )))
        }
    };

    let contracts = sqlx::query_as::<_, AmcContract>("SELECT * FROM amc_contracts")
        .fetch_all(&state.pool)
        .await?;
    let matched = payload
        .qr_code_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .and_then(|id| amc::find_by_qr(&contracts, id))
        .or_else(|| amc::find_by_mobile(&contracts, &payload.mobile_number));

    let (amc_id, is_amc_covered) = match matched {
        Some(contract) => (
            Some(contract.amc_id.clone()),
            amc::is_covered(contract.end_date, today),
        ),
        None => (None, false),
    };

    let job_id = format!("JOB-{}", uuid::Uuid::new_v4().to_string()[..8].to_uppercase());
    sqlx::query(
        "INSERT INTO jobs (job_id, customer_name, mobile_number, device_serial, device_name,
         device_type, problem_description, service_type, department_id, amc_id, is_amc_covered,
         base_charge, status)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 'Open')",
    )
    .bind(&job_id)
    .bind(&payload.customer_name)
    .bind(&payload.mobile_number)
    .bind(&payload.device_serial)
    .bind(&payload.device_name)
    .bind(&payload.device_type)
    .bind(&payload.problem_description)
    .bind(&payload.service_type)
    .bind(payload.department_id)
    .bind(&amc_id)
    .bind(is_amc_covered)
    .bind(base_charge)
    .execute(&state.pool)
    .await?;

    Ok(Json(json!({
        "job_id": job_id,
        "base_charge": base_charge,
        "amc_id": amc_id,
        "is_amc_covered": is_amc_covered,
    })))
}

#[derive(Deserialize)]
pub struct UpdateJobPayload {
    pub job_id: String,
    pub customer_name: String,
    pub mobile_number: String,
    pub device_serial: Option<String>,
    pub device_name: String,
    pub device_type: Option<String>,
    pub problem_description: Option<String>,
}

/// Edits the customer and device fields captured at intake. The AMC
/// snapshot and the department are left alone; line items and the base
/// charge go through `update_job_lines`.
pub async fn update_job(
    State(state): State<AppState>,
    Json(payload): Json<UpdateJobPayload>,
) -> FixpointResult<Json<Value>> {
    if payload.customer_name.trim().is_empty() || payload.mobile_number.trim().is_empty() {
        return Err(FixpointError::Validation(
            "Customer name and mobile number are required".to_string(),
        ));
    }

    let job = fetch_job(&state.pool, &payload.job_id).await?;
    jobs::validate_editable(job.status.parse::<JobStatus>()?)?;

    sqlx::query(
        "UPDATE jobs SET customer_name = $1, mobile_number = $2, device_serial = $3,
         device_name = $4, device_type = $5, problem_description = $6, updated_at = NOW()
         WHERE job_id = $7",
    )
    .bind(&payload.customer_name)
    .bind(&payload.mobile_number)
    .bind(&payload.device_serial)
    .bind(&payload.device_name)
    .bind(&payload.device_type)
    .bind(&payload.problem_description)
    .bind(&payload.job_id)
    .execute(&state.pool)
    .await?;

    Ok(Json(json!({ "success": true })))
}

#[derive(Deserialize)]
pub struct PartLinePayload {
    pub item_id: String,
    pub item_name: String,
    pub qty: i32,
    pub price: f64,
    pub gst_percent: Option<f64>,
}

#[derive(Deserialize)]
pub struct ServiceLinePayload {
    pub addon_id: String,
    pub addon_name: Option<String>,
    pub price: f64,
    pub original_price: Option<f64>,
    pub is_chargeable: bool,
}

#[derive(Deserialize)]
pub struct UpdateLinesPayload {
    pub job_id: String,
    pub base_charge: Option<f64>,
    pub parts: Vec<PartLinePayload>,
    pub services: Vec<ServiceLinePayload>,
}

/// Replaces the job's line items wholesale, the way the edit form submits
/// them. Rejected once the job is Delivered.
pub async fn update_job_lines(
    State(state): State<AppState>,
    Json(payload): Json<UpdateLinesPayload>,
) -> FixpointResult<Json<JobTotals>> {
    let job = fetch_job(&state.pool, &payload.job_id).await?;
    jobs::validate_editable(job.status.parse::<JobStatus>()?)?;

    for (idx, service) in payload.services.iter().enumerate() {
        // A covered line must keep its list price for discount reporting.
        if !service.is_chargeable && service.original_price.is_none() && service.price == 0.0 {
            return Err(FixpointError::Validation(format!(
                "AMC-covered service line {} must carry its original price",
                idx + 1
            )));
        }
    }

    let mut tx = state.pool.begin().await?;
    if let Some(base_charge) = payload.base_charge {
        sqlx::query("UPDATE jobs SET base_charge = $1, updated_at = NOW() WHERE job_id = $2")
            .bind(base_charge)
            .bind(&payload.job_id)
            .execute(&mut *tx)
            .await?;
    }
    sqlx::query("DELETE FROM job_parts WHERE job_id = $1")
        .bind(&payload.job_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM job_services WHERE job_id = $1")
        .bind(&payload.job_id)
        .execute(&mut *tx)
        .await?;

    for (idx, part) in payload.parts.iter().enumerate() {
        sqlx::query(
            "INSERT INTO job_parts (job_id, item_id, item_name, qty, price, gst_percent, position)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&payload.job_id)
        .bind(&part.item_id)
        .bind(&part.item_name)
        .bind(part.qty)
        .bind(part.price)
        .bind(part.gst_percent)
        .bind(idx as i32)
        .execute(&mut *tx)
        .await?;
    }
    for (idx, service) in payload.services.iter().enumerate() {
        sqlx::query(
            "INSERT INTO job_services (job_id, addon_id, addon_name, price, original_price, is_chargeable, position)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&payload.job_id)
        .bind(&service.addon_id)
        .bind(&service.addon_name)
        .bind(service.price)
        .bind(service.original_price)
        .bind(service.is_chargeable)
        .bind(idx as i32)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    // Hand the fresh totals back so the form preview needs no second call.
    let job = fetch_job(&state.pool, &payload.job_id).await?;
    let (parts, services) = fetch_lines(&state.pool, &payload.job_id).await?;
    Ok(Json(compute_totals(&job, &parts, &services)))
}

#[derive(Deserialize)]
pub struct AdvanceStatusPayload {
    pub job_id: String,
    pub status: String,
}

pub async fn advance_job_status(
    State(state): State<AppState>,
    Json(payload): Json<AdvanceStatusPayload>,
) -> FixpointResult<Json<Value>> {
    let job = fetch_job(&state.pool, &payload.job_id).await?;
    let from = job.status.parse::<JobStatus>()?;
    let to = payload.status.parse::<JobStatus>()?;
    jobs::validate_advance(from, to)?;

    sqlx::query("UPDATE jobs SET status = $1, updated_at = NOW() WHERE job_id = $2")
        .bind(to.to_string())
        .bind(&payload.job_id)
        .execute(&state.pool)
        .await?;
    Ok(Json(json!({ "success": true, "status": to })))
}

#[derive(Serialize)]
pub struct JobDetail {
    #[serde(flatten)]
    pub job: Job,
    pub parts: Vec<JobPart>,
    pub services: Vec<JobService>,
    pub totals: JobTotals,
    pub display_total: i64,
}

/// The single totals surface. Job-edit preview, job-card print and the
/// board all read from here instead of re-running their own formula.
pub async fn get_job_detail(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> FixpointResult<Json<JobDetail>> {
    let job = fetch_job(&state.pool, &job_id).await?;
    let (parts, services) = fetch_lines(&state.pool, &job_id).await?;
    let totals = compute_totals(&job, &parts, &services);
    let display_total = billing::display_total(totals.grand_total);
    Ok(Json(JobDetail {
        job,
        parts,
        services,
        totals,
        display_total,
    }))
}

pub async fn get_jobs(State(state): State<AppState>) -> FixpointResult<Json<Vec<Job>>> {
    Ok(Json(
        sqlx::query_as::<_, Job>("SELECT * FROM jobs ORDER BY created_at DESC")
            .fetch_all(&state.pool)
            .await?,
    ))
}

#[derive(Serialize)]
pub struct BoardColumn {
    pub status: JobStatus,
    pub job_count: i64,
    pub grand_total: f64,
}

fn build_board(
    jobs_list: &[Job],
    all_parts: &[JobPart],
    all_services: &[JobService],
) -> FixpointResult<Vec<BoardColumn>> {
    let mut parts_by_job: HashMap<&str, Vec<&JobPart>> = HashMap::new();
    for part in all_parts {
        parts_by_job.entry(part.job_id.as_str()).or_default().push(part);
    }
    let mut services_by_job: HashMap<&str, Vec<&JobService>> = HashMap::new();
    for service in all_services {
        services_by_job
            .entry(service.job_id.as_str())
            .or_default()
            .push(service);
    }

    let mut columns: Vec<BoardColumn> = JobStatus::ALL
        .iter()
        .map(|s| BoardColumn {
            status: *s,
            job_count: 0,
            grand_total: 0.0,
        })
        .collect();

    for job in jobs_list {
        let status = job.status.parse::<JobStatus>()?;
        let parts: Vec<JobPart> = parts_by_job
            .get(job.job_id.as_str())
            .map(|v| v.iter().map(|p| (*p).clone()).collect())
            .unwrap_or_default();
        let services: Vec<JobService> = services_by_job
            .get(job.job_id.as_str())
            .map(|v| v.iter().map(|s| (*s).clone()).collect())
            .unwrap_or_default();
        let totals = compute_totals(job, &parts, &services);
        let column = columns
            .iter_mut()
            .find(|c| c.status == status)
            .ok_or_else(|| FixpointError::Internal("Missing board column".to_string()))?;
        column.job_count += 1;
        column.grand_total += totals.grand_total;
    }

    Ok(columns)
}

/// Kanban summary: per-status counts and billed value, recomputed from
/// the stored lines through the same billing function as everywhere else.
/// Three queries total, however many jobs are on the board.
pub async fn get_job_board(
    State(state): State<AppState>,
) -> FixpointResult<Json<Vec<BoardColumn>>> {
    let jobs_list = sqlx::query_as::<_, Job>("SELECT * FROM jobs")
        .fetch_all(&state.pool)
        .await?;
    let all_parts = sqlx::query_as::<_, JobPart>(
        "SELECT * FROM job_parts ORDER BY position ASC, id ASC",
    )
    .fetch_all(&state.pool)
    .await?;
    let all_services = sqlx::query_as::<_, JobService>(
        "SELECT * FROM job_services ORDER BY position ASC, id ASC",
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(build_board(&jobs_list, &all_parts, &all_services)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(job_id: &str, status: &str, base_charge: f64) -> Job {
        Job {
            job_id: job_id.to_string(),
            customer_name: "Test Customer".to_string(),
            mobile_number: "9876543210".to_string(),
            device_serial: None,
            device_name: "Office Desktop".to_string(),
            device_type: None,
            problem_description: None,
            service_type: "Insite".to_string(),
            department_id: Some(1),
            amc_id: None,
            is_amc_covered: false,
            base_charge,
            status: status.to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    fn part(job_id: &str, price: f64, qty: i32) -> JobPart {
        JobPart {
            id: 0,
            job_id: job_id.to_string(),
            item_id: "P-1".to_string(),
            item_name: "SSD 512GB".to_string(),
            qty,
            price,
            gst_percent: Some(18.0),
            position: 0,
        }
    }

    #[test]
    fn test_board_groups_lines_by_job() {
        let jobs_list = vec![
            job("JOB-A", "Open", 300.0),
            job("JOB-B", "Open", 0.0),
            job("JOB-C", "Completed", 0.0),
        ];
        let parts = vec![part("JOB-A", 1000.0, 2), part("JOB-C", 500.0, 1)];

        let columns = build_board(&jobs_list, &parts, &[]).unwrap();

        let open = columns.iter().find(|c| c.status == JobStatus::Open).unwrap();
        assert_eq!(open.job_count, 2);
        // JOB-A: 300 + 2000 subtotal, 54 + 360 GST; JOB-B contributes 0.
        assert_eq!(open.grand_total, 2714.0);

        let completed = columns
            .iter()
            .find(|c| c.status == JobStatus::Completed)
            .unwrap();
        assert_eq!(completed.job_count, 1);
        assert_eq!(completed.grand_total, 590.0);

        let delivered = columns
            .iter()
            .find(|c| c.status == JobStatus::Delivered)
            .unwrap();
        assert_eq!(delivered.job_count, 0);
    }

    #[test]
    fn test_board_rejects_unknown_status() {
        let jobs_list = vec![job("JOB-A", "Archived", 0.0)];
        assert!(build_board(&jobs_list, &[], &[]).is_err());
    }
}

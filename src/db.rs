#![allow(dead_code)]
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{FromRow, Pool, Postgres};
use std::str::FromStr;

use crate::error::{FixpointError, FixpointResult};

pub type DbPool = Pool<Postgres>;

pub async fn init_pool_with_options(opts: PgConnectOptions) -> FixpointResult<DbPool> {
    // connect_lazy_with returns the pool immediately. It does not validate connection.
    Ok(PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .idle_timeout(std::time::Duration::from_secs(120))
        .max_lifetime(std::time::Duration::from_secs(300))
        .connect_lazy_with(opts))
}

pub async fn init_pool(database_url: &str) -> FixpointResult<DbPool> {
    let opts = PgConnectOptions::from_str(database_url)
        .map_err(|e| FixpointError::Internal(format!("Invalid DB URL: {}", e)))?
        .ssl_mode(PgSslMode::Disable);

    init_pool_with_options(opts).await
}

pub async fn init_database(pool: &DbPool) -> FixpointResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    let _ = ensure_seeds(pool).await;
    tracing::info!("Database ready.");
    Ok(())
}

async fn ensure_seeds(pool: &DbPool) -> FixpointResult<()> {
    // Default department so walk-in intake works on a fresh install.
    let dept_exists: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM departments")
        .fetch_one(pool)
        .await
        .unwrap_or((0,));
    if dept_exists.0 == 0 {
        let _ = sqlx::query(
            "INSERT INTO departments (code, name, base_charge_insite, base_charge_outsite, base_charge_remote)
             VALUES ('GEN', 'General Service', 300, 500, 200) ON CONFLICT DO NOTHING",
        )
        .execute(pool)
        .await;
    }

    let policy_exists: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM leave_policies")
        .fetch_one(pool)
        .await
        .unwrap_or((0,));
    if policy_exists.0 == 0 {
        for (leave_type, quota, max_per_request, notice) in [
            ("Casual Leave", 12.0, 3.0, 1),
            ("Sick Leave", 10.0, 7.0, 0),
            ("Earned Leave", 15.0, 15.0, 7),
            ("Unpaid Leave", 0.0, 30.0, 1),
        ] {
            let _ = sqlx::query(
                "INSERT INTO leave_policies (leave_type, annual_quota, max_days_per_request, advance_notice_days)
                 VALUES ($1, $2, $3, $4) ON CONFLICT DO NOTHING",
            )
            .bind(leave_type)
            .bind(quota)
            .bind(max_per_request)
            .bind(notice)
            .execute(pool)
            .await;
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Department {
    pub department_id: i32,
    pub code: String,
    pub name: String,
    pub base_charge_insite: f64,
    pub base_charge_outsite: f64,
    pub base_charge_remote: f64,
    pub is_active: bool,
    #[sqlx(default)]
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AmcContract {
    pub amc_id: String,
    pub qr_code_id: String,
    pub customer_name: String,
    pub mobile_number: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub device_serial: String,
    pub device_name: String,
    pub device_type: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub amc_amount: f64,
    // List of service names covered by the contract.
    pub services_included: Option<serde_json::Value>,
    #[sqlx(default)]
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct AmcServiceEvent {
    pub event_id: i32,
    pub amc_id: String,
    pub service_date: NaiveDate,
    pub description: String,
    pub job_id: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub job_id: String,
    pub customer_name: String,
    pub mobile_number: String,
    pub device_serial: Option<String>,
    pub device_name: String,
    pub device_type: Option<String>,
    pub problem_description: Option<String>,
    pub service_type: String, // 'Insite' | 'Outsite' | 'Remote'
    pub department_id: Option<i32>,
    pub amc_id: Option<String>,
    // Snapshot taken at AMC lookup time. Never re-derived afterwards,
    // so historical bills stay correct after the contract expires.
    pub is_amc_covered: bool,
    pub base_charge: f64,
    pub status: String,
    #[sqlx(default)]
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobPart {
    pub id: i32,
    pub job_id: String,
    pub item_id: String,
    pub item_name: String,
    pub qty: i32,
    pub price: f64,
    pub gst_percent: Option<f64>,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobService {
    pub id: i32,
    pub job_id: String,
    pub addon_id: String,
    pub addon_name: Option<String>,
    pub price: f64,
    pub original_price: Option<f64>,
    pub is_chargeable: bool,
    pub position: i32,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct RmaTicket {
    pub rma_id: String,
    pub customer_name: String,
    pub mobile_number: String,
    pub part_name: String,
    pub part_serial: Option<String>,
    pub purchase_date: NaiveDate,
    pub warranty_years: i32,
    pub service_center: Option<String>,
    pub status: String, // 'Inbox' | 'In-Company' | 'Outbox' | 'Delivered'
    pub replacement_charge: f64,
    pub delivered_date: Option<NaiveDate>,
    #[sqlx(default)]
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct LeavePolicy {
    pub policy_id: i32,
    pub leave_type: String,
    pub annual_quota: f64,
    pub max_days_per_request: f64,
    pub advance_notice_days: i32,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct LeaveRequest {
    pub request_id: i32,
    pub user_id: String,
    pub leave_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub half_day: Option<String>, // 'First Half' | 'Second Half'
    pub days: f64,
    pub reason: Option<String>,
    pub status: String, // 'Pending' | 'Approved' | 'Rejected'
    #[sqlx(default)]
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct LeaveApproval {
    pub id: i32,
    pub request_id: i32,
    pub action: String,
    pub actor: String,
    pub actor_role: Option<String>,
    pub comment: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

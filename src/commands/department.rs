use axum::{extract::Path, extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::Department;
use crate::error::{FixpointError, FixpointResult};
use crate::state::AppState;

pub async fn get_departments(State(state): State<AppState>) -> FixpointResult<Json<Vec<Department>>> {
    Ok(Json(
        sqlx::query_as::<_, Department>("SELECT * FROM departments ORDER BY code ASC")
            .fetch_all(&state.pool)
            .await?,
    ))
}

#[derive(Deserialize)]
pub struct SaveDepartmentPayload {
    pub department_id: Option<i32>,
    pub code: String,
    pub name: String,
    pub base_charge_insite: f64,
    pub base_charge_outsite: f64,
    pub base_charge_remote: f64,
    pub is_active: Option<bool>,
}

pub async fn save_department(
    State(state): State<AppState>,
    Json(payload): Json<SaveDepartmentPayload>,
) -> FixpointResult<Json<i32>> {
    if payload.code.trim().is_empty() || payload.name.trim().is_empty() {
        return Err(FixpointError::Validation(
            "Department code and name are required".to_string(),
        ));
    }

    let id = match payload.department_id {
        Some(id) => {
            sqlx::query(
                "UPDATE departments SET code = $1, name = $2, base_charge_insite = $3,
                 base_charge_outsite = $4, base_charge_remote = $5, is_active = $6,
                 updated_at = NOW() WHERE department_id = $7",
            )
            .bind(&payload.code)
            .bind(&payload.name)
            .bind(payload.base_charge_insite)
            .bind(payload.base_charge_outsite)
            .bind(payload.base_charge_remote)
            .bind(payload.is_active.unwrap_or(true))
            .bind(id)
            .execute(&state.pool)
            .await?;
            id
        }
        None => {
            sqlx::query_scalar(
                "INSERT INTO departments (code, name, base_charge_insite, base_charge_outsite, base_charge_remote, is_active)
                 VALUES ($1, $2, $3, $4, $5, $6) RETURNING department_id",
            )
            .bind(&payload.code)
            .bind(&payload.name)
            .bind(payload.base_charge_insite)
            .bind(payload.base_charge_outsite)
            .bind(payload.base_charge_remote)
            .bind(payload.is_active.unwrap_or(true))
            .fetch_one(&state.pool)
            .await?
        }
    };
    Ok(Json(id))
}

// Departments own historical jobs, so deactivation is the only removal.
pub async fn deactivate_department(
    State(state): State<AppState>,
    Path(department_id): Path<i32>,
) -> FixpointResult<Json<Value>> {
    sqlx::query("UPDATE departments SET is_active = FALSE, updated_at = NOW() WHERE department_id = $1")
        .bind(department_id)
        .execute(&state.pool)
        .await?;
    Ok(Json(json!({ "success": true })))
}

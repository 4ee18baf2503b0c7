use crate::core::rma::{OtpEntry, OtpPolicy};
use crate::db::DbPool;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Transient OTP codes keyed by RMA ticket id. Last writer wins: issuing a
/// new code for a ticket replaces the previous one.
pub type OtpStore = Arc<Mutex<HashMap<String, OtpEntry>>>;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub otp_store: OtpStore,
    pub otp_policy: OtpPolicy,
}

impl AppState {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            otp_store: Arc::new(Mutex::new(HashMap::new())),
            otp_policy: OtpPolicy::default(),
        }
    }
}

impl axum::extract::FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

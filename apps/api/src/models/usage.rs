use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Per-user letter allowance bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UsageRow {
    pub email: String,
    pub name: String,
    pub num_letters: i32,
    pub agree_promo: bool,
    pub updated_at: DateTime<Utc>,
}

//! Per-user free-letter allowance.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::models::usage::UsageRow;

pub const DEFAULT_FREE_LETTERS: u32 = 5;

#[derive(Debug, Error)]
pub enum QuotaError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageSnapshot {
    pub num_letters: u32,
    pub agree_promo: bool,
}

impl From<UsageRow> for UsageSnapshot {
    fn from(row: UsageRow) -> Self {
        Self {
            num_letters: row.num_letters.max(0) as u32,
            agree_promo: row.agree_promo,
        }
    }
}

#[async_trait]
pub trait QuotaLedger: Send + Sync {
    async fn usage(&self, email: &str) -> Result<Option<UsageSnapshot>, QuotaError>;

    /// Counts one delivered letter and stores the opt-in flag.
    /// Returns the new total for `email`.
    async fn record_letter(
        &self,
        email: &str,
        name: &str,
        agree_promo: bool,
    ) -> Result<u32, QuotaError>;
}

#[derive(Clone)]
pub struct PgQuotaLedger {
    pool: PgPool,
}

impl PgQuotaLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuotaLedger for PgQuotaLedger {
    async fn usage(&self, email: &str) -> Result<Option<UsageSnapshot>, QuotaError> {
        let row = sqlx::query_as::<_, UsageRow>("SELECT * FROM letter_usage WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(UsageSnapshot::from))
    }

    async fn record_letter(
        &self,
        email: &str,
        name: &str,
        agree_promo: bool,
    ) -> Result<u32, QuotaError> {
        let total: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO letter_usage (email, name, num_letters, agree_promo)
            VALUES ($1, $2, 1, $3)
            ON CONFLICT (email) DO UPDATE
                SET num_letters = letter_usage.num_letters + 1,
                    agree_promo = EXCLUDED.agree_promo,
                    updated_at = now()
            RETURNING num_letters
            "#,
        )
        .bind(email)
        .bind(name)
        .bind(agree_promo)
        .fetch_one(&self.pool)
        .await?;

        Ok(total.max(0) as u32)
    }
}

/// Letters still available after `used` have been sent.
pub fn remaining(limit: u32, used: u32) -> u32 {
    limit.saturating_sub(used)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_remaining_never_negative() {
        assert_eq!(remaining(5, 1), 4);
        assert_eq!(remaining(5, 5), 0);
        assert_eq!(remaining(5, 9), 0);
    }

    #[test]
    fn test_snapshot_from_row() {
        let row = UsageRow {
            email: "ana@example.com".to_string(),
            name: "Ana".to_string(),
            num_letters: 3,
            agree_promo: true,
            updated_at: Utc::now(),
        };
        assert_eq!(
            UsageSnapshot::from(row),
            UsageSnapshot {
                num_letters: 3,
                agree_promo: true
            }
        );
    }
}

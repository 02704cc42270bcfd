//! Deferred letter jobs on a Redis list, drained by a background worker.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::fulfilment::LetterService;
use crate::models::letter::RawInputBundle;

pub const QUEUE_KEY: &str = "coverletter:jobs";
/// BLPOP timeout; bounds how long the worker is deaf to shutdown.
const POP_TIMEOUT_SECS: u64 = 5;
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("job serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LetterJob {
    pub id: Uuid,
    pub bundle: RawInputBundle,
    pub enqueued_at: DateTime<Utc>,
    /// The worker will not start the job before this instant.
    pub not_before: DateTime<Utc>,
}

impl LetterJob {
    pub fn new(bundle: RawInputBundle, delay: Duration) -> Self {
        let enqueued_at = Utc::now();
        let not_before = enqueued_at
            + chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::zero());
        Self {
            id: Uuid::new_v4(),
            bundle,
            enqueued_at,
            not_before,
        }
    }

    /// How long to wait, as seen from `now`, before running the job.
    pub fn wait_time(&self, now: DateTime<Utc>) -> Duration {
        (self.not_before - now).to_std().unwrap_or(Duration::ZERO)
    }
}

#[derive(Clone)]
pub struct JobQueue {
    client: redis::Client,
}

impl JobQueue {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    pub async fn enqueue(&self, job: &LetterJob) -> Result<(), QueueError> {
        let payload = serde_json::to_string(job)?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("RPUSH")
            .arg(QUEUE_KEY)
            .arg(payload)
            .query_async::<_, ()>(&mut conn)
            .await?;
        info!(job_id = %job.id, "Letter job enqueued");
        Ok(())
    }

    async fn pop(
        &self,
        conn: &mut redis::aio::MultiplexedConnection,
    ) -> Result<Option<LetterJob>, QueueError> {
        let popped: Option<(String, String)> = redis::cmd("BLPOP")
            .arg(QUEUE_KEY)
            .arg(POP_TIMEOUT_SECS)
            .query_async(conn)
            .await?;

        match popped {
            Some((_, payload)) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }
}

/// Drains the queue forever, one job at a time.
pub async fn run_worker(queue: JobQueue, service: Arc<LetterService>) {
    info!("Letter job worker started");

    loop {
        let mut conn = match queue.client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Job worker cannot reach Redis ({e}), retrying");
                tokio::time::sleep(RECONNECT_DELAY).await;
                continue;
            }
        };

        loop {
            match queue.pop(&mut conn).await {
                Ok(Some(job)) => process(job, &service).await,
                Ok(None) => continue,
                Err(QueueError::Serialization(e)) => {
                    error!("Dropping malformed job payload: {e}");
                }
                Err(e) => {
                    warn!("Job worker lost its Redis connection ({e})");
                    break;
                }
            }
        }
    }
}

async fn process(job: LetterJob, service: &LetterService) {
    let wait = job.wait_time(Utc::now());
    if !wait.is_zero() {
        tokio::time::sleep(wait).await;
    }

    info!(job_id = %job.id, enqueued_at = %job.enqueued_at, "Processing letter job");
    match service.fulfil(&job.bundle).await {
        Ok(outcome) => info!(
            job_id = %job.id,
            remaining_letters = outcome.remaining_letters,
            "Letter job completed"
        ),
        Err(e) => error!(job_id = %job.id, "Letter job failed: {e}"),
    }
}

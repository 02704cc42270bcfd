use std::sync::Arc;

use crate::config::Config;
use crate::fulfilment::queue::JobQueue;
use crate::fulfilment::LetterService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub letters: Arc<LetterService>,
    pub queue: JobQueue,
    pub config: Config,
}

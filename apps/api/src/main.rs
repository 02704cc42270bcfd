mod config;
mod db;
mod errors;
mod extraction;
mod fetch;
mod fulfilment;
mod generation;
mod language;
mod llm_client;
mod models;
mod routes;
mod state;
#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::http::{header::CONTENT_TYPE, HeaderValue, Method};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::extraction::{RelevanceExtractor, RuleBasedRecognizer};
use crate::fetch::{ChromeLauncher, HttpPageSource, WebContentFetcher};
use crate::fulfilment::delivery::MailgunDelivery;
use crate::fulfilment::queue::{run_worker, JobQueue};
use crate::fulfilment::quota::PgQuotaLedger;
use crate::fulfilment::LetterService;
use crate::generation::pipeline::{LetterPipeline, SectionSchedule};
use crate::generation::sections::SectionWriter;
use crate::language::{DeeplTranslator, LanguageGate, WhatlangDetector};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cover letter API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    ensure_schema(&db).await?;

    // Initialize Redis
    let redis = redis::Client::open(config.redis_url.clone())?;
    info!("Redis client initialized");

    // Initialize LLM client
    let llm = LlmClient::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        config.llm_model.clone(),
    )?;
    info!("LLM client initialized (model: {})", llm.model());

    let translator = DeeplTranslator::new(
        config.deepl_api_key.clone(),
        config.deepl_api_url.clone(),
    )?;
    let gate = LanguageGate::new(Arc::new(WhatlangDetector), Arc::new(translator));

    let fetcher = WebContentFetcher::new(
        Arc::new(HttpPageSource::new()?),
        Arc::new(ChromeLauncher::new(config.chrome_path.clone())),
    );
    let extractor = RelevanceExtractor::new(Arc::new(RuleBasedRecognizer::new()));

    let schedule = if config.parallel_sections {
        SectionSchedule::Concurrent
    } else {
        SectionSchedule::Sequential
    };
    let pipeline = LetterPipeline::new(SectionWriter::new(Arc::new(llm), gate), fetcher, extractor)
        .with_schedule(schedule)
        .with_deadline(config.request_deadline);
    info!(
        "Letter pipeline ready ({:?}, deadline {}s)",
        schedule,
        config.request_deadline.as_secs()
    );

    let delivery = MailgunDelivery::new(
        config.mailgun_api_key.clone(),
        config.mailgun_domain.clone(),
        config.mail_from.clone(),
    )?;

    let letters = Arc::new(LetterService::new(
        pipeline,
        Arc::new(PgQuotaLedger::new(db)),
        Arc::new(delivery),
        config.free_letter_limit,
    ));

    let queue = JobQueue::new(redis);
    tokio::spawn(run_worker(queue.clone(), letters.clone()));
    info!("Background letter worker started");

    // Build app state
    let state = AppState {
        letters,
        queue,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.allowed_origins));

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Cross-origin access is limited to the configured front-end origins.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{origin}'");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        warn!("ALLOWED_ORIGINS is empty; cross-origin requests will be rejected");
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
}

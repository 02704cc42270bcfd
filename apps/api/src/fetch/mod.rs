//! Web Content Fetcher: visible paragraph text from a company URL.
//!
//! Two strategies, tried in order:
//! 1. Fast path: plain HTTP GET + HTML parse (`PageSource`)
//! 2. Fallback: headless browser render (`BrowserLauncher`)
//!
//! The outcome is always a tagged `FetchResult`; total failure means "no
//! grounding data", never an error for the caller.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

pub mod browser;
pub mod http;

pub use browser::ChromeLauncher;
pub use http::HttpPageSource;

/// Paragraph elements collected by either strategy.
pub const MAX_PARAGRAPHS: usize = 10;
/// The fast path must yield more than this many characters to count.
pub const MIN_FAST_PATH_CHARS: usize = 50;
/// How long the browser waits for the first paragraph to appear.
pub const BROWSER_WAIT: Duration = Duration::from_secs(10);
/// Upper bound for a whole fetch, both strategies included.
pub const FETCH_BUDGET: Duration = Duration::from_secs(45);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("invalid URL '{0}'")]
    InvalidUrl(String),

    #[error("browser error: {0}")]
    Browser(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMethod {
    Http,
    HeadlessBrowser,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub source_url: String,
    pub extracted_text: String,
    pub method: FetchMethod,
    pub succeeded: bool,
}

impl FetchResult {
    fn success(url: &str, text: String, method: FetchMethod) -> Self {
        Self {
            source_url: url.to_string(),
            extracted_text: text,
            method,
            succeeded: true,
        }
    }

    fn failed(url: &str, method: FetchMethod) -> Self {
        Self {
            source_url: url.to_string(),
            extracted_text: String::new(),
            method,
            succeeded: false,
        }
    }
}

/// Returns the raw HTML of a page. Non-2xx responses are errors.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn get_html(&self, url: &str) -> Result<String, FetchError>;
}

/// Starts a fresh browser for exactly one fetch.
///
/// Implementations are blocking; the fetcher runs them on the blocking pool.
pub trait BrowserLauncher: Send + Sync {
    fn launch(&self) -> Result<Box<dyn BrowserSession>, FetchError>;
}

/// One live browser. Must be closed before the fetch returns.
pub trait BrowserSession {
    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), FetchError>;
    fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<(), FetchError>;
    fn element_texts(&mut self, selector: &str, limit: usize) -> Result<Vec<String>, FetchError>;
    fn close(self: Box<Self>);
}

#[derive(Clone)]
pub struct WebContentFetcher {
    pages: Arc<dyn PageSource>,
    browser: Arc<dyn BrowserLauncher>,
    budget: Duration,
}

impl WebContentFetcher {
    pub fn new(pages: Arc<dyn PageSource>, browser: Arc<dyn BrowserLauncher>) -> Self {
        Self {
            pages,
            browser,
            budget: FETCH_BUDGET,
        }
    }

    /// Fetches paragraph text from `url`, falling back to the browser when the
    /// fast path errors or comes back too thin.
    ///
    /// Both strategies share one time budget. When it runs out during the
    /// browser step, the session is still closed before this returns.
    pub async fn fetch(&self, url: &str) -> FetchResult {
        let url = normalize_url(url);
        let deadline = tokio::time::Instant::now() + self.budget;

        match tokio::time::timeout_at(deadline, self.fast_path(&url)).await {
            Ok(Ok(Some(text))) => {
                info!(url = %url, chars = text.len(), "Fetched company page over HTTP");
                return FetchResult::success(&url, text, FetchMethod::Http);
            }
            Ok(Ok(None)) => {
                info!(url = %url, "HTTP page too thin, falling back to headless browser");
            }
            Ok(Err(e)) => {
                warn!(url = %url, error = %e, "HTTP fetch failed, falling back to headless browser");
            }
            Err(_) => {
                warn!(url = %url, budget_secs = self.budget.as_secs(), "HTTP fetch used up the time budget");
                return FetchResult::failed(&url, FetchMethod::Http);
            }
        }

        match self.fallback_path(&url, deadline).await {
            Ok(text) if !text.trim().is_empty() => {
                info!(url = %url, chars = text.len(), "Fetched company page with headless browser");
                FetchResult::success(&url, text, FetchMethod::HeadlessBrowser)
            }
            Ok(_) => {
                warn!(url = %url, "Headless browser found no paragraph text");
                FetchResult::failed(&url, FetchMethod::HeadlessBrowser)
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Headless browser fetch failed");
                FetchResult::failed(&url, FetchMethod::HeadlessBrowser)
            }
        }
    }

    /// `Ok(None)` means the page loaded but had too little paragraph text.
    async fn fast_path(&self, url: &str) -> Result<Option<String>, FetchError> {
        let html = self.pages.get_html(url).await?;
        let text = http::paragraph_text(&html, MAX_PARAGRAPHS);
        Ok((text.chars().count() > MIN_FAST_PATH_CHARS).then_some(text))
    }

    async fn fallback_path(
        &self,
        url: &str,
        deadline: tokio::time::Instant,
    ) -> Result<String, FetchError> {
        let launcher = self.browser.clone();
        let url = url.to_string();
        let render_deadline = deadline.into_std();

        let mut task = tokio::task::spawn_blocking(move || {
            render_paragraphs(launcher.as_ref(), &url, render_deadline)
        });

        let joined = match tokio::time::timeout_at(deadline, &mut task).await {
            Ok(joined) => joined,
            Err(_) => {
                warn!(
                    budget_secs = self.budget.as_secs(),
                    "Headless browser exceeded the time budget, waiting for it to close"
                );
                // Render steps stop at the same deadline.
                let _ = task.await;
                return Err(FetchError::Browser("time budget exhausted".to_string()));
            }
        };

        joined.map_err(|e| FetchError::Browser(format!("browser task panicked: {e}")))?
    }
}

/// Closes the wrapped session when dropped, including during a panic.
struct SessionGuard {
    session: Option<Box<dyn BrowserSession>>,
}

impl SessionGuard {
    fn session(&mut self) -> Result<&mut dyn BrowserSession, FetchError> {
        match self.session.as_deref_mut() {
            Some(session) => Ok(session),
            None => Err(FetchError::Browser("browser session already closed".to_string())),
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            session.close();
        }
    }
}

/// Drives one browser session; the session is closed on every path out.
/// Every step is bounded by `deadline`.
fn render_paragraphs(
    launcher: &dyn BrowserLauncher,
    url: &str,
    deadline: std::time::Instant,
) -> Result<String, FetchError> {
    let mut guard = SessionGuard {
        session: Some(launcher.launch()?),
    };
    let session = guard.session()?;

    session.navigate(url, remaining(deadline)?)?;
    session.wait_for("p", BROWSER_WAIT.min(remaining(deadline)?))?;
    let paragraphs = session.element_texts("p", MAX_PARAGRAPHS)?;

    Ok(paragraphs.join(" "))
}

fn remaining(deadline: std::time::Instant) -> Result<Duration, FetchError> {
    let left = deadline.saturating_duration_since(std::time::Instant::now());
    if left.is_zero() {
        return Err(FetchError::Browser("time budget exhausted".to_string()));
    }
    Ok(left)
}

/// Adds `https://` when the user typed a bare domain.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

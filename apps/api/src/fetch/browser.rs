//! Fallback path: headless Chrome via `headless_chrome`.
//!
//! One browser process per fetch. Dropping `Browser` kills the process, so
//! `close` is just an explicit drop.

use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use headless_chrome::{Browser, LaunchOptions, Tab};
use tracing::debug;

use super::{BrowserLauncher, BrowserSession, FetchError};

const DISABLE_IMAGES: &str = "--blink-settings=imagesEnabled=false";

#[derive(Debug, Clone, Default)]
pub struct ChromeLauncher {
    chrome_path: Option<PathBuf>,
}

impl ChromeLauncher {
    pub fn new(chrome_path: Option<PathBuf>) -> Self {
        Self { chrome_path }
    }
}

impl BrowserLauncher for ChromeLauncher {
    fn launch(&self) -> Result<Box<dyn BrowserSession>, FetchError> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .path(self.chrome_path.clone())
            .args(vec![OsStr::new(DISABLE_IMAGES)])
            .build()
            .map_err(|e| FetchError::Browser(e.to_string()))?;

        let browser = Browser::new(options).map_err(browser_error)?;
        let tab = browser.new_tab().map_err(browser_error)?;
        debug!("Launched headless browser");

        Ok(Box::new(ChromeSession { browser, tab }))
    }
}

struct ChromeSession {
    browser: Browser,
    tab: Arc<Tab>,
}

impl BrowserSession for ChromeSession {
    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), FetchError> {
        self.tab.set_default_timeout(timeout);
        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(browser_error)?;
        Ok(())
    }

    fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<(), FetchError> {
        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .map_err(browser_error)?;
        Ok(())
    }

    fn element_texts(&mut self, selector: &str, limit: usize) -> Result<Vec<String>, FetchError> {
        let elements = self.tab.find_elements(selector).map_err(browser_error)?;
        elements
            .iter()
            .take(limit)
            .map(|el| el.get_inner_text().map_err(browser_error))
            .collect()
    }

    fn close(self: Box<Self>) {
        let ChromeSession { browser, tab } = *self;
        drop(tab);
        drop(browser);
        debug!("Closed headless browser");
    }
}

fn browser_error(e: impl std::fmt::Display) -> FetchError {
    FetchError::Browser(e.to_string())
}

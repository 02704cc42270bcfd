//! Fast path: reqwest + scraper.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use scraper::{Html, Selector};
use tracing::debug;

use super::{FetchError, PageSource};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct HttpPageSource {
    client: reqwest::Client,
}

impl HttpPageSource {
    pub fn new() -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn get_html(&self, url: &str) -> Result<String, FetchError> {
        let parsed = url::Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;

        let response = self.client.get(parsed).send().await?;
        let status = response.status();
        debug!(url = %url, status = %status, "Company page responded");

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

/// Text of the first `limit` `<p>` elements, joined with single spaces.
pub fn paragraph_text(html: &str, limit: usize) -> String {
    let Ok(selector) = Selector::parse("p") else {
        return String::new();
    };

    Html::parse_document(html)
        .select(&selector)
        .take(limit)
        .map(|p| {
            p.text()
                .collect::<Vec<_>>()
                .join("")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_text_joins_paragraphs() {
        let html = "<html><body><h1>Title</h1><p>One.</p><div><p>Two <b>bold</b>.</p></div></body></html>";
        assert_eq!(paragraph_text(html, 10), "One. Two bold.");
    }

    #[test]
    fn test_paragraph_text_respects_limit() {
        let html: String = (0..15).map(|i| format!("<p>p{i}</p>")).collect();
        let text = paragraph_text(&html, 10);
        assert!(text.ends_with("p9"));
        assert!(!text.contains("p10"));
    }

    #[test]
    fn test_paragraph_text_collapses_whitespace() {
        let html = "<p>\n   Spread \n  out\t text </p>";
        assert_eq!(paragraph_text(html, 10), "Spread out text");
    }

    #[test]
    fn test_no_paragraphs_yields_empty() {
        assert_eq!(paragraph_text("<div>No paragraphs</div>", 10), "");
    }
}

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::fulfilment::quota::DEFAULT_FREE_LETTERS;
use crate::language::deepl::DEFAULT_DEEPL_URL;
use crate::llm_client::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub llm_model: String,
    pub deepl_api_key: String,
    pub deepl_api_url: String,
    pub mailgun_api_key: String,
    pub mailgun_domain: String,
    pub mail_from: String,
    pub allowed_origins: Vec<String>,
    pub free_letter_limit: u32,
    pub parallel_sections: bool,
    pub request_deadline: Duration,
    pub enqueue_delay: Duration,
    pub chrome_path: Option<PathBuf>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let mailgun_domain = require_env("MAILGUN_DOMAIN")?;

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_base_url: env_or("OPENAI_BASE_URL", DEFAULT_BASE_URL),
            llm_model: env_or("LLM_MODEL", DEFAULT_MODEL),
            deepl_api_key: require_env("DEEPL_API_KEY")?,
            deepl_api_url: env_or("DEEPL_API_URL", DEFAULT_DEEPL_URL),
            mailgun_api_key: require_env("MAILGUN_API_KEY")?,
            mail_from: env_or("MAIL_FROM", &format!("noreply@{mailgun_domain}")),
            mailgun_domain,
            allowed_origins: parse_origins(&env_or("ALLOWED_ORIGINS", "")),
            free_letter_limit: env_or("FREE_LETTER_LIMIT", &DEFAULT_FREE_LETTERS.to_string())
                .parse::<u32>()
                .context("FREE_LETTER_LIMIT must be a non-negative integer")?,
            parallel_sections: parse_flag(&env_or("PARALLEL_SECTIONS", "false")),
            request_deadline: Duration::from_secs(
                env_or("REQUEST_DEADLINE_SECS", "300")
                    .parse::<u64>()
                    .context("REQUEST_DEADLINE_SECS must be a number of seconds")?,
            ),
            enqueue_delay: Duration::from_secs(
                env_or("ENQUEUE_DELAY_SECS", "10")
                    .parse::<u64>()
                    .context("ENQUEUE_DELAY_SECS must be a number of seconds")?,
            ),
            chrome_path: std::env::var("CHROME_PATH").ok().map(PathBuf::from),
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/coverletter".to_string(),
            redis_url: "redis://127.0.0.1:6379".to_string(),
            openai_api_key: "sk-test".to_string(),
            openai_base_url: DEFAULT_BASE_URL.to_string(),
            llm_model: DEFAULT_MODEL.to_string(),
            deepl_api_key: "deepl-test".to_string(),
            deepl_api_url: DEFAULT_DEEPL_URL.to_string(),
            mailgun_api_key: "mg-test".to_string(),
            mailgun_domain: "mg.example.com".to_string(),
            mail_from: "noreply@mg.example.com".to_string(),
            allowed_origins: Vec::new(),
            free_letter_limit: DEFAULT_FREE_LETTERS,
            parallel_sections: false,
            request_deadline: Duration::from_secs(300),
            enqueue_delay: Duration::from_secs(10),
            chrome_path: None,
            port: 8080,
            rust_log: "info".to_string(),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Comma-separated origin list; blanks are dropped.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// env.rs

use std::env;
use std::time::Duration;

use dotenvy::dotenv;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use tracing::warn;

use crate::error::SameRustError;
use crate::utils::parse_usize;

pub const DEFAULT_BASE_URL: &str = "https://samehadaku.now";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/127.0.0.0 Safari/537.36";
pub const DEFAULT_MAX_WORKERS: usize = 7;
pub const DEFAULT_MAX_ATTEMPTS: usize = 1;
pub const DEFAULT_SCHEDULE_PER_PAGE: usize = 100;

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy)]
pub enum EnvVar {
    SAMEHADAKU_BASE_URL,
    SAMEHADAKU_USER_AGENT,
    MAX_WORKERS,
    REQUEST_TIMEOUT_SECS,
    MAX_RETRIES_ATTEMPTS,
    SCHEDULE_PER_PAGE,
    REQWEST_ERROR_WEBHOOK,
    UNKNOWN_ERROR_WEBHOOK,
}

impl EnvVar {
    // Convert EnvVar to the corresponding environment variable key
    fn as_str(&self) -> &'static str {
        match self {
            EnvVar::SAMEHADAKU_BASE_URL => "SAMEHADAKU_BASE_URL",
            EnvVar::SAMEHADAKU_USER_AGENT => "SAMEHADAKU_USER_AGENT",
            EnvVar::MAX_WORKERS => "MAX_WORKERS",
            EnvVar::REQUEST_TIMEOUT_SECS => "REQUEST_TIMEOUT_SECS",
            EnvVar::MAX_RETRIES_ATTEMPTS => "MAX_RETRIES_ATTEMPTS",
            EnvVar::SCHEDULE_PER_PAGE => "SCHEDULE_PER_PAGE",
            EnvVar::REQWEST_ERROR_WEBHOOK => "REQWEST_ERROR_WEBHOOK",
            EnvVar::UNKNOWN_ERROR_WEBHOOK => "UNKNOWN_ERROR_WEBHOOK",
        }
    }

    // Fetch the environment variable value, empty when unset
    pub fn get_config(&self) -> String {
        dotenv().ok();

        env::var(self.as_str())
            .map(|val| val.trim().to_string())
            .unwrap_or_default()
    }

    fn get_optional(&self) -> Option<String> {
        Some(self.get_config()).filter(|val| !val.is_empty())
    }

    fn get_usize_or(&self, default: usize) -> usize {
        let Some(raw) = self.get_optional() else {
            return default;
        };

        parse_usize(&raw).unwrap_or_else(|_| {
            warn!(var = self.as_str(), value = %raw, default, "not a number, using default");
            default
        })
    }
}

/// Runtime settings shared by every request a scraper issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScraperConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Upper bound on concurrently running fetches in one batch.
    pub max_workers: usize,
    /// Per-request timeout; `None` leaves the client default in place.
    pub timeout: Option<Duration>,
    pub max_attempts: usize,
    pub schedule_per_page: usize,
    pub reqwest_error_webhook: Option<String>,
    pub unknown_error_webhook: Option<String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        ScraperConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_workers: DEFAULT_MAX_WORKERS,
            timeout: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            schedule_per_page: DEFAULT_SCHEDULE_PER_PAGE,
            reqwest_error_webhook: None,
            unknown_error_webhook: None,
        }
    }
}

impl ScraperConfig {
    /// Defaults overridden by whatever is set in the environment or `.env`.
    pub fn from_env() -> Self {
        let defaults = ScraperConfig::default();

        let timeout = match EnvVar::REQUEST_TIMEOUT_SECS.get_usize_or(0) {
            0 => None,
            secs => Some(Duration::from_secs(secs as u64)),
        };

        ScraperConfig {
            base_url: EnvVar::SAMEHADAKU_BASE_URL
                .get_optional()
                .map(|url| normalize_base_url(&url))
                .unwrap_or(defaults.base_url),
            user_agent: EnvVar::SAMEHADAKU_USER_AGENT
                .get_optional()
                .unwrap_or(defaults.user_agent),
            max_workers: EnvVar::MAX_WORKERS.get_usize_or(defaults.max_workers),
            timeout,
            max_attempts: EnvVar::MAX_RETRIES_ATTEMPTS.get_usize_or(defaults.max_attempts),
            schedule_per_page: EnvVar::SCHEDULE_PER_PAGE.get_usize_or(defaults.schedule_per_page),
            reqwest_error_webhook: EnvVar::REQWEST_ERROR_WEBHOOK.get_optional(),
            unknown_error_webhook: EnvVar::UNKNOWN_ERROR_WEBHOOK.get_optional(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = normalize_base_url(base_url);
        self
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_reqwest_error_webhook(mut self, webhook_url: &str) -> Self {
        self.reqwest_error_webhook = Some(webhook_url.to_string());
        self
    }

    /// Builds the single client every worker shares.
    pub fn build_client(&self) -> Result<Client, SameRustError> {
        let mut headers = HeaderMap::new();
        let user_agent = HeaderValue::from_str(&self.user_agent)
            .map_err(|e| SameRustError::UnknownError(format!("invalid user agent: {}", e)))?;
        headers.insert(USER_AGENT, user_agent);

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(builder.build()?)
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::json;
use std::error::Error as StdError;
use std::fmt;

use crate::env::ScraperConfig;

/// Custom error enum to handle different types of errors
#[derive(Debug)]
pub enum SameRustError {
    /// Reqwest error (connection, timeout, body decoding)
    ReqwestError(reqwest::Error),
    /// Server answered with a non-success status
    HttpStatus { url: String, status: StatusCode },
    /// Payload was not valid JSON
    SerdeJsonError(serde_json::Error),
    /// Parsing int error
    ParseIntError(std::num::ParseIntError),
    /// Failed to fetch even after multiple tries error
    FailedToFetchAfterRetries,
    /// Day name outside monday..sunday
    InvalidWeekday(String),
    /// all rest errors
    UnknownError(String),
}

impl fmt::Display for SameRustError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SameRustError::ReqwestError(err) => write!(f, "Reqwest error: {}", err),
            SameRustError::HttpStatus { url, status } => {
                write!(f, "Request to {} failed with status {}", url, status)
            }
            SameRustError::SerdeJsonError(err) => write!(f, "Invalid JSON payload: {}", err),
            SameRustError::ParseIntError(err) => write!(f, "Failed to parse int error: {}", err),
            SameRustError::FailedToFetchAfterRetries => write!(f, "Failed to fetch after retries"),
            SameRustError::InvalidWeekday(day) => write!(f, "Unknown weekday: {}", day),
            SameRustError::UnknownError(err) => write!(f, "Std error occured: {}", err),
        }
    }
}

impl From<reqwest::Error> for SameRustError {
    fn from(err: reqwest::Error) -> Self {
        SameRustError::ReqwestError(err)
    }
}

impl From<serde_json::Error> for SameRustError {
    fn from(err: serde_json::Error) -> Self {
        SameRustError::SerdeJsonError(err)
    }
}

impl From<std::num::ParseIntError> for SameRustError {
    fn from(err: std::num::ParseIntError) -> Self {
        SameRustError::ParseIntError(err)
    }
}

impl StdError for SameRustError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            SameRustError::ReqwestError(err) => Some(err),
            SameRustError::SerdeJsonError(err) => Some(err),
            SameRustError::ParseIntError(err) => Some(err),
            SameRustError::HttpStatus { .. }
            | SameRustError::FailedToFetchAfterRetries
            | SameRustError::InvalidWeekday(_)
            | SameRustError::UnknownError(_) => None,
        }
    }
}

impl SameRustError {
    /// Webhook configured for this kind of failure, if any.
    pub fn webhook_url<'a>(&self, config: &'a ScraperConfig) -> Option<&'a str> {
        let webhook = match self {
            SameRustError::ReqwestError(_)
            | SameRustError::HttpStatus { .. }
            | SameRustError::FailedToFetchAfterRetries => &config.reqwest_error_webhook,
            SameRustError::SerdeJsonError(_) | SameRustError::UnknownError(_) => {
                &config.unknown_error_webhook
            }
            SameRustError::ParseIntError(_) | SameRustError::InvalidWeekday(_) => return None,
        };

        webhook.as_deref().filter(|url| !url.is_empty())
    }

    /// Posts the error to its webhook without blocking the caller.
    ///
    /// Needs a running tokio runtime when a webhook is configured.
    pub fn report(&self, config: &ScraperConfig) {
        if let Some(webhook_url) = self.webhook_url(config) {
            send_error_to_webhook(webhook_url, &self.to_string());
        }
    }
}

fn send_error_to_webhook(webhook_url: &str, error_message: &str) {
    let webhook_url = webhook_url.to_string();
    let error_message = error_message.to_string();

    tokio::task::spawn_blocking(move || {
        let client = Client::new();
        let now: DateTime<Utc> = Utc::now();
        let timestamp = now.format("%Y-%m-%d %H:%M:%S").to_string();

        let content = json!({
            "Timestamp": timestamp,
            "Error": error_message,
        })
        .to_string();

        let payload = json!({
            "content": content,
        });

        // Perform the blocking HTTP request
        if let Err(e) = client.post(&webhook_url).json(&payload).send() {
            tracing::debug!(error = %e, "failed to deliver error webhook");
        }
    });
}

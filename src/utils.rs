use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use scraper::ElementRef;
use serde_json::Value;
use tracing::debug;

use crate::{error::SameRustError, model::NOT_AVAILABLE};

lazy_static! {
    static ref NUMBER_RE: Regex = Regex::new(r"\d+").unwrap();
}

/// Fetches data from the specified URL.
///
/// Returns the body of the page as a string. Tries at most `max_attempts`
/// times (at least once) and hands back the last error.
pub async fn get_curl(
    client: &Client,
    url: &str,
    max_attempts: usize,
) -> Result<String, SameRustError> {
    let mut last_error = None;

    for attempt in 1..=max_attempts.max(1) {
        debug!(url, attempt, "GET");

        match fetch_once(client, url).await {
            Ok(body) => return Ok(body),
            Err(e) => {
                debug!(url, attempt, error = %e, "attempt failed");
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or(SameRustError::FailedToFetchAfterRetries))
}

async fn fetch_once(client: &Client, url: &str) -> Result<String, SameRustError> {
    let response = client.get(url).send().await?;
    let status = response.status();

    if !status.is_success() {
        return Err(SameRustError::HttpStatus {
            url: url.to_string(),
            status,
        });
    }

    Ok(response.text().await?)
}

/// Like [`get_curl`] but decodes the body as JSON. A blank body is `Null`.
pub async fn get_json(
    client: &Client,
    url: &str,
    max_attempts: usize,
) -> Result<Value, SameRustError> {
    let body = get_curl(client, url, max_attempts).await?;

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    Ok(serde_json::from_str(&body)?)
}

pub fn parse_usize(s: &str) -> Result<usize, SameRustError> {
    s.trim().parse::<usize>().map_err(SameRustError::ParseIntError)
}

/// Last run of digits in `text`, e.g. 649 for "Page 1 of 649".
pub fn last_number(text: &str) -> Option<u32> {
    NUMBER_RE
        .find_iter(text)
        .last()
        .and_then(|m| m.as_str().parse::<u32>().ok())
}

/// Whitespace-trimmed text content of an element.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Value of `attr` on `element`, or the "N/A" sentinel.
pub fn attr_or_na(element: Option<ElementRef<'_>>, attr: &str) -> String {
    element
        .and_then(|e| e.value().attr(attr))
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Trimmed text of `element`, or the "N/A" sentinel.
pub fn text_or_na(element: Option<ElementRef<'_>>) -> String {
    element
        .map(element_text)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, Response};
use reqwest::header::RETRY_AFTER;
use serde::Deserialize;

/// Internet Archive scrape API; `total_only=true` returns just the hit count
pub const SCRAPE_ENDPOINT: &str = "https://archive.org/services/search/v1/scrape";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// Statuses whose Retry-After header replaces the computed backoff
const RETRY_AFTER_STATUSES: [u16; 3] = [413, 429, 503];

/// Something that can count archive documents for a license identifier.
///
/// The orchestrator only depends on this trait so runs can be exercised
/// without the network.
pub trait LicenseSearch {
    fn count(&self, license: &str) -> Result<u64>;
}

/// Archive search query matching documents whose license URL is `license`
pub fn license_query(license: &str) -> String {
    format!(
        "/metadata/licenseurl:(\"http://creativecommons.org/{}\")",
        license
    )
}

/// Transient-failure retry settings for search requests
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub total: u32,
    /// Seconds; retry `n` waits `backoff_factor * 2^(n-1)`
    pub backoff_factor: f64,
    pub backoff_max: Duration,
    pub status_forcelist: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            total: 5,
            backoff_factor: 10.0,
            backoff_max: Duration::from_secs(120),
            status_forcelist: vec![403, 408, 429, 500, 502, 503, 504],
        }
    }
}

impl RetryPolicy {
    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.status_forcelist.contains(&status)
    }

    /// Wait before retry number `retry` (1-based). The first retry is immediate.
    pub fn backoff(&self, retry: u32) -> Duration {
        if retry <= 1 {
            return Duration::ZERO;
        }
        let exponent = (retry - 1).min(31) as i32;
        let seconds = self.backoff_factor * 2f64.powi(exponent);
        let capped = seconds.min(self.backoff_max.as_secs_f64()).max(0.0);
        Duration::from_secs_f64(capped)
    }

    fn delay(&self, retry: u32, retry_after: Option<Duration>) -> Duration {
        retry_after.unwrap_or_else(|| self.backoff(retry))
    }
}

#[derive(Debug, Deserialize)]
struct ScrapeTotal {
    total: Option<u64>,
    error: Option<String>,
}

/// Parse a `total_only` scrape response body into a document count
pub fn parse_total(body: &str) -> Result<u64> {
    let parsed: ScrapeTotal =
        serde_json::from_str(body).context("Failed to parse archive search response")?;

    if let Some(error) = parsed.error {
        bail!("Archive search error: {}", error);
    }

    parsed
        .total
        .ok_or_else(|| anyhow::anyhow!("Archive search response has no total"))
}

fn retry_after(response: &Response) -> Option<Duration> {
    if !RETRY_AFTER_STATUSES.contains(&response.status().as_u16()) {
        return None;
    }
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| parse_retry_after(value, Utc::now()))
}

/// Parse a `Retry-After` value: delta-seconds or an HTTP-date.
///
/// Dates already in the past mean retry immediately.
pub fn parse_retry_after(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let date = DateTime::parse_from_rfc2822(value).ok()?;
    let wait = date.with_timezone(&Utc) - now;
    Some(wait.to_std().unwrap_or(Duration::ZERO))
}

/// Blocking client for the archive scrape endpoint
#[derive(Debug, Clone)]
pub struct ArchiveSearch {
    client: Client,
    endpoint: String,
    retry: RetryPolicy,
}

impl ArchiveSearch {
    pub fn new() -> Result<ArchiveSearch> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(
                "quantifying-internetarchive-fetched/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(ArchiveSearch::with_client(
            client,
            SCRAPE_ENDPOINT,
            RetryPolicy::default(),
        ))
    }

    pub fn with_client(client: Client, endpoint: &str, retry: RetryPolicy) -> ArchiveSearch {
        ArchiveSearch {
            client,
            endpoint: endpoint.to_string(),
            retry,
        }
    }

    fn send_with_retry(&self, query: &str) -> Result<Response> {
        let mut retries = 0;

        loop {
            let attempt = self
                .client
                .get(&self.endpoint)
                .query(&[("q", query), ("total_only", "true")])
                .send();

            let (reason, retry_after) = match attempt {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }
                    if !self.retry.is_retryable_status(status.as_u16()) {
                        bail!("Archive search returned {}", status);
                    }
                    (format!("status {}", status), retry_after(&response))
                }
                Err(e) if e.is_connect() || e.is_timeout() || e.is_request() => {
                    (e.to_string(), None)
                }
                Err(e) => return Err(e).context("Failed to send archive search request"),
            };

            if retries >= self.retry.total {
                bail!(
                    "Max retries ({}) exceeded for archive search, last failure: {}",
                    self.retry.total,
                    reason
                );
            }
            retries += 1;

            let delay = self.retry.delay(retries, retry_after);
            log::warn!(
                "Archive search failed ({}), retry {}/{} in {:.0}s",
                reason,
                retries,
                self.retry.total,
                delay.as_secs_f64()
            );
            thread::sleep(delay);
        }
    }
}

impl LicenseSearch for ArchiveSearch {
    fn count(&self, license: &str) -> Result<u64> {
        let response = self.send_with_retry(&license_query(license))?;
        let body = response
            .text()
            .context("Failed to read archive search response")?;
        parse_total(&body)
    }
}

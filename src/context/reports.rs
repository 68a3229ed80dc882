//! Bug report and telemetry records and their HTTP submission.

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::environment::{app_version, os_version, PRODUCT_NAME};
use super::error_log::ErrorDetails;
use crate::error::{Error, Result};

/// Timeout for bug report submission.
pub const BUG_REPORT_TIMEOUT: Duration = Duration::from_secs(3);

/// Timeout for telemetry submission.
pub const TELEMETRY_TIMEOUT: Duration = Duration::from_secs(1);

// ─────────────────────────────────────────────────────────────────────────────
// Records
// ─────────────────────────────────────────────────────────────────────────────

/// Error record sent to the bug report endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BugReport {
    pub time_stamp: DateTime<Utc>,
    pub message: String,
    pub product: String,
    pub version: String,
    pub win_version: String,
    pub stack_trace: String,
}

impl BugReport {
    /// Build a report from captured error details and an optional caller message.
    pub fn new(details: &ErrorDetails, message: Option<&str>) -> Self {
        let message = match message {
            Some(msg) if !msg.is_empty() => format!("{}\r\n{}", msg, details.message),
            _ => details.message.clone(),
        };

        Self {
            time_stamp: Utc::now(),
            message,
            product: PRODUCT_NAME.to_string(),
            version: app_version().to_string(),
            win_version: os_version(),
            stack_trace: format!("{}\r\n\r\n{}", details.source, details.stack_trace)
                .trim()
                .to_string(),
        }
    }
}

/// Usage event sent to the telemetry endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Telemetry {
    pub version: String,
    pub registered: bool,
    pub operation: String,
    pub data: Option<String>,
    pub access: i32,
    /// Seconds since the application started
    pub time: i32,
}

// ─────────────────────────────────────────────────────────────────────────────
// HTTP Submission
// ─────────────────────────────────────────────────────────────────────────────

/// Sends JSON payloads to remote endpoints.
pub trait HttpPoster: Send + Sync {
    /// POST `body` to `url`; any non-2xx answer is an error.
    fn post_json(&self, url: &str, body: &serde_json::Value, timeout: Duration) -> Result<()>;
}

/// `HttpPoster` backed by a blocking reqwest client.
#[derive(Debug, Clone, Default)]
pub struct ReqwestPoster {
    client: reqwest::blocking::Client,
}

impl ReqwestPoster {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HttpPoster for ReqwestPoster {
    fn post_json(&self, url: &str, body: &serde_json::Value, timeout: Duration) -> Result<()> {
        debug!("POST {}", url);
        let response = self.client.post(url).timeout(timeout).json(body).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

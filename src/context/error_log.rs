//! Append-only error log file and captured error details.

use chrono::Local;
use std::backtrace::Backtrace;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::panic::PanicHookInfo;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Name of the error log inside the common folder.
pub const ERROR_LOG_FILE: &str = "MarkdownMonsterErrors.txt";

// ─────────────────────────────────────────────────────────────────────────────
// Error Details
// ─────────────────────────────────────────────────────────────────────────────

/// Everything recorded about a failure: message, origin and stack trace.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDetails {
    /// Message of the root cause
    pub message: String,
    /// Where the failure originated (error chain or panic location)
    pub source: String,
    /// Captured backtrace
    pub stack_trace: String,
}

impl ErrorDetails {
    /// Capture details from an error, using its innermost cause as the message.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut chain = vec![err.to_string()];
        let mut root = err;
        while let Some(next) = root.source() {
            chain.push(next.to_string());
            root = next;
        }

        Self {
            message: root.to_string(),
            source: chain.join(" -> "),
            stack_trace: Backtrace::force_capture().to_string(),
        }
    }

    /// Capture details from a panic.
    pub fn from_panic(info: &PanicHookInfo<'_>) -> Self {
        let payload = info.payload();
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };

        let source = info
            .location()
            .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_else(|| "unknown location".to_string());

        Self {
            message,
            source,
            stack_trace: Backtrace::force_capture().to_string(),
        }
    }

    /// Build details from plain text (no backtrace).
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: String::new(),
            stack_trace: String::new(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Error Log
// ─────────────────────────────────────────────────────────────────────────────

/// Plain-text UTF-8 log with one timestamped entry per append.
#[derive(Debug, Clone)]
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    /// Log living in `common_folder`.
    pub fn new(common_folder: &Path) -> Self {
        Self {
            path: common_folder.join(ERROR_LOG_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry prefixed with the local time.
    pub fn append(&self, text: &str) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.write_error(e))?;

        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(file, "{} - {}", stamp, text).map_err(|e| self.write_error(e))
    }

    /// Full log contents, empty when nothing has been logged yet.
    pub fn read(&self) -> Result<String> {
        if !self.path.exists() {
            return Ok(String::new());
        }
        Ok(fs::read_to_string(&self.path)?)
    }

    fn write_error(&self, source: std::io::Error) -> Error {
        Error::FileWrite {
            path: self.path.clone(),
            source,
        }
    }
}

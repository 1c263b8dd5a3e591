//! Error types for Tagwatch.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Recoverability hints for automation
//! - Remediation suggestions for humans
//!
//! Only conditions that stop the tracker surface here. Reader timeouts,
//! malformed lines and full-registry drops are steady-state outcomes of a
//! cycle and never become an `Error`.
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Reader Disconnected
//!   Reason: transport closed: /dev/ttyACM0
//!   Fix: Check the reader cable and power, then restart tracking.
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for Tagwatch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Configuration file errors (registry, estimator, transport sections).
    Config,
    /// Line source errors (device gone, stream closed).
    Transport,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Transport => write!(f, "transport"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for Tagwatch.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid estimator parameters: {0}")]
    InvalidEstimator(String),

    #[error("config file not found: {path}")]
    ConfigNotFound { path: String },

    // Transport errors (20-29)
    #[error("transport closed: {source_name}")]
    TransportClosed { source_name: String },

    #[error("transport failure: {0}")]
    TransportFailure(String),

    #[error("reader device unavailable: {device}")]
    DeviceUnavailable { device: String },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Transport errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidEstimator(_) => 11,
            Error::ConfigNotFound { .. } => 12,
            Error::TransportClosed { .. } => 20,
            Error::TransportFailure(_) => 21,
            Error::DeviceUnavailable { .. } => 22,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) | Error::InvalidEstimator(_) | Error::ConfigNotFound { .. } => {
                ErrorCategory::Config
            }

            Error::TransportClosed { .. }
            | Error::TransportFailure(_)
            | Error::DeviceUnavailable { .. } => ErrorCategory::Transport,

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether this error is potentially recoverable.
    ///
    /// Tracker state is not persisted, so "recoverable" means the operator can
    /// fix the cause and start a fresh run.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Config(_) => true,
            Error::InvalidEstimator(_) => true,
            Error::ConfigNotFound { .. } => true,

            // Reader unplugged mid-run: no further reads in this process
            Error::TransportClosed { .. } => false,
            Error::TransportFailure(_) => false,
            Error::DeviceUnavailable { .. } => true,

            Error::Io(_) => true,
            Error::Json(_) => true,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) => {
                "Run 'tagwatch config validate' and fix the reported field."
            }
            Error::InvalidEstimator(_) => {
                "Check the estimator section: variances and decay must be positive, transition_rate in [0, 1]."
            }
            Error::ConfigNotFound { .. } => {
                "Pass an existing file to --config, or unset TAGWATCH_CONFIG to use defaults."
            }

            Error::TransportClosed { .. } => {
                "Check the reader cable and power, then restart tracking."
            }
            Error::TransportFailure(_) => {
                "The line source failed mid-read. Restart tracking; if persistent, check the device driver."
            }
            Error::DeviceUnavailable { .. } => {
                "Check the device path and permissions (e.g. membership of the dialout group)."
            }

            Error::Io(_) => "Check file paths and permissions, then retry.",
            Error::Json(_) => {
                "Invalid JSON in file. Check syntax with 'jq . <file>' or remove the file to use defaults."
            }
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Configuration Error",
            Error::InvalidEstimator(_) => "Invalid Estimator Configuration",
            Error::ConfigNotFound { .. } => "Configuration Not Found",

            Error::TransportClosed { .. } => "Reader Disconnected",
            Error::TransportFailure(_) => "Transport Failure",
            Error::DeviceUnavailable { .. } => "Reader Device Unavailable",

            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Additional structured context (e.g., device path).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::ConfigNotFound { path } => {
                context.insert("path".to_string(), serde_json::json!(path));
            }
            Error::TransportClosed { source_name } => {
                context.insert("source".to_string(), serde_json::json!(source_name));
            }
            Error::DeviceUnavailable { device } => {
                context.insert("device".to_string(), serde_json::json!(device));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            context,
        }
    }
}

impl StructuredError {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        red = red,
        cyan = cyan,
        reset = reset,
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}

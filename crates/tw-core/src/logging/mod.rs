//! Structured logging foundation for tagwatch.
//!
//! Provides dual-mode logging:
//! - Human-readable console output for interactive use
//! - Machine-parseable JSONL for pipelines
//!
//! # Usage
//!
//! ```ignore
//! use tw_core::logging::{init_logging, LogConfig, LogContext, Stage, event_names};
//!
//! let config = LogConfig::from_env(None, None);
//! init_logging(&config);
//!
//! let ctx = LogContext::new(generate_run_id());
//! tw_core::log_event!(ctx, INFO, event_names::RUN_STARTED, Stage::Init, "tracking started");
//! ```
//!
//! stdout is reserved for command payloads; all log output goes to stderr.
//! Library code logs at debug/trace with an `event` field; lifecycle events
//! from the binary go through [`log_event!`](crate::log_event).

pub mod config;
pub mod events;

pub use config::{LogConfig, LogFormat, LogLevel};
pub use events::{event_names, LogContext, Stage};

use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Targets governed by the configured level.
const LOG_TARGETS: [&str; 2] = ["tw_core", "tagwatch"];

fn default_filter(level: LogLevel) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Filter directives for a resolved config.
///
/// `RUST_LOG` directives are used verbatim only when neither a CLI flag nor
/// `TAGWATCH_LOG` pinned the level.
fn filter_directives(config: &LogConfig, rust_log: Option<&str>) -> String {
    match rust_log.map(str::trim) {
        Some(directives) if !config.level_pinned && !directives.is_empty() => {
            directives.to_string()
        }
        _ => default_filter(config.level),
    }
}

/// Initialize the logging subsystem.
///
/// Call once at startup. A second call leaves the first subscriber in place.
pub fn init_logging(config: &LogConfig) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = EnvFilter::try_new(filter_directives(config, rust_log.as_deref()))
        .unwrap_or_else(|_| EnvFilter::new(default_filter(config.level)));

    let result = match config.format {
        LogFormat::Human => {
            let use_ansi = std::io::stderr().is_terminal();
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(use_ansi);

            if config.timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer)
                    .try_init()
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer.without_time())
                    .try_init()
            }
        }
        LogFormat::Jsonl => {
            let json_layer = fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(json_layer)
                .try_init()
        }
    };

    if let Err(err) = result {
        tracing::debug!(error = %err, "logging already initialized");
    }
}

/// Generate a unique run ID for this invocation.
pub fn generate_run_id() -> String {
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    format!("run-{}", &uuid[..12])
}

/// Convenience macro for structured event logging with context.
///
/// Usage:
/// ```ignore
/// log_event!(ctx, INFO, event_names::RUN_STARTED, Stage::Init, "tracking started");
/// log_event!(ctx, DEBUG, event_names::ESTIMATE_SWEPT, Stage::Estimate, "sweep done",
///     tags = 4);
/// ```
#[macro_export]
macro_rules! log_event {
    ($ctx:expr, INFO, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)*) => {
        tracing::info!(
            event = $event,
            run_id = %$ctx.run_id,
            stage = %$stage,
            $($key = $val,)*
            "{}", $msg
        )
    };
    ($ctx:expr, DEBUG, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)*) => {
        tracing::debug!(
            event = $event,
            run_id = %$ctx.run_id,
            stage = %$stage,
            $($key = $val,)*
            "{}", $msg
        )
    };
    ($ctx:expr, WARN, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)*) => {
        tracing::warn!(
            event = $event,
            run_id = %$ctx.run_id,
            stage = %$stage,
            $($key = $val,)*
            "{}", $msg
        )
    };
    ($ctx:expr, ERROR, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)*) => {
        tracing::error!(
            event = $event,
            run_id = %$ctx.run_id,
            stage = %$stage,
            $($key = $val,)*
            "{}", $msg
        )
    };
}

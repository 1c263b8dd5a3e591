//! Log level and format resolution.
//!
//! Highest precedence first: `-v`/`-q`/`--log-format`, `TAGWATCH_LOG`,
//! `RUST_LOG` (most verbose directive wins), `TAGWATCH_LOG_FORMAT`, defaults.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const LEVEL_ENV_VAR: &str = "TAGWATCH_LOG";
pub const FORMAT_ENV_VAR: &str = "TAGWATCH_LOG_FORMAT";

/// Where log lines go on stderr and how they look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Compact text for a terminal.
    #[default]
    Human,
    /// One JSON object per event.
    Jsonl,
}

const FORMAT_NAMES: &[(&str, LogFormat)] = &[
    ("human", LogFormat::Human),
    ("text", LogFormat::Human),
    ("pretty", LogFormat::Human),
    ("jsonl", LogFormat::Jsonl),
    ("json", LogFormat::Jsonl),
];

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            LogFormat::Human => "human",
            LogFormat::Jsonl => "jsonl",
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(FORMAT_NAMES, s).ok_or_else(|| format!("unknown log format '{s}'"))
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verbosity, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Per-cycle estimator detail.
    Trace,
    /// Admissions, drops, malformed lines.
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

const LEVEL_NAMES: &[(&str, LogLevel)] = &[
    ("trace", LogLevel::Trace),
    ("debug", LogLevel::Debug),
    ("info", LogLevel::Info),
    ("warn", LogLevel::Warn),
    ("warning", LogLevel::Warn),
    ("error", LogLevel::Error),
    ("off", LogLevel::Off),
    ("quiet", LogLevel::Off),
];

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }

    /// Level selected by `-v` repetitions and `-q`.
    pub fn from_verbosity(verbose: u8, quiet: bool) -> Option<Self> {
        match (quiet, verbose) {
            (true, _) => Some(LogLevel::Error),
            (false, 0) => None,
            (false, 1) => Some(LogLevel::Debug),
            (false, _) => Some(LogLevel::Trace),
        }
    }

    /// Most verbose level named in a `RUST_LOG` style directive list.
    ///
    /// `tw_core=warn,hyper=error` yields `Warn`; directives without a
    /// recognisable level are skipped.
    pub fn from_directives(directives: &str) -> Option<Self> {
        directives
            .split(',')
            .filter_map(|directive| {
                let level = directive.rsplit('=').next().unwrap_or(directive);
                level.trim().parse::<LogLevel>().ok()
            })
            .min()
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(LEVEL_NAMES, s).ok_or_else(|| format!("unknown log level '{s}'"))
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn lookup<T: Copy>(table: &[(&str, T)], name: &str) -> Option<T> {
    table
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name.trim()))
        .map(|(_, value)| *value)
}

/// Resolved logging settings for one process.
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Prefix human lines with a timestamp.
    pub timestamps: bool,
    /// Level came from a CLI flag or `TAGWATCH_LOG`; `RUST_LOG` directives
    /// must not widen or narrow it.
    pub level_pinned: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Human,
            level: LogLevel::Info,
            timestamps: true,
            level_pinned: false,
        }
    }
}

impl LogConfig {
    /// Resolve from the process environment, then apply CLI overrides.
    pub fn from_env(cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self {
        Self::resolve(
            std::env::var(LEVEL_ENV_VAR).ok().as_deref(),
            std::env::var("RUST_LOG").ok().as_deref(),
            std::env::var(FORMAT_ENV_VAR).ok().as_deref(),
            cli_level,
            cli_format,
        )
    }

    fn resolve(
        tagwatch_log: Option<&str>,
        rust_log: Option<&str>,
        log_format: Option<&str>,
        cli_level: Option<LogLevel>,
        cli_format: Option<LogFormat>,
    ) -> Self {
        let defaults = LogConfig::default();

        let env_level = match tagwatch_log {
            Some(val) => val.parse().ok(),
            None => rust_log.and_then(LogLevel::from_directives),
        };
        let env_format = log_format.and_then(|val| val.parse().ok());

        LogConfig {
            level: cli_level.or(env_level).unwrap_or(defaults.level),
            format: cli_format.or(env_format).unwrap_or(defaults.format),
            level_pinned: cli_level.is_some() || tagwatch_log.is_some(),
            ..defaults
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_aliases() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Jsonl));
        assert_eq!(" text ".parse::<LogFormat>(), Ok(LogFormat::Human));
        assert!("csv".parse::<LogFormat>().is_err());
    }

    #[test]
    fn names_round_trip_through_display() {
        for (_, level) in LEVEL_NAMES {
            assert_eq!(level.to_string().parse::<LogLevel>(), Ok(*level));
        }
        for (_, format) in FORMAT_NAMES {
            assert_eq!(format.to_string().parse::<LogFormat>(), Ok(*format));
        }
    }

    #[test]
    fn verbosity_flags() {
        assert_eq!(LogLevel::from_verbosity(0, false), None);
        assert_eq!(LogLevel::from_verbosity(1, false), Some(LogLevel::Debug));
        assert_eq!(LogLevel::from_verbosity(4, false), Some(LogLevel::Trace));
        assert_eq!(LogLevel::from_verbosity(2, true), Some(LogLevel::Error));
    }

    #[test]
    fn rust_log_directives_pick_most_verbose() {
        assert_eq!(
            LogLevel::from_directives("tw_core=warn,other=error"),
            Some(LogLevel::Warn)
        );
        assert_eq!(LogLevel::from_directives("debug"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::from_directives("tw_core"), None);
    }

    #[test]
    fn tagwatch_log_shadows_rust_log() {
        let config = LogConfig::resolve(Some("debug"), Some("error"), Some("json"), None, None);
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Jsonl);

        assert!(config.level_pinned);

        let config = LogConfig::resolve(None, Some("tw_core=warn"), None, None, None);
        assert_eq!(config.level, LogLevel::Warn);
        assert!(!config.level_pinned);

        let config = LogConfig::resolve(Some("chatty"), Some("trace"), None, None, None);
        assert_eq!(config.level, LogLevel::Info);
        assert!(config.level_pinned);
    }

    #[test]
    fn cli_flags_win() {
        let config = LogConfig::resolve(
            Some("debug"),
            None,
            Some("jsonl"),
            Some(LogLevel::Trace),
            Some(LogFormat::Human),
        );
        assert_eq!(config.level, LogLevel::Trace);
        assert_eq!(config.format, LogFormat::Human);
        assert!(config.timestamps);
        assert!(config.level_pinned);
    }
}

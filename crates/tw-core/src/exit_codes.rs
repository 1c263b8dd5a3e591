//! Exit codes for the tagwatch CLI.
//!
//! Exit code ranges:
//! - 0: clean run
//! - 10-19: user/environment errors (fixable by the operator)
//! - 20-29: I/O failures while writing output

use tw_common::{Error, ErrorCategory};

/// Exit codes for tagwatch operations.
///
/// These codes are a stable contract for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success: input consumed or cycle limit reached
    Clean = 0,

    /// Invalid arguments
    ArgsError = 10,

    /// Config file missing, unparsable or semantically invalid
    ConfigError = 11,

    /// Reader device unavailable, closed or failing
    TransportError = 12,

    /// I/O error
    IoError = 21,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Clean
    }

    /// User/environment error (codes 10-19).
    pub fn is_user_error(self) -> bool {
        (10..20).contains(&self.as_i32())
    }

    /// Get the error code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::TransportError => "ERR_TRANSPORT",
            ExitCode::IoError => "ERR_IO",
        }
    }

    /// Exit code for a failed command.
    pub fn for_error(err: &Error) -> Self {
        match err.category() {
            ErrorCategory::Config => ExitCode::ConfigError,
            ErrorCategory::Transport => ExitCode::TransportError,
            ErrorCategory::Io => ExitCode::IoError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}

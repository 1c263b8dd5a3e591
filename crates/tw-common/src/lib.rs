//! Tagwatch common types, IDs, and errors.
//!
//! This crate provides foundational types shared across tw-core modules:
//! - Tag identity types (reader-assigned code and registry sequence number)
//! - Common error types with stable codes
//! - Output formats

pub mod error;
pub mod id;
pub mod output;

pub use error::{Error, ErrorCategory, Result};
pub use id::{SequenceId, TagId};
pub use output::OutputFormat;

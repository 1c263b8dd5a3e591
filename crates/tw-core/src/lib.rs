//! Tagwatch core library.
//!
//! This library tracks RFID tags from a line-oriented reader feed:
//! - Line decoding and line sources ([`collect`])
//! - Per-tag read-timing statistics and visibility estimation ([`inference`])
//! - The bounded tag registry and its ingest/estimate cycle ([`registry`])
//! - Configuration loading and validation ([`config`])
//! - Structured logging, output rendering and exit codes
//!
//! The binary entry point is in `main.rs`.

pub mod collect;
pub mod config;
pub mod exit_codes;
pub mod inference;
pub mod logging;
pub mod output;
pub mod registry;

pub use collect::{decode, decode_line, LineSource, ReadEvent};
pub use registry::{IngestOutcome, IngestResult, TagRegistry, TagSnapshot};

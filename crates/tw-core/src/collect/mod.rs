//! Reader line collection.
//!
//! This module provides:
//! - [`source`]: line sources (device, file, stdin, scripted)
//! - [`reading`]: decoding of a raw line into a [`ReadEvent`]

pub mod reading;
pub mod source;

pub use reading::{decode, decode_line, DecodeError, ReadEvent, READING_FIELDS, READING_PREFIX};
pub use source::{
    LineSource, ReaderLineSource, ScriptedLineSource, ThreadedLineSource, TransportError,
};

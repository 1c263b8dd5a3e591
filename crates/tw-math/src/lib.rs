//! Tagwatch math utilities.

pub mod math;

pub use math::bayes::*;
pub use math::gaussian::*;
pub use math::moments::*;

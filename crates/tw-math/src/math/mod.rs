//! Core math modules.

pub mod bayes;
pub mod gaussian;
pub mod moments;

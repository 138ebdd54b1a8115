// All normalization lives in mdnorm-core.
// This crate adds terminal rendering on top of it.

pub mod report;

// Re-export core types for convenience
pub use mdnorm_core::*;

pub use report::OutputFormat;

// mdnorm core library
//
// Rewrites Markdown so it meets a fixed set of structural conventions and
// keeps rewriting until the rules agree. Entry points are `normalize` and
// `is_idempotent`; everything file-related sits behind FileNormalizer and
// BatchProcessor.

pub mod change;
pub mod config;
pub mod discovery;
pub mod error;
pub mod file;
pub mod line_endings;
pub mod processor;
pub mod rules;
pub mod types;

// Re-export main types and functions for easy use
pub use config::{ConfigManager, NormalizerConfig, Preset};
pub use error::NormalizeError;
pub use file::FileNormalizer;
pub use line_endings::LineEnding;
pub use processor::{BatchProcessor, CancelHandle};
pub use rules::{Rule, RuleEngine, RuleSet};
pub use types::*;

/// Normalize one document with the given config
pub fn normalize(document: &Document, config: &NormalizerConfig) -> Result<NormalizationResult, NormalizeError> {
    RuleEngine::from_config(config).normalize(document)
}

/// Whether normalizing the document's output again is a no-op
pub fn is_idempotent(document: &Document, config: &NormalizerConfig) -> bool {
    RuleEngine::from_config(config).is_idempotent(document)
}

/// Whether the document is already at the config's fixpoint
pub fn is_normalized(document: &Document, config: &NormalizerConfig) -> bool {
    RuleEngine::from_config(config).is_normalized(document)
}

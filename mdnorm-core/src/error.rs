use std::path::PathBuf;
use thiserror::Error;

/// Per-document failures. None of these abort a batch; the batch caller
/// folds them into the exit status.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("invalid UTF-8 (valid up to byte {valid_up_to})")]
    Decode { valid_up_to: usize },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no fixpoint after {iterations} passes (still changing: {})", fmt_suspects(suspected_rules))]
    NonConvergence {
        iterations: usize,
        suspected_rules: Vec<String>,
    },
}

fn fmt_suspects(rules: &[String]) -> String {
    if rules.is_empty() {
        "unknown".to_string()
    } else {
        rules.join(", ")
    }
}

impl NormalizeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Stable short name used in reports
    pub fn kind(&self) -> &'static str {
        match self {
            NormalizeError::Decode { .. } => "decode",
            NormalizeError::Io { .. } => "io",
            NormalizeError::NonConvergence { .. } => "non-convergence",
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::line_endings::LineEnding;

// ===== DOCUMENT TYPES =====

const UTF8_BOM: char = '\u{feff}';

/// A decoded Markdown document.
///
/// `text` always uses LF line endings internally; `line_ending` records the
/// dominant convention of the source so output can be re-expanded to it.
/// Documents are values: every engine pass produces a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub text: String,
    pub line_ending: LineEnding,
    /// Source started with a UTF-8 byte order mark
    pub has_bom: bool,
    /// Source mixed CRLF and bare LF; re-encoding alone changes it
    pub mixed_line_endings: bool,
}

impl Document {
    /// Build a document from LF text (used by tests and in-memory callers)
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            line_ending: LineEnding::Lf,
            has_bom: false,
            mixed_line_endings: false,
        }
    }

    /// Decode raw bytes: UTF-8 only, dominant line ending detected and
    /// folded to LF for rule application.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, crate::NormalizeError> {
        let raw = std::str::from_utf8(bytes).map_err(|e| crate::NormalizeError::Decode {
            valid_up_to: e.valid_up_to(),
        })?;

        let (raw, has_bom) = match raw.strip_prefix(UTF8_BOM) {
            Some(rest) => (rest, true),
            None => (raw, false),
        };

        Ok(Self {
            text: crate::line_endings::to_internal(raw),
            line_ending: LineEnding::detect(raw),
            has_bom,
            mixed_line_endings: crate::line_endings::is_mixed(raw),
        })
    }

    /// Re-encode with the original line ending (and BOM, if any)
    pub fn to_bytes(&self) -> Vec<u8> {
        encode_text(&self.text, self.line_ending, self.has_bom).into_bytes()
    }
}

pub(crate) fn encode_text(text: &str, line_ending: LineEnding, has_bom: bool) -> String {
    let expanded = crate::line_endings::to_external(text, line_ending);
    if has_bom {
        let mut out = String::with_capacity(expanded.len() + UTF8_BOM.len_utf8());
        out.push(UTF8_BOM);
        out.push_str(&expanded);
        out
    } else {
        expanded
    }
}

/// Rule families. Callers enable or disable whole categories instead of
/// maintaining separate fixer variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleCategory {
    Heading,
    List,
    CodeBlock,
    Table,
    Whitespace,
    Collapse,
    Eof,
}

impl RuleCategory {
    pub const ALL: [RuleCategory; 7] = [
        RuleCategory::Whitespace,
        RuleCategory::Collapse,
        RuleCategory::Heading,
        RuleCategory::List,
        RuleCategory::CodeBlock,
        RuleCategory::Table,
        RuleCategory::Eof,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCategory::Heading => "heading",
            RuleCategory::List => "list",
            RuleCategory::CodeBlock => "code-block",
            RuleCategory::Table => "table",
            RuleCategory::Whitespace => "whitespace",
            RuleCategory::Collapse => "collapse",
            RuleCategory::Eof => "eof",
        }
    }
}

impl std::fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RuleCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let known: Vec<_> = RuleCategory::ALL.iter().map(|c| c.as_str()).collect();
                format!("unknown rule category '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

/// Outcome of one converged engine run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizationResult {
    /// Final text, re-expanded to the document's line ending
    pub output_text: String,
    /// Output bytes differ from the input bytes
    pub changed: bool,
    /// Full RuleSet passes performed, including the final no-change pass
    pub iterations: usize,
    pub converged: bool,
    /// Ids of rules that changed the text at least once, in first-fired order
    pub applied_rules: Vec<String>,
}

// ===== REPORT TYPES =====

/// What the file boundary does with a changed result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Overwrite changed files in place
    Write,
    /// Report only; never touch the file
    Check,
}

/// Per-file outcome exposed to the CLI glue
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub changed: bool,
    pub converged: bool,
    pub iterations: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub applied_rules: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_ending: Option<LineEnding>,
    /// SHA-256 of the file's final content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FileFailure>,
}

impl FileReport {
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Serializable summary of a per-file error
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suspected_rules: Vec<String>,
}

impl From<&crate::NormalizeError> for FileFailure {
    fn from(err: &crate::NormalizeError) -> Self {
        let suspected_rules = match err {
            crate::NormalizeError::NonConvergence { suspected_rules, .. } => suspected_rules.clone(),
            _ => Vec::new(),
        };
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
            suspected_rules,
        }
    }
}

/// Aggregate of one batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub mode: WriteMode,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub scanned: usize,
    pub changed: usize,
    pub failed: usize,
    /// Files still queued when the run was cancelled
    pub skipped: usize,
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn new(mode: WriteMode, started_at: DateTime<Utc>, mut files: Vec<FileReport>, skipped: usize) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        let changed = files.iter().filter(|f| f.changed && !f.failed()).count();
        let failed = files.iter().filter(|f| f.failed()).count();
        Self {
            run_id: Uuid::new_v4(),
            mode,
            started_at,
            finished_at: Utc::now(),
            scanned: files.len(),
            changed,
            failed,
            skipped,
            files,
        }
    }

    /// Exit status contract: every file decoded, converged and (in write
    /// mode) was persisted. In check mode a file that would change also fails.
    pub fn success(&self) -> bool {
        if self.failed > 0 || self.skipped > 0 {
            return false;
        }
        match self.mode {
            WriteMode::Write => true,
            WriteMode::Check => self.changed == 0,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

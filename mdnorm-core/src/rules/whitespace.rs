use super::engine::Rule;
use super::lines::{is_blank, join, Lines, WHITESPACE};
use crate::types::RuleCategory;

/// Strips trailing spaces and tabs; whitespace-only lines become empty.
pub struct TrailingWhitespaceTrim;

impl Rule for TrailingWhitespaceTrim {
    fn id(&self) -> &str {
        "TrailingWhitespaceTrim"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Whitespace
    }

    fn pattern(&self) -> &str {
        r"[ \t]+$"
    }

    fn apply(&self, text: &str) -> String {
        let doc = Lines::split(text);
        let trimmed: Vec<&str> = doc
            .lines
            .iter()
            .map(|line| line.trim_end_matches(WHITESPACE))
            .collect();
        join(&trimmed, doc.trailing_newline)
    }
}

/// Caps every run of blank lines at `max_blank_lines`.
pub struct BlankRunCollapse {
    max_blank_lines: usize,
}

impl BlankRunCollapse {
    pub fn new(max_blank_lines: usize) -> Self {
        Self {
            max_blank_lines: max_blank_lines.max(1),
        }
    }
}

impl Default for BlankRunCollapse {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Rule for BlankRunCollapse {
    fn id(&self) -> &str {
        "BlankRunCollapse"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Collapse
    }

    fn pattern(&self) -> &str {
        r"\n{3,}"
    }

    fn apply(&self, text: &str) -> String {
        let doc = Lines::split(text);
        let mut out = Vec::with_capacity(doc.lines.len());
        let mut run = 0;
        for line in &doc.lines {
            if is_blank(line) {
                run += 1;
                if run > self.max_blank_lines {
                    continue;
                }
            } else {
                run = 0;
            }
            out.push(*line);
        }
        join(&out, doc.trailing_newline)
    }
}

/// Exactly one trailing newline, no trailing blank lines.
/// Empty and blank-only documents become empty.
pub struct FinalNewlineEnsure;

impl Rule for FinalNewlineEnsure {
    fn id(&self) -> &str {
        "FinalNewlineEnsure"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Eof
    }

    fn pattern(&self) -> &str {
        r"\n*\z"
    }

    fn apply(&self, text: &str) -> String {
        let mut doc = Lines::split(text);
        while doc.lines.last().is_some_and(|line| is_blank(line)) {
            doc.lines.pop();
        }
        join(&doc.lines, true)
    }
}

use super::engine::Rule;
use super::lines::{join, LineKind, Lines, FENCE_PATTERN};
use crate::types::RuleCategory;

/// Blank line before every opening fence and after every closing fence,
/// except at document start and end.
pub struct CodeBlockBlankLineEnsure;

impl Rule for CodeBlockBlankLineEnsure {
    fn id(&self) -> &str {
        "CodeBlockBlankLineEnsure"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::CodeBlock
    }

    fn pattern(&self) -> &str {
        FENCE_PATTERN
    }

    fn apply(&self, text: &str) -> String {
        let doc = Lines::split(text);
        let kinds = doc.kinds();
        let mut gaps = vec![false; kinds.len()];

        for (i, kind) in kinds.iter().enumerate() {
            match kind {
                LineKind::FenceOpen { .. } if i > 0 && !kinds[i - 1].is_blank() => {
                    gaps[i] = true;
                }
                LineKind::FenceClose => {
                    if kinds.get(i + 1).is_some_and(|next| !next.is_blank()) {
                        gaps[i + 1] = true;
                    }
                }
                _ => {}
            }
        }

        doc.with_gaps(&gaps)
    }
}

/// Opening fences without a language token get one, so every block with a
/// body declares its language. Fences that carry a token are left alone.
pub struct CodeFenceLanguageTag {
    language: String,
}

impl CodeFenceLanguageTag {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }
}

impl Default for CodeFenceLanguageTag {
    fn default() -> Self {
        Self::new("text")
    }
}

impl Rule for CodeFenceLanguageTag {
    fn id(&self) -> &str {
        "CodeFenceLanguageTag"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::CodeBlock
    }

    fn pattern(&self) -> &str {
        r"^\s*`{3,}$"
    }

    fn apply(&self, text: &str) -> String {
        let doc = Lines::split(text);
        let kinds = doc.kinds();

        let lines: Vec<String> = doc
            .lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let bare_opener = kinds[i] == LineKind::FenceOpen { has_info: false };
                let has_body = kinds.get(i + 1) == Some(&LineKind::Code);
                if bare_opener && has_body {
                    format!("{}{}", line.trim_end(), self.language)
                } else {
                    (*line).to_string()
                }
            })
            .collect();

        join(&lines, doc.trailing_newline)
    }
}

use super::engine::Rule;
use super::lines::{LineKind, Lines, HEADING_PATTERN};
use crate::types::RuleCategory;

/// ATX headings get a blank line on both sides. Adjacent headings stay
/// adjacent; nothing is inserted at document start or end.
pub struct HeadingBlankLineEnsure;

impl Rule for HeadingBlankLineEnsure {
    fn id(&self) -> &str {
        "HeadingBlankLineEnsure"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Heading
    }

    fn pattern(&self) -> &str {
        HEADING_PATTERN
    }

    fn apply(&self, text: &str) -> String {
        let doc = Lines::split(text);
        let kinds = doc.kinds();
        let mut gaps = vec![false; kinds.len()];

        for (i, kind) in kinds.iter().enumerate() {
            if *kind != LineKind::Heading {
                continue;
            }
            if i > 0 && needs_separation(kinds[i - 1]) {
                gaps[i] = true;
            }
            if let Some(next) = kinds.get(i + 1) {
                if needs_separation(*next) {
                    gaps[i + 1] = true;
                }
            }
        }

        doc.with_gaps(&gaps)
    }
}

fn needs_separation(neighbour: LineKind) -> bool {
    !neighbour.is_blank() && neighbour != LineKind::Heading
}

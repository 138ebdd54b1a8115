use super::engine::Rule;
use super::lines::{LineKind, Lines, TABLE_PATTERN};
use crate::types::RuleCategory;

/// A run of `|` lines is a table; it gets a blank line on both sides.
pub struct TableBlankLineEnsure;

impl Rule for TableBlankLineEnsure {
    fn id(&self) -> &str {
        "TableBlankLineEnsure"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Table
    }

    fn pattern(&self) -> &str {
        TABLE_PATTERN
    }

    fn apply(&self, text: &str) -> String {
        let doc = Lines::split(text);
        let kinds = doc.kinds();
        let mut gaps = vec![false; kinds.len()];

        for i in 1..kinds.len() {
            let (prev, cur) = (kinds[i - 1], kinds[i]);
            if prev.is_blank() || cur.is_blank() {
                continue;
            }
            let opens = cur == LineKind::TableRow && prev != LineKind::TableRow;
            let closes = prev == LineKind::TableRow && cur != LineKind::TableRow;
            gaps[i] = opens || closes;
        }

        doc.with_gaps(&gaps)
    }
}

use super::engine::Rule;
use super::lines::{join, LineKind, Lines, LIST_ITEM_PATTERN};
use crate::types::RuleCategory;

/// Which lines belong to a list block: item lines plus indented, non-blank
/// text lines that directly continue one.
fn list_membership(lines: &[&str], kinds: &[LineKind]) -> Vec<bool> {
    let mut in_list = vec![false; kinds.len()];
    for i in 0..kinds.len() {
        in_list[i] = match kinds[i] {
            LineKind::ListItem => true,
            LineKind::Text => {
                i > 0 && in_list[i - 1] && lines[i].starts_with([' ', '\t'])
            }
            _ => false,
        };
    }
    in_list
}

/// Blank line before the first item of a list and after its last line.
pub struct ListBlankLineEnsure;

impl Rule for ListBlankLineEnsure {
    fn id(&self) -> &str {
        "ListBlankLineEnsure"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::List
    }

    fn pattern(&self) -> &str {
        LIST_ITEM_PATTERN
    }

    fn apply(&self, text: &str) -> String {
        let doc = Lines::split(text);
        let kinds = doc.kinds();
        let in_list = list_membership(&doc.lines, &kinds);
        let mut gaps = vec![false; kinds.len()];

        for i in 1..kinds.len() {
            let prev_content = !kinds[i - 1].is_blank();
            let starts_list = kinds[i] == LineKind::ListItem && prev_content && !in_list[i - 1];
            let ends_list = !kinds[i].is_blank() && !in_list[i] && in_list[i - 1];
            if starts_list || ends_list {
                gaps[i] = true;
            }
        }

        doc.with_gaps(&gaps)
    }
}

/// Tight lists: blank lines between two items are dropped. A blank line
/// followed by non-list content ends the list and stays.
pub struct ListInternalBlankLineRemoval;

impl Rule for ListInternalBlankLineRemoval {
    fn id(&self) -> &str {
        "ListInternalBlankLineRemoval"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::List
    }

    fn pattern(&self) -> &str {
        LIST_ITEM_PATTERN
    }

    fn apply(&self, text: &str) -> String {
        let doc = Lines::split(text);
        let kinds = doc.kinds();
        let in_list = list_membership(&doc.lines, &kinds);
        let mut keep = vec![true; kinds.len()];

        let mut i = 0;
        while i < kinds.len() {
            if !kinds[i].is_blank() {
                i += 1;
                continue;
            }
            let start = i;
            while i < kinds.len() && kinds[i].is_blank() {
                i += 1;
            }
            let between_items =
                start > 0 && in_list[start - 1] && kinds.get(i) == Some(&LineKind::ListItem);
            if between_items {
                keep[start..i].iter_mut().for_each(|k| *k = false);
            }
        }

        let kept: Vec<&str> = doc
            .lines
            .iter()
            .zip(&keep)
            .filter_map(|(line, keep)| keep.then_some(*line))
            .collect();
        join(&kept, doc.trailing_newline)
    }
}

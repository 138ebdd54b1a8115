// Shared line model for the structural rules
//
// Every structural rule sees the document through the same classification,
// so a `# comment` inside a fenced block is never a heading, a `- x` inside
// one is never a list item, and so on. Fences follow the usual Markdown
// convention: a closing fence has no info string and at least as many
// backticks as its opener; an unclosed fence runs to end of document.

use once_cell::sync::Lazy;
use regex::Regex;

pub(crate) static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#{1,6}[ \t]").expect("valid heading regex"));

pub(crate) static LIST_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*(?:[-*+]|\d+\.)[ \t]+\S").expect("valid list regex"));

pub(crate) static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([ \t]*)(`{3,})([^`]*)$").expect("valid fence regex"));

/// Characters treated as trailing whitespace and as blank-line filler
pub(crate) const WHITESPACE: [char; 2] = [' ', '\t'];

pub(crate) const HEADING_PATTERN: &str = r"^#{1,6}\s";
pub(crate) const LIST_ITEM_PATTERN: &str = r"^\s*([-*+]|\d+\.)\s";
pub(crate) const FENCE_PATTERN: &str = r"^\s*`{3,}[lang]";
pub(crate) const TABLE_PATTERN: &str = r"^\|";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind {
    Blank,
    Heading,
    ListItem,
    TableRow,
    FenceOpen { has_info: bool },
    FenceClose,
    /// Inside a fenced block
    Code,
    Text,
}

impl LineKind {
    pub(crate) fn is_blank(self) -> bool {
        self == LineKind::Blank
    }
}

/// A document split into lines plus whether it ended with a newline
#[derive(Debug)]
pub(crate) struct Lines<'a> {
    pub lines: Vec<&'a str>,
    pub trailing_newline: bool,
}

impl<'a> Lines<'a> {
    pub(crate) fn split(text: &'a str) -> Self {
        if text.is_empty() {
            return Self {
                lines: Vec::new(),
                trailing_newline: false,
            };
        }
        let trailing_newline = text.ends_with('\n');
        let body = if trailing_newline {
            &text[..text.len() - 1]
        } else {
            text
        };
        Self {
            lines: body.split('\n').collect(),
            trailing_newline,
        }
    }

    pub(crate) fn kinds(&self) -> Vec<LineKind> {
        classify(&self.lines)
    }

    /// Rebuild the text with a blank line inserted before every `i` where
    /// `gaps[i]` is set. One blank per boundary no matter how many reasons.
    pub(crate) fn with_gaps(&self, gaps: &[bool]) -> String {
        let mut out: Vec<&str> = Vec::with_capacity(self.lines.len() + gaps.len());
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 && gaps.get(i).copied().unwrap_or(false) {
                out.push("");
            }
            out.push(line);
        }
        join(&out, self.trailing_newline)
    }
}

pub(crate) fn join<S: AsRef<str>>(lines: &[S], trailing_newline: bool) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(line.as_ref());
    }
    if trailing_newline && !lines.is_empty() {
        out.push('\n');
    }
    out
}

/// Blank means empty after stripping spaces and tabs, the same set
/// TrailingWhitespaceTrim removes. Other Unicode spaces are content.
pub(crate) fn is_blank(line: &str) -> bool {
    line.trim_matches(WHITESPACE).is_empty()
}

/// Parsed fence line: backtick count and trimmed info string
pub(crate) struct Fence<'a> {
    pub ticks: usize,
    pub info: &'a str,
}

pub(crate) fn parse_fence(line: &str) -> Option<Fence<'_>> {
    let caps = FENCE_RE.captures(line)?;
    Some(Fence {
        ticks: caps.get(2).map_or(0, |m| m.as_str().len()),
        info: caps.get(3).map_or("", |m| m.as_str().trim()),
    })
}

/// `* * *`, `---`, `___` and friends are not list items
fn is_thematic_break(line: &str) -> bool {
    let mut marker = None;
    let mut count = 0;
    for c in line.chars() {
        match c {
            ' ' | '\t' => continue,
            '-' | '*' | '_' => {
                if marker.is_some_and(|m| m != c) {
                    return false;
                }
                marker = Some(c);
                count += 1;
            }
            _ => return false,
        }
    }
    count >= 3
}

pub(crate) fn is_list_item(line: &str) -> bool {
    LIST_ITEM_RE.is_match(line) && !is_thematic_break(line)
}

pub(crate) fn classify(lines: &[&str]) -> Vec<LineKind> {
    let mut kinds = Vec::with_capacity(lines.len());
    let mut open_ticks: Option<usize> = None;

    for line in lines {
        if let Some(ticks) = open_ticks {
            let closes = parse_fence(line).is_some_and(|f| f.ticks >= ticks && f.info.is_empty());
            if closes {
                open_ticks = None;
                kinds.push(LineKind::FenceClose);
            } else {
                kinds.push(LineKind::Code);
            }
            continue;
        }

        if let Some(fence) = parse_fence(line) {
            open_ticks = Some(fence.ticks);
            kinds.push(LineKind::FenceOpen {
                has_info: !fence.info.is_empty(),
            });
            continue;
        }

        let kind = if is_blank(line) {
            LineKind::Blank
        } else if HEADING_RE.is_match(line) {
            LineKind::Heading
        } else if line.starts_with('|') {
            LineKind::TableRow
        } else if is_list_item(line) {
            LineKind::ListItem
        } else {
            LineKind::Text
        };
        kinds.push(kind);
    }

    kinds
}

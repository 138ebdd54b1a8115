// Line ending detection and folding
//
// Rules only ever see LF text. The dominant convention of the source is
// detected once on load and re-applied once on output, so mixed files come
// out uniform and untouched files round-trip byte for byte.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Lf,
    Crlf,
}

impl LineEnding {
    /// Dominant style by count of `\r\n` versus bare `\n`.
    /// Ties and newline-free text resolve to LF.
    pub fn detect(text: &str) -> Self {
        let (crlf, lf) = count_endings(text);
        if crlf > lf {
            LineEnding::Crlf
        } else {
            LineEnding::Lf
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Crlf => "\r\n",
        }
    }
}

impl std::fmt::Display for LineEnding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineEnding::Lf => f.write_str("LF"),
            LineEnding::Crlf => f.write_str("CRLF"),
        }
    }
}

/// Returns (crlf, bare lf) counts
fn count_endings(text: &str) -> (usize, usize) {
    let bytes = text.as_bytes();
    let mut crlf = 0;
    let mut lf = 0;
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'\n' {
            if i > 0 && bytes[i - 1] == b'\r' {
                crlf += 1;
            } else {
                lf += 1;
            }
        }
    }
    (crlf, lf)
}

/// Both conventions occur in the text
pub fn is_mixed(text: &str) -> bool {
    let (crlf, lf) = count_endings(text);
    crlf > 0 && lf > 0
}

/// Fold every `\r\n` to `\n`. Lone `\r` is content and is left alone.
pub fn to_internal(text: &str) -> String {
    text.replace("\r\n", "\n")
}

/// Expand LF text to the requested style
pub fn to_external(text: &str, line_ending: LineEnding) -> String {
    match line_ending {
        LineEnding::Lf => text.to_string(),
        LineEnding::Crlf => text.replace('\n', "\r\n"),
    }
}

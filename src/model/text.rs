//! Line separators and line splitting.
//!
//! The merge engine compares texts line by line and never looks at the
//! separator itself. Everything separator-specific lives here: detecting the
//! separator a file already uses, rewriting a text to a given separator, and
//! splitting a text into lines the way the merge expects.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// LineSeparator
// ---------------------------------------------------------------------------

/// A line separator used by a text file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineSeparator {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
    /// `\r`
    Cr,
}

impl LineSeparator {
    /// The separator as it appears in a file.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::Cr => "\r",
        }
    }

    /// Detect the separator of the first line break in `text`.
    ///
    /// Returns `None` when the text contains no line break at all.
    #[must_use]
    pub fn detect(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        let idx = bytes.iter().position(|&b| b == b'\n' || b == b'\r')?;
        match (bytes[idx], bytes.get(idx + 1)) {
            (b'\r', Some(b'\n')) => Some(Self::CrLf),
            (b'\r', _) => Some(Self::Cr),
            _ => Some(Self::Lf),
        }
    }
}

impl fmt::Display for LineSeparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lf => write!(f, "lf"),
            Self::CrLf => write!(f, "crlf"),
            Self::Cr => write!(f, "cr"),
        }
    }
}

// ---------------------------------------------------------------------------
// Conversion and splitting
// ---------------------------------------------------------------------------

/// Rewrite every `\r\n`, `\r` and `\n` in `text` to `sep`.
#[must_use]
pub fn convert_line_separators(text: &str, sep: LineSeparator) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str(sep.as_str());
            }
            '\n' => out.push_str(sep.as_str()),
            other => out.push(other),
        }
    }
    out
}

/// Split `text` into lines on `\r\n`, `\n` or `\r`.
///
/// Always yields at least one line. A trailing line break produces a
/// trailing empty line, so joining the result with `"\n"` restores the
/// text (modulo separator style).
#[must_use]
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let bytes = text.as_bytes();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                start = i + 1;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    lines.push(&text[start..]);
    lines
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_uses_first_line_break() {
        assert_eq!(LineSeparator::detect("a\nb\r\n"), Some(LineSeparator::Lf));
        assert_eq!(LineSeparator::detect("a\r\nb\n"), Some(LineSeparator::CrLf));
        assert_eq!(LineSeparator::detect("a\rb"), Some(LineSeparator::Cr));
        assert_eq!(LineSeparator::detect("trailing cr\r"), Some(LineSeparator::Cr));
        assert_eq!(LineSeparator::detect("no breaks"), None);
        assert_eq!(LineSeparator::detect(""), None);
    }

    #[test]
    fn convert_normalizes_mixed_separators() {
        let mixed = "a\r\nb\rc\nd";
        assert_eq!(convert_line_separators(mixed, LineSeparator::Lf), "a\nb\nc\nd");
        assert_eq!(
            convert_line_separators(mixed, LineSeparator::CrLf),
            "a\r\nb\r\nc\r\nd"
        );
        assert_eq!(convert_line_separators(mixed, LineSeparator::Cr), "a\rb\rc\rd");
    }

    #[test]
    fn convert_keeps_non_ascii_text() {
        assert_eq!(
            convert_line_separators("größe\r\nключ", LineSeparator::Lf),
            "größe\nключ"
        );
    }

    #[test]
    fn split_keeps_trailing_empty_line() {
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b", ""]);
        assert_eq!(split_lines("a\r\nb"), vec!["a", "b"]);
        assert_eq!(split_lines("a\r\rb"), vec!["a", "", "b"]);
    }

    #[test]
    fn split_empty_text_is_one_empty_line() {
        assert_eq!(split_lines(""), vec![""]);
    }

    #[test]
    fn split_then_join_restores_lf_text() {
        let text = "x\n\ny\nz\n";
        assert_eq!(split_lines(text).join("\n"), text);
    }

    #[test]
    fn display_matches_config_spelling() {
        assert_eq!(LineSeparator::Lf.to_string(), "lf");
        assert_eq!(LineSeparator::CrLf.to_string(), "crlf");
        assert_eq!(LineSeparator::Cr.to_string(), "cr");
    }
}

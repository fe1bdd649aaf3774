//! Message parsing: header blocks, boundary segmentation, transfer decoding,
//! and the line scanner that ties them together.

pub mod boundary;
pub mod decode;
pub mod engine;
pub mod header;

/// Default maximum depth for flattening nested multiparts.
pub const MAX_DEPTH: usize = 10;

/// Tuning knobs for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// How many levels of nested `multipart/*` containers are flattened.
    /// Containers below this depth are kept as opaque parts.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
        }
    }
}

/// A physical line without its terminator and trailing spaces.
pub(crate) fn line_content(raw: &str) -> &str {
    raw.trim_end_matches(['\r', '\n', ' '])
}

/// Drop leading blank lines and all trailing whitespace.
///
/// Indentation on the first non-blank line is preserved.
pub(crate) fn trim_blank_lines(text: &str) -> &str {
    let mut start = 0;
    for raw in text.split_inclusive('\n') {
        if !raw.trim().is_empty() {
            break;
        }
        start += raw.len();
    }
    text[start..].trim_end()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_content() {
        assert_eq!(line_content("Subject: Hi \r\n"), "Subject: Hi");
        assert_eq!(line_content("\n"), "");
        assert_eq!(line_content("\tindented"), "\tindented");
    }

    #[test]
    fn test_trim_blank_lines() {
        assert_eq!(trim_blank_lines("\r\n\n  keep indent\nline two\n\n\n"), "  keep indent\nline two");
        assert_eq!(trim_blank_lines("\n \n\t\n"), "");
        assert_eq!(trim_blank_lines("plain"), "plain");
    }
}

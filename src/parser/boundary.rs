//! Boundary detection and multipart segmentation (RFC 2046 §5.1).

use super::header::parameter;
use super::trim_blank_lines;

/// Longest boundary RFC 2046 allows.
const MAX_BOUNDARY_LEN: usize = 70;

/// What a delimiter line means for the enclosing multipart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// `--boundary`: ends the current part and opens the next one.
    Separator,
    /// `--boundary--`: ends the multipart body.
    Terminal,
}

/// Classify `line` against `boundary`.
///
/// Trailing whitespace (including `\r`) is ignored; anything else must
/// match exactly, so a longer boundary sharing a prefix never matches.
pub fn classify(line: &str, boundary: &str) -> Option<Delimiter> {
    if boundary.is_empty() {
        return None;
    }
    let rest = line.trim_end().strip_prefix("--")?.strip_prefix(boundary)?;
    match rest {
        "" => Some(Delimiter::Separator),
        "--" => Some(Delimiter::Terminal),
        _ => None,
    }
}

/// Extract the `boundary=` parameter from a `Content-Type` value.
pub fn boundary_of(content_type: &str) -> Option<String> {
    parameter(content_type, "boundary")
}

/// Recognize a delimiter line whose boundary was never declared.
///
/// Returns the boundary token that follows the leading `--`: the longest
/// run of RFC 2046 `bchars` (minus space), capped at 70 characters and not
/// ending in `:`. A signature separator (`-- `) does not qualify.
pub fn bare_boundary(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("--")?;
    let len = rest
        .char_indices()
        .take(MAX_BOUNDARY_LEN)
        .take_while(|&(_, c)| is_bchar(c))
        .last()
        .map(|(idx, c)| idx + c.len_utf8())
        .unwrap_or(0);
    let token = rest[..len].trim_end_matches(':');
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

fn is_bchar(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '\'' | '(' | ')' | '+' | '_' | ',' | '-' | '.' | '/' | ':' | '=' | '?'
        )
}

/// Split a multipart body into the raw segments between delimiter lines.
///
/// The preamble before the first delimiter and everything after the
/// terminal `--boundary--` are discarded. Each segment has its surrounding
/// blank lines trimmed and empty segments are dropped. A body that never
/// mentions the boundary yields no segments.
///
/// One linear pass over the body.
pub fn split_by_boundary<'a>(body: &'a str, boundary: &str) -> Vec<&'a str> {
    let mut segments = Vec::new();
    let mut segment_start: Option<usize> = None;
    let mut offset = 0;

    for raw in body.split_inclusive('\n') {
        let line_start = offset;
        offset += raw.len();

        match classify(raw, boundary) {
            Some(Delimiter::Separator) => {
                if let Some(start) = segment_start {
                    segments.push(&body[start..line_start]);
                }
                segment_start = Some(offset);
            }
            Some(Delimiter::Terminal) => {
                if let Some(start) = segment_start.take() {
                    segments.push(&body[start..line_start]);
                }
                break;
            }
            None => {}
        }
    }

    // No terminal marker: the last segment runs to the end of the body.
    if let Some(start) = segment_start {
        segments.push(&body[start.min(body.len())..]);
    }

    segments
        .into_iter()
        .map(trim_blank_lines)
        .filter(|s| !s.is_empty())
        .collect()
}

//! Header block parsing: `name: value` lines, trailing-semicolon folding,
//! structured parameters, dates and message ids.

use chrono::{DateTime, FixedOffset};
use tracing::debug;

use crate::model::headers::HeaderMap;

use super::line_content;

/// The RFC 5322 date layout: `Day, DD Mon YYYY HH:MM:SS ±HHMM`.
pub const RFC5322_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Split a physical line into `(name, value)` if it starts a header.
///
/// A header name is a non-empty run of ASCII letters, digits and `-`,
/// followed by `:` and then whitespace or the end of the line. Anything
/// else (envelope `From ` lines, URLs, body text) is not a header.
pub fn split_header_line(line: &str) -> Option<(&str, &str)> {
    let colon = line.find(':')?;
    let name = &line[..colon];
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
        return None;
    }
    let rest = &line[colon + 1..];
    if !(rest.is_empty() || rest.starts_with([' ', '\t'])) {
        return None;
    }
    Some((name, rest.trim_start_matches([' ', '\t'])))
}

/// Whether a stored header value continues on the next physical line.
///
/// Only a trailing `;` signals a continuation, matching the way
/// `Content-Type` and `Content-Disposition` parameters get wrapped.
pub fn continues(value: &str) -> bool {
    value.ends_with(';')
}

/// Append a continuation line to a folded value, keeping the line break.
pub(crate) fn fold_into(value: &mut String, line: &str) {
    value.push('\n');
    value.push_str(line);
}

/// Parse the header block at the start of `text`.
///
/// Returns the headers and the remainder of `text` starting at the first
/// line that is neither a header nor a continuation (usually the blank
/// separator line). An empty or header-less input yields an empty map.
pub fn parse_header_block(text: &str) -> (HeaderMap, &str) {
    let mut headers = HeaderMap::new();
    let mut folding: Option<String> = None;
    let mut offset = 0;

    for raw in text.split_inclusive('\n') {
        let line = line_content(raw);

        if let Some(name) = folding.take() {
            // A blank line always ends the fold and the header block with it.
            if !line.trim().is_empty() {
                if let Some(value) = headers.get_mut(&name) {
                    fold_into(value, line);
                    if continues(value) {
                        folding = Some(name);
                    }
                }
                offset += raw.len();
                continue;
            }
        }

        match split_header_line(line) {
            Some((name, value)) => {
                headers.insert(name, value);
                if continues(value) {
                    folding = Some(name.to_string());
                }
            }
            None => break,
        }
        offset += raw.len();
    }

    (headers, &text[offset..])
}

/// The lowercased media type of a `Content-Type` value, without parameters.
///
/// `"Text/HTML; charset=utf-8"` → `"text/html"`.
pub fn media_type(value: &str) -> String {
    value
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// Look up a structured parameter (`boundary`, `charset`, `name`,
/// `filename`, ...) in a header value. Names match case-insensitively and
/// surrounding quotes are stripped from the result.
pub fn parameter(value: &str, key: &str) -> Option<String> {
    split_parameters(value)
        .into_iter()
        .skip(1)
        .find_map(|param| {
            let (name, val) = param.split_once('=')?;
            if name.trim().eq_ignore_ascii_case(key) {
                Some(unquote(val).to_string())
            } else {
                None
            }
        })
        .filter(|v| !v.is_empty())
}

/// Split on `;` outside of double quotes.
fn split_parameters(value: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (idx, ch) in value.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                pieces.push(&value[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    pieces.push(&value[start..]);
    pieces
}

/// Trim whitespace and one pair of surrounding double quotes.
pub fn unquote(s: &str) -> &str {
    let trimmed = s.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].trim()
    } else {
        trimmed.trim_matches('"')
    }
}

/// Strip angle brackets from a Message-ID style value.
///
/// `" <abc@example.com> "` → `"abc@example.com"`.
pub fn strip_angle_brackets(s: &str) -> &str {
    s.trim().trim_matches(|c| c == '<' || c == '>')
}

/// Parse a `Date` header value.
///
/// A trailing `(comment)` is dropped first. Then tries the RFC 5322
/// layout, the same layout with a well-known zone abbreviation replaced by
/// its numeric offset, and finally chrono's RFC 2822 parser (obsolete US
/// zone names). Unparsable input yields `None`, never an error.
pub fn parse_date(value: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = strip_trailing_comment(value.trim());
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_str(trimmed, RFC5322_DATE_FORMAT) {
        return Some(dt);
    }

    let replaced = replace_named_tz(trimmed);
    if let Ok(dt) = DateTime::parse_from_str(&replaced, RFC5322_DATE_FORMAT) {
        return Some(dt);
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt);
    }

    debug!(date = trimmed, "Could not parse date");
    None
}

/// `"... +0100 (CET)"` → `"... +0100"`.
fn strip_trailing_comment(s: &str) -> &str {
    if !s.ends_with(')') {
        return s;
    }
    match s.rfind('(') {
        Some(idx) => s[..idx].trim_end(),
        None => s,
    }
}

/// Replace a trailing timezone abbreviation with its numeric offset.
fn replace_named_tz(s: &str) -> String {
    let tzs = [
        ("CEST", "+0200"),
        ("CET", "+0100"),
        ("EEST", "+0300"),
        ("EET", "+0200"),
        ("BST", "+0100"),
        ("IST", "+0530"),
        ("JST", "+0900"),
        ("AEST", "+1000"),
        ("UTC", "+0000"),
        ("GMT", "+0000"),
    ];
    let mut result = s.to_string();
    for (name, offset) in &tzs {
        if result.ends_with(name) {
            let pos = result.len() - name.len();
            result.replace_range(pos.., offset);
            return result;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_header_line() {
        assert_eq!(
            split_header_line("Subject: Hello there"),
            Some(("Subject", "Hello there"))
        );
        assert_eq!(split_header_line("X-Empty:"), Some(("X-Empty", "")));
        assert_eq!(split_header_line("to:\treceiver@example.com"), Some(("to", "receiver@example.com")));
    }

    #[test]
    fn test_split_header_line_rejects_non_headers() {
        assert_eq!(split_header_line("From sender@example.com Thu Jan 01 00:00:00 2024"), None);
        assert_eq!(split_header_line("https://example.com/path"), None);
        assert_eq!(split_header_line("Just some body text."), None);
        assert_eq!(split_header_line(": no name"), None);
        assert_eq!(split_header_line(""), None);
    }

    #[test]
    fn test_parse_header_block_folds_on_semicolon() {
        let text = "Content-Type: text/calendar; name=Appointment.ics\n\
                    Content-Disposition: attachment; name=Appointment.ics;\n filename=Appointment.ics\n\
                    \n\
                    QkVHSU46VkNBTEVOREFS\n";
        let (headers, rest) = parse_header_block(text);
        assert_eq!(headers.len(), 2);
        assert_eq!(
            headers.get("content-disposition"),
            Some("attachment; name=Appointment.ics;\n filename=Appointment.ics")
        );
        assert_eq!(rest, "\nQkVHSU46VkNBTEVOREFS\n");
    }

    #[test]
    fn test_parse_header_block_repeated_folding() {
        let text = "Content-Type: multipart/mixed;\r\n charset=utf-8;\r\n boundary=\"b1\"\r\n\r\nbody";
        let (headers, rest) = parse_header_block(text);
        assert_eq!(
            headers.get("Content-Type"),
            Some("multipart/mixed;\n charset=utf-8;\n boundary=\"b1\"")
        );
        assert_eq!(rest, "\r\nbody");
    }

    #[test]
    fn test_parse_header_block_blank_line_ends_fold() {
        let (headers, rest) = parse_header_block("Content-Type: text/plain;\n\nHello\n");
        assert_eq!(headers.get("Content-Type"), Some("text/plain;"));
        assert_eq!(rest, "\nHello\n");
    }

    #[test]
    fn test_parse_header_block_empty() {
        let (headers, rest) = parse_header_block("");
        assert!(headers.is_empty());
        assert_eq!(rest, "");
    }

    #[test]
    fn test_parameter_lookup() {
        let ct = "multipart/alternative; boundary=\"0000000000008f6e3a06287386f8\"";
        assert_eq!(
            parameter(ct, "boundary").as_deref(),
            Some("0000000000008f6e3a06287386f8")
        );
        assert_eq!(parameter("text/plain; CHARSET=UTF-8", "charset").as_deref(), Some("UTF-8"));
        assert_eq!(parameter("text/plain", "charset"), None);
    }

    #[test]
    fn test_parameter_does_not_confuse_name_and_filename() {
        let cd = "attachment; filename=\"doc.pdf\"";
        assert_eq!(parameter(cd, "name"), None);
        assert_eq!(parameter(cd, "filename").as_deref(), Some("doc.pdf"));
    }

    #[test]
    fn test_parameter_quoted_semicolon_and_folding() {
        let ct = "multipart/mixed;\n boundary=\"a;b\"";
        assert_eq!(parameter(ct, "boundary").as_deref(), Some("a;b"));
    }

    #[test]
    fn test_media_type() {
        assert_eq!(media_type("Text/HTML; charset=utf-8"), "text/html");
        assert_eq!(media_type(""), "");
    }

    #[test]
    fn test_strip_angle_brackets() {
        assert_eq!(
            strip_angle_brackets(" <6e30b164904cf01158c7cc58f144b9ca@example.com> "),
            "6e30b164904cf01158c7cc58f144b9ca@example.com"
        );
        assert_eq!(strip_angle_brackets("plain-id"), "plain-id");
    }

    #[test]
    fn test_parse_date_rfc5322() {
        let dt = parse_date("Fri, 25 Aug 2023 15:36:13 +0200").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2023-08-25 15:36:13");
        assert_eq!(dt.offset().local_minus_utc(), 2 * 3600);
    }

    #[test]
    fn test_parse_date_obsolete_zone() {
        let dt = parse_date("Thu, 24 Aug 2023 21:15:01 PST").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2023-08-24 21:15:01");
    }

    #[test]
    fn test_parse_date_named_tz() {
        let dt = parse_date("Mon, 18 Nov 2024 22:11:51 CET").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 3600);
    }

    #[test]
    fn test_parse_date_trailing_comment() {
        let dt = parse_date("Thu, 5 Dec 2024 10:12:01 +0100 (CET)").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-12-05 10:12:01");
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date("").is_none());
        assert!(parse_date("yesterday afternoon").is_none());
    }
}

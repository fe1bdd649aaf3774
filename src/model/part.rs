//! A single body part: its headers, raw body and decoded content.

use std::borrow::Cow;

use sha2::{Digest, Sha256};

use super::headers::HeaderMap;
use crate::parser::decode::{decode, TransferEncoding};
use crate::parser::header::{media_type, parameter};

/// One leaf of a parsed message (text, HTML, inline media or attachment).
///
/// The content is decoded once, at construction, according to the part's
/// `Content-Transfer-Encoding`. Classification (`is_html`, `is_attachment`,
/// ...) is derived from the headers on every call and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    headers: HeaderMap,
    raw: String,
    content: Vec<u8>,
}

impl Part {
    /// Build a part from its headers and raw (still encoded) body.
    pub fn new(headers: HeaderMap, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let encoding = TransferEncoding::from_header(headers.get("content-transfer-encoding"));
        let content = decode(raw.as_bytes(), encoding);
        Self {
            headers,
            raw,
            content,
        }
    }

    /// All headers of this part, in source order.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Look up a header by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Look up a header, falling back to `default`.
    pub fn header_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.headers.get(name).unwrap_or(default)
    }

    /// The full `Content-Type` value, or `""` when absent.
    pub fn content_type(&self) -> &str {
        self.header_or("content-type", "")
    }

    /// The lowercased media type without parameters (`"text/plain"`).
    pub fn media_type(&self) -> String {
        media_type(self.content_type())
    }

    /// The declared `charset=` parameter, as written. No transcoding is done.
    pub fn charset(&self) -> Option<String> {
        parameter(self.content_type(), "charset")
    }

    /// The declared `Content-Transfer-Encoding`.
    pub fn transfer_encoding(&self) -> TransferEncoding {
        TransferEncoding::from_header(self.header("content-transfer-encoding"))
    }

    /// The body exactly as it appeared between the headers and the next
    /// delimiter, surrounding blank lines trimmed.
    pub fn raw_content(&self) -> &str {
        &self.raw
    }

    /// The decoded body bytes.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// The decoded body as UTF-8, with invalid sequences replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }

    /// Byte length of the decoded content.
    pub fn size(&self) -> usize {
        self.content.len()
    }

    pub fn is_html(&self) -> bool {
        self.content_type_starts_with("text/html")
    }

    pub fn is_text(&self) -> bool {
        self.content_type_starts_with("text/plain")
    }

    pub fn is_image(&self) -> bool {
        self.content_type_starts_with("image/")
    }

    /// `Content-Disposition` starts with `attachment` (case-insensitive).
    pub fn is_attachment(&self) -> bool {
        self.header("content-disposition")
            .map(|d| d.trim_start().to_ascii_lowercase().starts_with("attachment"))
            .unwrap_or(false)
    }

    /// The declared filename: `filename=` of `Content-Disposition`, else
    /// `name=` of `Content-Type`.
    pub fn filename(&self) -> Option<String> {
        self.header("content-disposition")
            .and_then(|d| parameter(d, "filename"))
            .or_else(|| parameter(self.content_type(), "name"))
    }

    /// A filename that is always available: the declared one, or a name
    /// derived from the content hash (`part-<12 hex digits>.<ext>`), so the
    /// same bytes always get the same name.
    pub fn attachment_name(&self) -> String {
        if let Some(name) = self.filename() {
            return name;
        }
        let digest = format!("{:x}", Sha256::digest(&self.content));
        format!("part-{}.{}", &digest[..12], self.extension())
    }

    fn extension(&self) -> String {
        let media = self.media_type();
        match media.as_str() {
            "text/plain" => "txt".to_string(),
            "text/html" => "html".to_string(),
            "image/jpeg" => "jpg".to_string(),
            "message/rfc822" => "eml".to_string(),
            _ => {
                let subtype: String = media
                    .split_once('/')
                    .map(|(_, sub)| sub)
                    .unwrap_or("")
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .collect();
                if subtype.is_empty() {
                    "bin".to_string()
                } else {
                    subtype
                }
            }
        }
    }

    fn content_type_starts_with(&self, prefix: &str) -> bool {
        self.content_type()
            .trim_start()
            .to_ascii_lowercase()
            .starts_with(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(headers: &[(&str, &str)], raw: &str) -> Part {
        Part::new(headers.iter().copied().collect(), raw)
    }

    #[test]
    fn test_classification() {
        let html = part(&[("Content-Type", "Text/HTML; charset=utf-8")], "<p>x</p>");
        assert!(html.is_html());
        assert!(!html.is_text());

        let text = part(&[("content-type", "text/plain")], "x");
        assert!(text.is_text());
        assert!(!text.is_image());

        let image = part(&[("Content-Type", "image/png")], "");
        assert!(image.is_image());
        assert!(!image.is_attachment());

        let none = part(&[], "x");
        assert!(!none.is_html() && !none.is_text() && !none.is_image() && !none.is_attachment());
        assert_eq!(none.content_type(), "");
    }

    #[test]
    fn test_attachment_with_base64() {
        let p = part(
            &[
                ("Content-Type", "application/pdf"),
                ("Content-Disposition", "attachment; filename=\"doc.pdf\""),
                ("Content-Transfer-Encoding", "base64"),
            ],
            "JVBERi0xLjQK",
        );
        assert!(p.is_attachment());
        assert_eq!(p.filename().as_deref(), Some("doc.pdf"));
        assert_eq!(p.content(), b"%PDF-1.4\n");
        assert_eq!(p.size(), 9);
        assert_eq!(p.raw_content(), "JVBERi0xLjQK");
        assert_eq!(p.transfer_encoding(), TransferEncoding::Base64);
    }

    #[test]
    fn test_filename_falls_back_to_content_type_name() {
        let p = part(&[("Content-Type", "text/calendar; name=Appointment.ics")], "");
        assert_eq!(p.filename().as_deref(), Some("Appointment.ics"));
    }

    #[test]
    fn test_filename_from_folded_disposition() {
        let p = part(
            &[(
                "Content-Disposition",
                "attachment; name=Appointment.ics;\n filename=Appointment.ics",
            )],
            "",
        );
        assert_eq!(p.filename().as_deref(), Some("Appointment.ics"));
    }

    #[test]
    fn test_filename_absent() {
        let p = part(&[("Content-Type", "text/plain")], "hi");
        assert_eq!(p.filename(), None);
    }

    #[test]
    fn test_attachment_name_is_content_derived() {
        let a = part(&[("Content-Type", "image/png")], "same bytes");
        let b = part(&[("Content-Type", "image/png")], "same bytes");
        let c = part(&[("Content-Type", "image/png")], "other bytes");
        assert_eq!(a.attachment_name(), b.attachment_name());
        assert_ne!(a.attachment_name(), c.attachment_name());
        assert!(a.attachment_name().starts_with("part-"));
        assert!(a.attachment_name().ends_with(".png"));
        assert_eq!(part(&[], "x").attachment_name().rsplit('.').next(), Some("bin"));
    }

    #[test]
    fn test_charset_and_text() {
        let p = part(
            &[
                ("Content-Type", "text/plain; charset=\"UTF-8\""),
                ("Content-Transfer-Encoding", "quoted-printable"),
            ],
            "Caf=C3=A9",
        );
        assert_eq!(p.charset().as_deref(), Some("UTF-8"));
        assert_eq!(p.text(), "Café");
        assert_eq!(p.media_type(), "text/plain");
    }

    #[test]
    fn test_accessors_are_idempotent() {
        let p = part(&[("Content-Type", "text/plain")], "hello");
        assert_eq!(p.content(), p.content());
        assert_eq!(p.filename(), p.filename());
        assert_eq!(p.size(), p.size());
    }
}

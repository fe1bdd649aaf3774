//! The parsed message: top-level headers plus the flattened list of parts.

use std::path::Path;

use chrono::{DateTime, FixedOffset};
use tracing::debug;

use super::headers::HeaderMap;
use super::part::Part;
use crate::error::{MimeError, Result};
use crate::parser::engine;
use crate::parser::header::{parse_date, strip_angle_brackets};
use crate::parser::ParseOptions;

/// A parsed RFC 822 / MIME message.
///
/// Built once, synchronously, by [`Message::parse`] and immutable
/// afterwards. Single-part and multipart messages share the same shape: a
/// single-part message simply has (at most) one [`Part`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    headers: HeaderMap,
    boundary: Option<String>,
    parts: Vec<Part>,
    size: usize,
}

impl Message {
    /// Parse a raw message with default options. Never fails.
    pub fn parse(raw: &str) -> Self {
        Self::parse_with(raw, &ParseOptions::default())
    }

    /// Parse a raw message with explicit options. Never fails.
    pub fn parse_with(raw: &str, options: &ParseOptions) -> Self {
        let scanned = engine::scan(raw, options);
        Self {
            headers: scanned.headers,
            boundary: scanned.boundary,
            parts: scanned.parts,
            size: raw.len(),
        }
    }

    /// Parse raw bytes; invalid UTF-8 is replaced rather than rejected.
    pub fn from_bytes(raw: &[u8]) -> Self {
        Self::parse(&String::from_utf8_lossy(raw))
    }

    /// Read a message file fully into memory and parse it.
    ///
    /// Only the read can fail: a missing file yields
    /// [`MimeError::FileNotFound`], any other I/O failure [`MimeError::Io`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_file_with(path, &ParseOptions::default())
    }

    /// [`Message::from_file`] with explicit options.
    pub fn from_file_with(path: impl AsRef<Path>, options: &ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| MimeError::read(path, e))?;
        debug!(path = %path.display(), bytes = data.len(), "Read message file");
        Ok(Self::parse_with(&String::from_utf8_lossy(&data), options))
    }

    // ── Headers ─────────────────────────────────────────────────────

    /// All top-level headers, in source order.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Look up a top-level header (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Look up a top-level header, falling back to `default`.
    pub fn header_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.headers.get(name).unwrap_or(default)
    }

    /// The top-level `Content-Type`, inherited from the first part when
    /// the message declared none. `""` when there is nothing to report.
    pub fn content_type(&self) -> &str {
        self.header_or("content-type", "")
    }

    /// `Message-ID` without its angle brackets.
    pub fn id(&self) -> &str {
        strip_angle_brackets(self.header_or("message-id", ""))
    }

    pub fn subject(&self) -> &str {
        self.header_or("subject", "")
    }

    pub fn from(&self) -> &str {
        self.header_or("from", "")
    }

    pub fn to(&self) -> &str {
        self.header_or("to", "")
    }

    pub fn reply_to(&self) -> &str {
        self.header_or("reply-to", "")
    }

    /// The `Date` header, or `None` when missing or unparsable.
    pub fn date(&self) -> Option<DateTime<FixedOffset>> {
        self.header("date").and_then(parse_date)
    }

    /// The boundary that delimited the top-level body, if any.
    pub fn boundary(&self) -> Option<&str> {
        self.boundary.as_deref()
    }

    /// Byte length of the raw input.
    pub fn size(&self) -> usize {
        self.size
    }

    // ── Parts ───────────────────────────────────────────────────────

    /// All parts in source order, nested multiparts flattened.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// The first `text/html` part.
    pub fn html_part(&self) -> Option<&Part> {
        self.parts.iter().find(|p| p.is_html())
    }

    /// The first `text/plain` part.
    pub fn text_part(&self) -> Option<&Part> {
        self.parts.iter().find(|p| p.is_text())
    }

    /// Parts whose `Content-Disposition` is `attachment`.
    pub fn attachments(&self) -> Vec<&Part> {
        self.parts.iter().filter(|p| p.is_attachment()).collect()
    }
}

impl std::str::FromStr for Message {
    type Err = std::convert::Infallible;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(raw))
    }
}

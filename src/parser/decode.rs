//! Content-Transfer-Encoding decoding (RFC 2045 §6).
//!
//! Decoding is lenient: malformed input produces whatever the decoding rule
//! naturally yields instead of an error, so one bad part never aborts the
//! rest of the message.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use quoted_printable::ParseMode;
use tracing::warn;

/// Standard alphabet, padding optional, stray trailing bits tolerated.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A part's declared `Content-Transfer-Encoding`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    Base64,
    QuotedPrintable,
    SevenBit,
    EightBit,
    Binary,
    /// Missing or unrecognized; treated as passthrough.
    Identity,
}

impl TransferEncoding {
    /// Interpret a header value (case-insensitive, surrounding whitespace ignored).
    pub fn from_header(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self::Identity;
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "base64" => Self::Base64,
            "quoted-printable" => Self::QuotedPrintable,
            "7bit" => Self::SevenBit,
            "8bit" => Self::EightBit,
            "binary" => Self::Binary,
            _ => Self::Identity,
        }
    }

    /// Canonical header spelling, or `None` for [`TransferEncoding::Identity`].
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            Self::Base64 => Some("base64"),
            Self::QuotedPrintable => Some("quoted-printable"),
            Self::SevenBit => Some("7bit"),
            Self::EightBit => Some("8bit"),
            Self::Binary => Some("binary"),
            Self::Identity => None,
        }
    }
}

/// Decode `content` according to `encoding`.
pub fn decode(content: &[u8], encoding: TransferEncoding) -> Vec<u8> {
    match encoding {
        TransferEncoding::Base64 => decode_base64(content),
        TransferEncoding::QuotedPrintable => decode_quoted_printable(content),
        TransferEncoding::SevenBit
        | TransferEncoding::EightBit
        | TransferEncoding::Binary
        | TransferEncoding::Identity => content.to_vec(),
    }
}

/// Base64 with everything outside the alphabet (line breaks, whitespace,
/// padding, garbage) discarded first.
///
/// A dangling single character cannot encode a byte and is dropped.
pub fn decode_base64(content: &[u8]) -> Vec<u8> {
    let mut filtered: Vec<u8> = content
        .iter()
        .copied()
        .filter(|b| b.is_ascii_alphanumeric() || *b == b'+' || *b == b'/')
        .collect();
    if filtered.len() % 4 == 1 {
        filtered.pop();
    }

    match LENIENT_BASE64.decode(&filtered) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "Invalid base64 content, returning empty body");
            Vec::new()
        }
    }
}

/// Quoted-printable: `=XX` escapes and soft line breaks.
///
/// Lines are decoded one at a time so each hard line break keeps its
/// original terminator; a trailing `=` joins the next line without one.
/// Malformed escapes are kept as literal text.
pub fn decode_quoted_printable(content: &[u8]) -> Vec<u8> {
    let mut decoded = Vec::with_capacity(content.len());

    for raw in content.split_inclusive(|&b| b == b'\n') {
        let body_len = raw
            .iter()
            .rposition(|&b| b != b'\n' && b != b'\r')
            .map_or(0, |idx| idx + 1);
        let (line, terminator) = raw.split_at(body_len);
        let line = trim_trailing_whitespace(line);

        let (line, soft_break) = match line.strip_suffix(b"=") {
            Some(rest) => (rest, true),
            None => (line, false),
        };

        match quoted_printable::decode(line, ParseMode::Robust) {
            Ok(bytes) => decoded.extend_from_slice(&bytes),
            Err(e) => {
                warn!(error = %e, "Invalid quoted-printable line, keeping it raw");
                decoded.extend_from_slice(line);
            }
        }

        if !soft_break {
            decoded.extend_from_slice(terminator);
        }
    }

    decoded
}

fn trim_trailing_whitespace(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|&b| b != b' ' && b != b'\t')
        .map_or(0, |idx| idx + 1);
    &line[..end]
}

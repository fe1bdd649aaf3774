//! The message engine: a single top-to-bottom scan over the raw lines.
//!
//! The scanner is an explicit state machine. Every physical line moves it
//! from one [`ScanState`] to the next and may emit a finished part. Parts
//! whose own `Content-Type` is `multipart/*` are re-segmented with their
//! own boundary and flattened into the same part list.
//!
//! Scanning never fails. Missing structure degrades to empty headers or
//! zero parts.

use tracing::{debug, trace, warn};

use crate::model::headers::HeaderMap;
use crate::model::part::Part;

use super::boundary::{bare_boundary, boundary_of, classify, split_by_boundary, Delimiter};
use super::header::{continues, fold_into, media_type, parse_header_block, split_header_line};
use super::{line_content, trim_blank_lines, ParseOptions};

/// Everything the scan produced for one message.
#[derive(Debug, Clone, Default)]
pub struct ScanOutput {
    /// Top-level headers, in first-occurrence order.
    pub headers: HeaderMap,
    /// Boundary governing the top-level body, if one was found.
    pub boundary: Option<String>,
    /// Leaf parts in source order, nested multiparts flattened.
    pub parts: Vec<Part>,
}

/// Headers and body lines collected for the part currently open.
#[derive(Debug, Default)]
struct PartDraft {
    headers: HeaderMap,
    body: String,
}

impl PartDraft {
    fn is_empty(&self) -> bool {
        self.headers.is_empty() && trim_blank_lines(&self.body).is_empty()
    }
}

/// Scanner states. `folding` names a header whose value ended in `;` and
/// therefore continues on the next line.
#[derive(Debug)]
enum ScanState {
    /// Reading the message's own headers (and skipping any prologue
    /// garbage until the first delimiter).
    TopHeaders { folding: Option<String> },
    /// Reading the headers of an open part. With `mirror` set the part is
    /// the body of a single-part message and its headers are copied to the
    /// message headers as well.
    PartHeaders {
        draft: PartDraft,
        folding: Option<String>,
        mirror: bool,
    },
    /// Copying body lines of an open part verbatim.
    PartBody { draft: PartDraft },
    /// The terminal delimiter was seen; the rest of the input is ignored.
    Done,
}

/// Scan a raw message.
pub fn scan(raw: &str, options: &ParseOptions) -> ScanOutput {
    let mut scanner = Scanner::new(*options);
    let mut state = ScanState::TopHeaders { folding: None };

    for raw_line in raw.split_inclusive('\n') {
        state = scanner.step(state, raw_line);
        if matches!(state, ScanState::Done) {
            break;
        }
    }

    scanner.finish(state)
}

struct Scanner {
    options: ParseOptions,
    headers: HeaderMap,
    boundary: Option<String>,
    parts: Vec<Part>,
    /// The blank line closing the top-level header block has been seen;
    /// anything before the first delimiter is now preamble.
    in_preamble: bool,
}

impl Scanner {
    fn new(options: ParseOptions) -> Self {
        Self {
            options,
            headers: HeaderMap::new(),
            boundary: None,
            parts: Vec::new(),
            in_preamble: false,
        }
    }

    fn step(&mut self, state: ScanState, raw: &str) -> ScanState {
        let line = line_content(raw);
        let blank = line.trim().is_empty();

        match state {
            ScanState::TopHeaders {
                folding: Some(name),
            } => {
                if blank {
                    self.top_header_done(&name);
                    self.top_line(line)
                } else {
                    self.fold_top(name, line)
                }
            }
            ScanState::TopHeaders { folding: None } => self.top_line(line),
            ScanState::PartHeaders {
                draft,
                folding: Some(name),
                mirror,
            } if !blank => self.fold_part(draft, name, mirror, line),
            ScanState::PartHeaders { draft, mirror, .. } => {
                self.part_header_line(draft, mirror, raw, line)
            }
            ScanState::PartBody { draft } => self.part_body_line(draft, raw, line),
            ScanState::Done => ScanState::Done,
        }
    }

    // ── Top-level headers ───────────────────────────────────────────

    fn top_line(&mut self, line: &str) -> ScanState {
        match self.delimiter(line) {
            Some(Delimiter::Separator) => return Self::open_part(),
            Some(Delimiter::Terminal) => return ScanState::Done,
            None => {}
        }

        if line.trim().is_empty() {
            self.in_preamble |= !self.headers.is_empty();
            return ScanState::TopHeaders { folding: None };
        }

        if !self.in_preamble {
            if let Some((name, value)) = split_header_line(line) {
                return self.top_header(name, value);
            }
        }

        if self.boundary.is_none() {
            if let Some(token) = bare_boundary(line) {
                debug!(boundary = token, "Adopted undeclared boundary");
                self.boundary = Some(token.to_string());
                return Self::open_part();
            }
        }

        trace!(discarded = line, "Discarding line outside the message structure");
        ScanState::TopHeaders { folding: None }
    }

    fn top_header(&mut self, name: &str, value: &str) -> ScanState {
        let is_content_type = name.eq_ignore_ascii_case("content-type");

        if is_content_type && self.boundary.is_none() && !is_multipart(value) {
            // Single-part message: this header opens the one and only part.
            let mut draft = PartDraft::default();
            draft.headers.insert(name, value);
            self.headers.insert(name, value);
            return ScanState::PartHeaders {
                draft,
                folding: continues(value).then(|| name.to_string()),
                mirror: true,
            };
        }

        self.headers.insert(name, value);
        if continues(value) {
            return ScanState::TopHeaders {
                folding: Some(name.to_string()),
            };
        }
        self.top_header_done(name);
        ScanState::TopHeaders { folding: None }
    }

    fn fold_top(&mut self, name: String, line: &str) -> ScanState {
        let still_folding = match self.headers.get_mut(&name) {
            Some(value) => {
                fold_into(value, line);
                continues(value)
            }
            None => false,
        };
        if still_folding {
            return ScanState::TopHeaders {
                folding: Some(name),
            };
        }
        self.top_header_done(&name);
        ScanState::TopHeaders { folding: None }
    }

    /// A top-level header value is complete; pick up a declared boundary.
    fn top_header_done(&mut self, name: &str) {
        if self.boundary.is_some() || !name.eq_ignore_ascii_case("content-type") {
            return;
        }
        let Some(value) = self.headers.get(name) else {
            return;
        };
        if is_multipart(value) {
            self.boundary = boundary_of(value);
            if let Some(boundary) = &self.boundary {
                debug!(boundary = %boundary, "Found multipart boundary");
            }
        }
    }

    // ── Parts ───────────────────────────────────────────────────────

    fn open_part() -> ScanState {
        ScanState::PartHeaders {
            draft: PartDraft::default(),
            folding: None,
            mirror: false,
        }
    }

    fn part_header_line(
        &mut self,
        mut draft: PartDraft,
        mirror: bool,
        raw: &str,
        line: &str,
    ) -> ScanState {
        match self.delimiter(line) {
            Some(Delimiter::Separator) => {
                self.emit(draft);
                return Self::open_part();
            }
            Some(Delimiter::Terminal) => {
                self.emit(draft);
                return ScanState::Done;
            }
            None => {}
        }

        // Blank lines ahead of a part's first header are skipped, the same
        // way split_by_boundary trims nested segments.
        if line.trim().is_empty() && draft.headers.is_empty() && draft.body.is_empty() {
            return ScanState::PartHeaders {
                draft,
                folding: None,
                mirror,
            };
        }

        if let Some((name, value)) = split_header_line(line) {
            draft.headers.insert(name, value);
            if mirror {
                self.headers.insert(name, value);
            }
            return ScanState::PartHeaders {
                draft,
                folding: continues(value).then(|| name.to_string()),
                mirror,
            };
        }

        // First non-header line: the body starts here.
        draft.body.push_str(raw);
        ScanState::PartBody { draft }
    }

    fn fold_part(
        &mut self,
        mut draft: PartDraft,
        name: String,
        mirror: bool,
        line: &str,
    ) -> ScanState {
        let still_folding = match draft.headers.get_mut(&name) {
            Some(value) => {
                fold_into(value, line);
                continues(value)
            }
            None => false,
        };
        if mirror {
            if let Some((stored, value)) = draft.headers.get_entry(&name) {
                self.headers.insert(stored, value);
            }
        }
        ScanState::PartHeaders {
            draft,
            folding: still_folding.then_some(name),
            mirror,
        }
    }

    fn part_body_line(&mut self, mut draft: PartDraft, raw: &str, line: &str) -> ScanState {
        match self.delimiter(line) {
            Some(Delimiter::Separator) => {
                self.emit(draft);
                Self::open_part()
            }
            Some(Delimiter::Terminal) => {
                self.emit(draft);
                ScanState::Done
            }
            None => {
                draft.body.push_str(raw);
                ScanState::PartBody { draft }
            }
        }
    }

    fn delimiter(&self, line: &str) -> Option<Delimiter> {
        self.boundary
            .as_deref()
            .and_then(|boundary| classify(line, boundary))
    }

    fn emit(&mut self, draft: PartDraft) {
        if draft.is_empty() {
            return;
        }
        let before = self.parts.len();
        flatten(draft.headers, &draft.body, 0, &self.options, &mut self.parts);
        debug!(
            emitted = self.parts.len() - before,
            total = self.parts.len(),
            "Emitted part"
        );
    }

    fn finish(mut self, state: ScanState) -> ScanOutput {
        match state {
            ScanState::TopHeaders {
                folding: Some(name),
            } => self.top_header_done(&name),
            ScanState::PartHeaders { draft, .. } | ScanState::PartBody { draft } => {
                self.emit(draft)
            }
            ScanState::TopHeaders { folding: None } | ScanState::Done => {}
        }

        // Without a top-level Content-Type, inherit the first part's.
        if !self.headers.contains("content-type") {
            let inherited = self
                .parts
                .first()
                .and_then(|part| part.headers().get_entry("content-type"))
                .map(|(name, value)| (name.to_string(), value.to_string()));
            if let Some((name, value)) = inherited {
                self.headers.insert(name, value);
            }
        }

        ScanOutput {
            headers: self.headers,
            boundary: self.boundary,
            parts: self.parts,
        }
    }
}

fn is_multipart(content_type: &str) -> bool {
    media_type(content_type).starts_with("multipart/")
}

/// Turn one header+body pair into parts, re-segmenting `multipart/*`
/// containers with their own boundary so their children become siblings.
fn flatten(
    headers: HeaderMap,
    body: &str,
    depth: usize,
    options: &ParseOptions,
    out: &mut Vec<Part>,
) {
    let content_type = headers.get("content-type").unwrap_or("");
    if is_multipart(content_type) {
        if let Some(boundary) = boundary_of(content_type) {
            if depth < options.max_depth {
                let segments = split_by_boundary(body, &boundary);
                debug!(
                    boundary = %boundary,
                    depth,
                    segments = segments.len(),
                    "Flattening nested multipart"
                );
                for segment in segments {
                    let (child_headers, child_body) = parse_header_block(segment);
                    flatten(child_headers, child_body, depth + 1, options, out);
                }
                return;
            }
            warn!(
                depth,
                max_depth = options.max_depth,
                "Nested multipart too deep, keeping it as a single part"
            );
        }
    }
    out.push(Part::new(headers, trim_blank_lines(body)));
}

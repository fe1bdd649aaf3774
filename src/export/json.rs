//! JSON projection of a parsed message.

use serde::Serialize;

use crate::model::{HeaderMap, Message, Part};

/// Serializable view of a [`Message`].
///
/// Field order is stable; `headers` keeps the source order of the header
/// block and `date` is RFC 3339 (or `null` when the header is missing or
/// unparsable).
#[derive(Debug, Clone, Serialize)]
pub struct MessageRecord<'a> {
    pub id: &'a str,
    pub subject: &'a str,
    pub from: &'a str,
    pub to: &'a str,
    pub reply_to: &'a str,
    pub date: Option<String>,
    pub headers: &'a HeaderMap,
    pub parts: Vec<PartRecord<'a>>,
}

/// Serializable view of a [`Part`]. `content` is the decoded body as
/// (lossy) UTF-8.
#[derive(Debug, Clone, Serialize)]
pub struct PartRecord<'a> {
    pub headers: &'a HeaderMap,
    pub content: String,
    pub filename: Option<String>,
    pub size: usize,
}

impl<'a> From<&'a Part> for PartRecord<'a> {
    fn from(part: &'a Part) -> Self {
        Self {
            headers: part.headers(),
            content: part.text().into_owned(),
            filename: part.filename(),
            size: part.size(),
        }
    }
}

impl Message {
    /// Borrowing projection used for serialization.
    pub fn to_record(&self) -> MessageRecord<'_> {
        MessageRecord {
            id: self.id(),
            subject: self.subject(),
            from: self.from(),
            to: self.to(),
            reply_to: self.reply_to(),
            date: self.date().map(|d| d.to_rfc3339()),
            headers: self.headers(),
            parts: self.parts().iter().map(PartRecord::from).collect(),
        }
    }
}

/// Serialize a message to a JSON string.
pub fn to_json(message: &Message, pretty: bool) -> serde_json::Result<String> {
    let record = message.to_record();
    if pretty {
        serde_json::to_string_pretty(&record)
    } else {
        serde_json::to_string(&record)
    }
}

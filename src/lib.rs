//! `mimeparse` — a lenient parser for RFC 822 / MIME email messages.
//!
//! A raw message goes in, a [`Message`] comes out: top-level headers plus
//! a flat list of decoded [`Part`]s. Parsing never fails; malformed input
//! yields fewer headers or parts instead of an error.
//!
//! ```
//! use mimeparse::Message;
//!
//! let msg = Message::parse("Subject: Hi\nContent-Type: text/plain\n\nHello");
//! assert_eq!(msg.subject(), "Hi");
//! assert_eq!(msg.text_part().unwrap().text(), "Hello");
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod parser;

pub use error::{MimeError, Result};
pub use model::{HeaderMap, Message, Part};
pub use parser::ParseOptions;

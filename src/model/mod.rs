//! Data model: parsed messages, their parts and header maps.

pub mod headers;
pub mod message;
pub mod part;

pub use headers::HeaderMap;
pub use message::Message;
pub use part::Part;

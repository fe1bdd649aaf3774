//! Export: JSON projection, attachment extraction and text summaries.

pub mod attachment;
pub mod json;
pub mod text;

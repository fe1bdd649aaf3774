//! Write a message's attachments to disk.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{MimeError, Result};
use crate::model::Message;

/// Longest file name we produce, in characters.
const MAX_FILENAME_LEN: usize = 150;

/// Save every attachment of `message` into `output_dir`.
///
/// The directory is created if needed. File names come from
/// [`Part::attachment_name`](crate::model::Part::attachment_name), are
/// sanitized, and never overwrite an existing file. Returns the written
/// paths in part order.
pub fn save_attachments(message: &Message, output_dir: &Path) -> Result<Vec<PathBuf>> {
    if output_dir.exists() && !output_dir.is_dir() {
        return Err(MimeError::InvalidPath(format!(
            "{} is not a directory",
            output_dir.display()
        )));
    }
    std::fs::create_dir_all(output_dir).map_err(|e| MimeError::io(output_dir, e))?;

    let mut paths = Vec::new();
    for part in message.attachments() {
        let filename = sanitize_filename_part(&part.attachment_name(), MAX_FILENAME_LEN);
        let path = unique_path(&output_dir.join(&filename));
        std::fs::write(&path, part.content()).map_err(|e| MimeError::io(&path, e))?;
        debug!(path = %path.display(), bytes = part.size(), "Saved attachment");
        paths.push(path);
    }

    if paths.is_empty() {
        warn!(id = message.id(), "Message has no attachments");
    }
    Ok(paths)
}

/// Replace anything that is not safe in a file name with `_`.
pub fn sanitize_filename_part(s: &str, max_len: usize) -> String {
    let sanitized: String = s
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '.' | '_' | '@') {
                c
            } else {
                '_'
            }
        })
        .take(max_len)
        .collect();

    // A bare ".." would still escape the output directory.
    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        "unknown".to_string()
    } else {
        sanitized
    }
}

/// If `path` already exists, append a counter to make it unique.
fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("file");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let parent = path.parent().unwrap_or(Path::new("."));

    let mut i = 1usize;
    loop {
        let candidate = if ext.is_empty() {
            parent.join(format!("{stem}_{i}"))
        } else {
            parent.join(format!("{stem}_{i}.{ext}"))
        };
        if !candidate.exists() {
            return candidate;
        }
        i += 1;
    }
}

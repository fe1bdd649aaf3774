//! Human-readable summary of a parsed message.

use humansize::{format_size, BINARY};

use crate::model::Message;

/// Render the envelope headers, the part list and the text body.
///
/// The body is the first `text/plain` part, or nothing when the message
/// only has HTML or binary content.
pub fn render_summary(message: &Message) -> String {
    let mut out = String::new();

    let date = message
        .date()
        .map(|d| d.format("%a, %d %b %Y %H:%M:%S %z").to_string())
        .unwrap_or_else(|| message.header_or("date", "").to_string());

    out.push_str(&format!("Date:       {date}\n"));
    out.push_str(&format!("From:       {}\n", message.from()));
    out.push_str(&format!("To:         {}\n", message.to()));
    if !message.reply_to().is_empty() {
        out.push_str(&format!("Reply-To:   {}\n", message.reply_to()));
    }
    out.push_str(&format!("Subject:    {}\n", message.subject()));
    if !message.id().is_empty() {
        out.push_str(&format!("Message-ID: {}\n", message.id()));
    }
    out.push_str(&format!(
        "Size:       {}\n",
        format_size(message.size(), BINARY)
    ));

    out.push_str(&format!("\n[Parts: {}]\n", message.parts().len()));
    for (i, part) in message.parts().iter().enumerate() {
        let media = part.media_type();
        let media = if media.is_empty() { "(none)".to_string() } else { media };
        let size = format_size(part.size(), BINARY);
        out.push_str(&format!("  {}. {media} ({size})", i + 1));
        if part.is_attachment() {
            out.push_str(&format!(" attachment: {}", part.attachment_name()));
        } else if let Some(name) = part.filename() {
            out.push_str(&format!(" inline: {name}"));
        }
        out.push('\n');
    }

    if let Some(text) = message.text_part() {
        out.push_str(&format!("\n{}\n\n", "-".repeat(72)));
        out.push_str(&text.text());
        out.push('\n');
    }

    out
}

//! Raw RFC 822 bytes to a [`Message`].
//!
//! `Subject` and the body are decoded by `mail-parser`. Every other header
//! is kept as its raw, unfolded text: the formatter only asks whether the
//! address headers are empty and copies the date verbatim. When a header
//! repeats, the first occurrence is used.

use mail_parser::{HeaderName, MessageParser, PartType};
use wb_domain::Message;

/// Parse a raw message. `None` when the bytes are not a message at all.
pub fn parse_message(raw: &[u8]) -> Option<Message> {
    let raw = skip_from_line(raw);
    let parsed = MessageParser::default().parse(raw)?;

    let mut message = Message::new();
    for (name, value) in unfold_headers(&raw_header_block(raw)) {
        if message.header(&name).is_none() {
            message.set_header(&name, value);
        }
    }
    let subject = parsed
        .headers()
        .iter()
        .find(|header| header.name == HeaderName::Subject)
        .and_then(|header| header.value().as_text());
    if let Some(subject) = subject {
        message.set_header("subject", subject);
    }

    let plain = parsed
        .text_body
        .first()
        .and_then(|&id| parsed.parts.get(id as usize))
        .and_then(|part| match &part.body {
            PartType::Text(text) => Some(text.to_string()),
            _ => None,
        });
    if let Some(body) = plain {
        message = message.with_body(body);
    }
    Some(message)
}

/// Skip a BOM and an mbox `From ` separator line.
fn skip_from_line(data: &[u8]) -> &[u8] {
    let data = data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data);
    if data.starts_with(b"From ") {
        if let Some(pos) = data.iter().position(|&b| b == b'\n') {
            return &data[pos + 1..];
        }
    }
    data
}

/// Everything before the first blank line.
fn raw_header_block(data: &[u8]) -> String {
    let text = String::from_utf8_lossy(data);
    let end = [text.find("\r\n\r\n"), text.find("\n\n")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(text.len());
    text[..end].to_string()
}

/// Join continuation lines onto their header. Returns
/// `(lowercase_name, value)` pairs in order.
fn unfold_headers(text: &str) -> Vec<(String, String)> {
    let mut result: Vec<(String, String)> = Vec::new();
    for line in text.lines() {
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some(last) = result.last_mut() {
                last.1.push(' ');
                last.1.push_str(line.trim());
            }
        } else if let Some(colon_pos) = line.find(':') {
            let name = line[..colon_pos].trim().to_lowercase();
            let value = line[colon_pos + 1..].trim().to_string();
            result.push((name, value));
        }
    }
    result
}

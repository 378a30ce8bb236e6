//! Turns a shared-link email into one line of reading-list wikitext.
//!
//! A share is a message blind-copied to the ingestion mailbox whose body is
//! a URL, optionally captioned by the subject. Anything else yields `None`.

use percent_encoding::percent_decode_str;
use regex::{NoExpand, Regex, RegexBuilder};
use std::sync::LazyLock;
use tracing::debug;
use wb_domain::Message;

/// A static URL rewrite: case-insensitive, anchored at the start of the
/// entry, applied at most once.
#[derive(Debug, Clone, Copy)]
pub struct RewriteRule {
    pub pattern: &'static str,
    pub replacement: &'static str,
}

/// Applied in order.
pub const REWRITES: &[RewriteRule] = &[
    RewriteRule {
        pattern: r"^https?://en\.(m\.)?wikipedia\.org/wiki/",
        replacement: WIKIPEDIA_PREFIX,
    },
    RewriteRule {
        pattern: r"^https?://youtu\.be/",
        replacement: "https://www.youtube.com/watch?v=",
    },
];

const WIKIPEDIA_PREFIX: &str = "wikipedia:";

const ADDRESS_HEADERS: [&str; 3] = ["to", "cc", "bcc"];

static COMPILED_REWRITES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    REWRITES
        .iter()
        .map(|rule| {
            let regex = RegexBuilder::new(rule.pattern)
                .case_insensitive(true)
                .build()
                .expect("built-in rewrite pattern is valid");
            (regex, rule.replacement)
        })
        .collect()
});

/// Format `message` as a reading-list entry, or `None` if it is not a share.
pub fn entry_for(message: &Message) -> Option<String> {
    if let Some(header) = ADDRESS_HEADERS
        .iter()
        .find(|name| message.header(name).is_some_and(|value| !value.is_empty()))
    {
        debug!(header, "message is addressed directly, not a share");
        return None;
    }

    let Some(body) = message.body_plain() else {
        debug!("message has no text/plain body");
        return None;
    };
    let entry = body.trim();
    if entry.is_empty() {
        return None;
    }

    let subject = message
        .header("subject")
        .map(str::trim)
        .filter(|s| !s.is_empty());

    // A forwarded mail keeps its real subject; only bare links get through.
    if subject.is_some() && !looks_like_link(entry) {
        debug!("subject present but body is not a link");
        return None;
    }

    let mut entry = apply_rewrites(entry);

    if entry.starts_with(WIKIPEDIA_PREFIX) {
        let target = percent_decode_str(&entry)
            .decode_utf8_lossy()
            .replace('_', " ");
        entry = format!("[[{target}]]");
        if let Some(subject) = subject {
            entry = format!("{entry} ''<q>{subject}</q>''");
        }
    } else if let Some(subject) = subject {
        entry = format!("[{entry} {subject}]");
    }

    if let Some(date) = message.header("date") {
        entry = format!("{{{{at|{date}}}}} {entry}");
    }

    Some(entry)
}

/// Apply every [`REWRITES`] rule once, in order.
pub fn apply_rewrites(entry: &str) -> String {
    COMPILED_REWRITES
        .iter()
        .fold(entry.to_string(), |text, (regex, replacement)| {
            regex.replace(&text, NoExpand(replacement)).into_owned()
        })
}

/// True when the text before the first colon is `http` or `https`.
fn looks_like_link(entry: &str) -> bool {
    let scheme = entry.split(':').next().unwrap_or_default().to_lowercase();
    scheme == "http" || scheme == "https"
}

//! Appending entries to a bullet-list page without duplicating them.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Bullet marker plus an optional `{{at|...}}` stamp.
static BULLET_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\*\s*(\{\{at\|.*?\}\}\s*)?").expect("bullet prefix pattern is valid")
});

/// Append `new_entries` to `existing` as `* ` bullets, then drop repeated
/// entries. Always ends with a single newline.
pub fn merge_entries(existing: &str, new_entries: &[String]) -> String {
    let mut text = String::from(existing.trim_end());
    for entry in new_entries {
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str("* ");
        text.push_str(entry);
    }
    dedup_lines(&text)
}

/// Keep the first bullet line for each entry body, comparing the text after
/// the bullet and stamp. Non-bullet lines are always kept.
pub fn dedup_lines(text: &str) -> String {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut lines: Vec<&str> = Vec::new();
    for line in text.trim_end().split('\n') {
        if let Some(content) = entry_content(line) {
            if !seen.insert(content) {
                continue;
            }
        }
        lines.push(line);
    }
    let mut merged = lines.join("\n");
    merged.push('\n');
    merged
}

/// Entry body of a bullet line, without the bullet and stamp.
pub fn entry_content(line: &str) -> Option<&str> {
    BULLET_PREFIX.find(line).map(|prefix| &line[prefix.end()..])
}

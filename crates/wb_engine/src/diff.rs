use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};

/// Line counts of a change, for edit reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub inserted: usize,
    pub deleted: usize,
}

/// Unified diff of `old` against `new`. Empty when the texts are equal.
pub fn unified_diff(old: &str, new: &str, context_lines: usize) -> String {
    if old == new {
        return String::new();
    }
    TextDiff::from_lines(old, new)
        .unified_diff()
        .context_radius(context_lines)
        .header("current", "proposed")
        .to_string()
}

pub fn diff_stats(old: &str, new: &str) -> DiffStats {
    let mut stats = DiffStats::default();
    for change in TextDiff::from_lines(old, new).iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => stats.inserted += 1,
            ChangeTag::Delete => stats.deleted += 1,
            ChangeTag::Equal => {}
        }
    }
    stats
}

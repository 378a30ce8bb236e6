use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wb_engine::diff::DiffStats;

/// Action taken on a page
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PageAction {
    /// Page was saved
    Edited,
    /// Page was left alone (skip predicate, no change, dry run, reviewer)
    Skipped,
    /// Fetching or saving the page failed
    Errored,
}

/// Result for a single page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    pub title: String,
    pub action: PageAction,
    /// Why the page was skipped, or a note on the edit
    pub reason: Option<String>,
    /// Proposed change, kept for dry runs and reviewed edits
    pub diff: Option<String>,
    /// Lines added and removed by `diff`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<DiffStats>,
    pub new_revid: Option<u64>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl PageResult {
    pub fn edited(title: impl Into<String>, new_revid: Option<u64>, diff: String) -> Self {
        Self {
            title: title.into(),
            action: PageAction::Edited,
            reason: None,
            diff: Some(diff),
            stats: None,
            new_revid,
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn skipped(title: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            action: PageAction::Skipped,
            reason: Some(reason.into()),
            diff: None,
            stats: None,
            new_revid: None,
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn errored(title: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            action: PageAction::Errored,
            reason: None,
            diff: None,
            stats: None,
            new_revid: None,
            error: Some(error.into()),
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_diff(mut self, diff: String) -> Self {
        self.diff = Some(diff);
        self
    }

    #[must_use]
    pub fn with_stats(mut self, stats: DiffStats) -> Self {
        self.stats = Some(stats);
        self
    }
}

/// One mailbox message and the entry it produced, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResult {
    pub uid: u32,
    pub entry: Option<String>,
    pub deleted: bool,
}

/// Complete bot run report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotReport {
    pub pages_processed: usize,
    pub pages_edited: usize,
    pub pages_skipped: usize,
    pub pages_errored: usize,

    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub elapsed_secs: f64,

    pub page_results: Vec<PageResult>,

    /// Reading-list runs only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub message_results: Vec<MessageResult>,

    /// Whether the run finished or was cut short
    pub completed: bool,
    pub stop_reason: Option<String>,
}

impl BotReport {
    pub fn new(start_time: DateTime<Utc>) -> Self {
        Self {
            pages_processed: 0,
            pages_edited: 0,
            pages_skipped: 0,
            pages_errored: 0,
            start_time,
            end_time: start_time,
            elapsed_secs: 0.0,
            page_results: Vec::new(),
            message_results: Vec::new(),
            completed: false,
            stop_reason: None,
        }
    }

    pub fn record_page(&mut self, result: PageResult) {
        self.pages_processed += 1;
        match result.action {
            PageAction::Edited => self.pages_edited += 1,
            PageAction::Skipped => self.pages_skipped += 1,
            PageAction::Errored => self.pages_errored += 1,
        }
        self.page_results.push(result);
    }

    pub fn record_message(&mut self, result: MessageResult) {
        self.message_results.push(result);
    }

    /// Messages that produced an entry.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.message_results
            .iter()
            .filter_map(|m| m.entry.as_deref())
    }

    pub fn finalize(&mut self, completed: bool, stop_reason: Option<String>) {
        self.end_time = Utc::now();
        self.elapsed_secs =
            (self.end_time - self.start_time).num_milliseconds() as f64 / 1000.0;
        self.completed = completed;
        self.stop_reason = stop_reason;
    }

    /// Human-readable summary
    pub fn to_summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("=== Bot Run Summary ===\n");
        summary.push_str(&format!(
            "Started:  {}\n",
            self.start_time.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        summary.push_str(&format!(
            "Finished: {}\n",
            self.end_time.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        summary.push_str(&format!("Duration: {:.2} seconds\n", self.elapsed_secs));
        summary.push_str(&format!(
            "Status:   {}\n",
            if self.completed { "Completed" } else { "Interrupted" }
        ));
        if let Some(reason) = &self.stop_reason {
            summary.push_str(&format!("Reason:   {}\n", reason));
        }
        if !self.message_results.is_empty() {
            let deleted = self.message_results.iter().filter(|m| m.deleted).count();
            summary.push_str("\n--- Mailbox ---\n");
            summary.push_str(&format!("Messages: {}\n", self.message_results.len()));
            summary.push_str(&format!("Entries:  {}\n", self.entries().count()));
            summary.push_str(&format!("Deleted:  {}\n", deleted));
        }
        summary.push_str("\n--- Statistics ---\n");
        summary.push_str(&format!("Processed: {}\n", self.pages_processed));
        summary.push_str(&format!("Edited:    {}\n", self.pages_edited));
        summary.push_str(&format!("Skipped:   {}\n", self.pages_skipped));
        summary.push_str(&format!("Errors:    {}\n", self.pages_errored));

        let changed = self.edited_line_stats();
        if changed != DiffStats::default() {
            summary.push_str(&format!(
                "Lines:     +{} -{}\n",
                changed.inserted, changed.deleted
            ));
        }

        if self.pages_processed > 0 {
            let edit_rate = (self.pages_edited as f64 / self.pages_processed as f64) * 100.0;
            summary.push_str(&format!("Edit rate: {:.1}%\n", edit_rate));
        }

        summary
    }

    /// Line totals over saved edits.
    pub fn edited_line_stats(&self) -> DiffStats {
        self.page_results
            .iter()
            .filter(|r| r.action == PageAction::Edited)
            .filter_map(|r| r.stats)
            .fold(DiffStats::default(), |acc, s| DiffStats {
                inserted: acc.inserted + s.inserted,
                deleted: acc.deleted + s.deleted,
            })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bot_report_new() {
        let start = Utc::now();
        let report = BotReport::new(start);

        assert_eq!(report.pages_processed, 0);
        assert_eq!(report.start_time, start);
        assert!(!report.completed);
    }

    #[test]
    fn test_bot_report_record_page() {
        let mut report = BotReport::new(Utc::now());

        report.record_page(PageResult::edited("Page1", Some(7), String::new()));
        report.record_page(PageResult::skipped("Page2", "already linked"));
        report.record_page(PageResult::errored("Page3", "boom"));

        assert_eq!(report.pages_processed, 3);
        assert_eq!(report.pages_edited, 1);
        assert_eq!(report.pages_skipped, 1);
        assert_eq!(report.pages_errored, 1);
        assert_eq!(report.page_results[1].reason.as_deref(), Some("already linked"));
    }

    #[test]
    fn test_bot_report_finalize() {
        let mut report = BotReport::new(Utc::now());
        report.finalize(true, Some("All pages processed".to_string()));

        assert!(report.completed);
        assert_eq!(report.stop_reason.as_deref(), Some("All pages processed"));
        assert!(report.elapsed_secs >= 0.0);
    }

    #[test]
    fn test_summary_includes_mailbox_section_only_when_used() {
        let mut report = BotReport::new(Utc::now());
        report.record_page(PageResult::skipped("Page", "dry run"));
        report.finalize(true, None);
        assert!(!report.to_summary().contains("--- Mailbox ---"));

        report.record_message(MessageResult {
            uid: 1,
            entry: Some("x".to_string()),
            deleted: true,
        });
        report.record_message(MessageResult {
            uid: 2,
            entry: None,
            deleted: false,
        });
        let summary = report.to_summary();
        assert!(summary.contains("Messages: 2"));
        assert!(summary.contains("Entries:  1"));
        assert!(summary.contains("Deleted:  1"));
        assert!(summary.contains("Processed: 1"));
    }

    #[test]
    fn test_line_stats_count_saved_edits_only() {
        let mut report = BotReport::new(Utc::now());
        report.record_page(
            PageResult::edited("A", Some(1), String::new()).with_stats(DiffStats {
                inserted: 2,
                deleted: 1,
            }),
        );
        report.record_page(
            PageResult::skipped("B", "dry run").with_stats(DiffStats {
                inserted: 5,
                deleted: 5,
            }),
        );
        report.record_page(PageResult::edited("C", Some(2), String::new()).with_stats(
            DiffStats {
                inserted: 1,
                deleted: 1,
            },
        ));
        report.finalize(true, None);

        assert_eq!(
            report.edited_line_stats(),
            DiffStats {
                inserted: 3,
                deleted: 2
            }
        );
        assert!(report.to_summary().contains("Lines:     +3 -2"));

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["page_results"][0]["stats"]["inserted"], 2);
    }

    #[test]
    fn test_bot_report_json_omits_empty_messages() {
        let mut report = BotReport::new(Utc::now());
        report.record_page(PageResult::edited("Test", None, String::new()));

        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["pages_edited"], 1);
        assert!(value.get("message_results").is_none());
    }
}

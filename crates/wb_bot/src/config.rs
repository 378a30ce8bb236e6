use serde::{Deserialize, Serialize};
use wb_engine::SkipCondition;

pub const DEFAULT_SEARCH_LIMIT: usize = 500;

/// Settings shared by both bots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Maximum number of saved edits (None = unlimited)
    pub max_edits: Option<u32>,

    /// Show diffs without saving or touching the mailbox
    pub dry_run: bool,

    /// Log progress every N pages
    pub log_every_n: u32,

    /// Edit summary; each bot has its own default
    pub summary: Option<String>,

    /// Upper bound on search results the link bot walks
    pub search_limit: usize,

    /// Extra link-bot skip rules, checked after the missing and redirect checks
    #[serde(default)]
    pub skip_conditions: Vec<SkipCondition>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            max_edits: None,
            dry_run: false,
            log_every_n: 10,
            summary: None,
            search_limit: DEFAULT_SEARCH_LIMIT,
            skip_conditions: Vec::new(),
        }
    }
}

impl BotConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_edits(mut self, max: u32) -> Self {
        self.max_edits = Some(max);
        self
    }

    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    #[must_use]
    pub fn with_log_every_n(mut self, n: u32) -> Self {
        self.log_every_n = n.max(1);
        self
    }

    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    #[must_use]
    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }

    #[must_use]
    pub fn with_skip_condition(mut self, condition: SkipCondition) -> Self {
        self.skip_conditions.push(condition);
        self
    }

    /// The configured summary, or `default`.
    pub fn summary_or(&self, default: &str) -> String {
        self.summary.clone().unwrap_or_else(|| default.to_string())
    }
}

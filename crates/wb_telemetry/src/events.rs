use chrono::{DateTime, Utc};
use serde::Serialize;

/// Run-level events, serialised as JSON onto the `wikibots::events` target.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TelemetryEvent {
    SessionStarted {
        bot: String,
        site: String,
        timestamp: DateTime<Utc>,
    },
    MessageProcessed {
        uid: u32,
        outcome: String,
        timestamp: DateTime<Utc>,
    },
    PageProcessed {
        title: String,
        outcome: String,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
    Warning {
        message: String,
        timestamp: DateTime<Utc>,
    },
    SessionCompleted {
        total: usize,
        saved: usize,
        skipped: usize,
        errors: usize,
        elapsed_secs: f64,
        timestamp: DateTime<Utc>,
    },
}

impl TelemetryEvent {
    pub fn session_started(bot: impl Into<String>, site: impl Into<String>) -> Self {
        Self::SessionStarted {
            bot: bot.into(),
            site: site.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn message_processed(uid: u32, outcome: impl Into<String>) -> Self {
        Self::MessageProcessed {
            uid,
            outcome: outcome.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn page_processed(
        title: impl Into<String>,
        outcome: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Self::PageProcessed {
            title: title.into(),
            outcome: outcome.into(),
            duration_ms,
            timestamp: Utc::now(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn session_completed(
        total: usize,
        saved: usize,
        skipped: usize,
        errors: usize,
        elapsed_secs: f64,
    ) -> Self {
        Self::SessionCompleted {
            total,
            saved,
            skipped,
            errors,
            elapsed_secs,
            timestamp: Utc::now(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn emit(&self) {
        tracing::trace!(target: "wikibots::events", event = %self.to_json());
    }
}

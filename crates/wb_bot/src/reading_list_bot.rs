//! Drains the reading-list mailbox onto a wiki page.
//!
//! One run is: fetch every message, format the shareable ones, merge the
//! entries into the page, save, then delete exactly the messages that were
//! turned into entries. Messages are only flagged once the page holds their
//! entries, so a failed save leaves the mailbox untouched for the next run.

use crate::config::BotConfig;
use crate::error::BotError;
use crate::report::{BotReport, MessageResult, PageResult};
use crate::review::{EditReview, ReviewDecision};
use chrono::Utc;
use std::time::Instant;
use tracing::{debug, info, warn};
use wb_domain::types::Title;
use wb_engine::diff::{diff_stats, unified_diff};
use wb_engine::{entry_for, merge_entries};
use wb_mail::{Mailbox, parse_message};
use wb_mw_api::client::{EditRequest, MediaWikiClient};
use wb_telemetry::TelemetryEvent;

pub const DEFAULT_SUMMARY: &str = "update reading list";

pub struct ReadingListBot<C: MediaWikiClient, M: Mailbox> {
    config: BotConfig,
    client: C,
    mailbox: M,
    page: Title,
    report: BotReport,
}

impl<C: MediaWikiClient, M: Mailbox> ReadingListBot<C, M> {
    pub fn new(config: BotConfig, client: C, mailbox: M, page: Title) -> Self {
        Self {
            config,
            client,
            mailbox,
            page,
            report: BotReport::new(Utc::now()),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn mailbox(&self) -> &M {
        &self.mailbox
    }

    pub fn report(&self) -> &BotReport {
        &self.report
    }

    /// Run once. The mailbox is logged out whatever the outcome.
    pub async fn run(&mut self, review: &mut dyn EditReview) -> Result<BotReport, BotError> {
        info!(page = %self.page, dry_run = self.config.dry_run, "Starting reading-list run");
        TelemetryEvent::session_started("reading-list", self.page.display.clone()).emit();

        let outcome = self.drain(review).await;
        if let Err(e) = self.mailbox.logout().await {
            warn!(error = %e, "Mailbox logout failed");
            TelemetryEvent::warning(format!("Mailbox logout failed: {}", e)).emit();
        }
        outcome?;

        TelemetryEvent::session_completed(
            self.report.message_results.len(),
            self.report.pages_edited,
            self.report.pages_skipped,
            self.report.pages_errored,
            self.report.elapsed_secs,
        )
        .emit();
        Ok(self.report.clone())
    }

    async fn drain(&mut self, review: &mut dyn EditReview) -> Result<(), BotError> {
        let messages = self.mailbox.fetch_messages().await?;
        info!(count = messages.len(), "Fetched messages");

        let mut entries = Vec::new();
        let mut uids = Vec::new();
        for message in &messages {
            let entry = parse_message(&message.raw).and_then(|m| entry_for(&m));
            match &entry {
                Some(line) => {
                    debug!(uid = message.uid, entry = %line, "Queued entry");
                    entries.push(line.clone());
                    uids.push(message.uid);
                }
                None => debug!(uid = message.uid, "Not a shared link, leaving it in the mailbox"),
            }
            let outcome = if entry.is_some() { "queued" } else { "ignored" };
            TelemetryEvent::message_processed(message.uid, outcome).emit();
            self.report.record_message(MessageResult {
                uid: message.uid,
                entry,
                deleted: false,
            });
        }

        if entries.is_empty() {
            info!("No new entries");
            self.report.finalize(true, Some("No new entries".to_string()));
            return Ok(());
        }

        let started = Instant::now();
        let title = self.page.display.clone();
        let page = self.client.get_page(&self.page).await?;
        let merged = merge_entries(&page.wikitext, &entries);

        // The wiki strips trailing whitespace on save.
        if merged.trim_end() == page.wikitext.trim_end() {
            info!(page = %title, "Every entry is already listed");
            self.report.record_page(PageResult::skipped(&title, "no change"));
            if !self.config.dry_run {
                self.delete_messages(&uids).await?;
            }
            self.report
                .finalize(true, Some("All entries already listed".to_string()));
            return Ok(());
        }

        let diff = unified_diff(&page.wikitext, &merged, 3);
        let stats = diff_stats(&page.wikitext, &merged);
        if self.config.dry_run {
            info!(page = %title, entries = entries.len(), "Dry-run: would update page");
            self.report.record_page(
                PageResult::skipped(&title, "dry run")
                    .with_diff(diff)
                    .with_stats(stats),
            );
            self.report.finalize(true, Some("Dry run".to_string()));
            return Ok(());
        }

        match review.review(&self.page, &diff) {
            ReviewDecision::Save => {}
            ReviewDecision::Skip => {
                self.report.record_page(
                    PageResult::skipped(&title, "skipped by reviewer")
                        .with_diff(diff)
                        .with_stats(stats),
                );
                self.report.finalize(true, Some("Edit skipped".to_string()));
                return Ok(());
            }
            ReviewDecision::Stop => {
                self.report
                    .record_page(PageResult::skipped(&title, "stopped by reviewer"));
                self.report.finalize(false, Some("Stopped by user".to_string()));
                return Ok(());
            }
        }

        let summary = self.config.summary_or(DEFAULT_SUMMARY);
        let request = EditRequest::replacing(&page, merged, summary);
        let response = match self.client.edit_page(&request).await {
            Ok(response) => response,
            Err(e) => {
                self.report.record_page(PageResult::errored(&title, e.to_string()));
                self.report.finalize(false, Some("Save failed".to_string()));
                return Err(e.into());
            }
        };
        info!(
            page = %title,
            revid = ?response.new_revid,
            entries = entries.len(),
            "Saved reading list"
        );
        let elapsed_ms = started.elapsed().as_millis() as u64;
        TelemetryEvent::page_processed(&title, "edited", elapsed_ms).emit();
        self.report
            .record_page(PageResult::edited(&title, response.new_revid, diff).with_stats(stats));

        self.delete_messages(&uids).await?;
        self.report
            .finalize(true, Some("Reading list updated".to_string()));
        Ok(())
    }

    async fn delete_messages(&mut self, uids: &[u32]) -> Result<(), BotError> {
        for &uid in uids {
            self.mailbox.mark_deleted(uid).await?;
            if let Some(result) = self
                .report
                .message_results
                .iter_mut()
                .find(|m| m.uid == uid)
            {
                result.deleted = true;
            }
        }
        self.mailbox.expunge().await?;
        debug!(count = uids.len(), "Expunged processed messages");
        Ok(())
    }
}

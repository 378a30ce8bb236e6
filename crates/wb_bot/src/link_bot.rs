use crate::config::BotConfig;
use crate::error::BotError;
use crate::report::{BotReport, PageAction, PageResult};
use crate::review::{EditReview, ReviewDecision};
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tokio::signal;
use wb_domain::types::{Namespace, SkipDecision, Title};
use wb_engine::diff::{diff_stats, unified_diff};
use wb_engine::{LinkInserter, SkipEngine};
use wb_mw_api::client::{EditRequest, MediaWikiClient};
use wb_telemetry::TelemetryEvent;

/// Searches article space for a term and links its first unlinked mention
/// on each hit, one page at a time.
pub struct LinkBot<C: MediaWikiClient> {
    config: BotConfig,
    client: C,
    inserter: LinkInserter,
    skip: SkipEngine,
    report: BotReport,
    stop_requested: bool,
}

impl<C: MediaWikiClient> LinkBot<C> {
    pub fn new(config: BotConfig, client: C, term: &str) -> Result<Self, BotError> {
        let inserter = LinkInserter::new(term)?;
        let skip = SkipEngine::existing_non_redirect(config.skip_conditions.clone())?;
        Ok(Self {
            config,
            client,
            inserter,
            skip,
            report: BotReport::new(Utc::now()),
            stop_requested: false,
        })
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn report(&self) -> &BotReport {
        &self.report
    }

    pub async fn run(&mut self, review: &mut dyn EditReview) -> Result<BotReport, BotError> {
        let term = self.inserter.term().to_string();
        TelemetryEvent::session_started("link", term.clone()).emit();

        let titles = self
            .client
            .search(&term, &[Namespace::MAIN], self.config.search_limit)
            .await?;
        tracing::info!("Starting link run for '{}' over {} pages", term, titles.len());

        let shutdown_flag = Arc::new(AtomicBool::new(false));
        let shutdown_flag_clone = shutdown_flag.clone();
        let listener = tokio::spawn(async move {
            if let Ok(()) = signal::ctrl_c().await {
                tracing::info!("Received interrupt signal");
                shutdown_flag_clone.store(true, Ordering::SeqCst);
            }
        });

        self.walk(&titles, review, &shutdown_flag).await;
        listener.abort();

        TelemetryEvent::session_completed(
            self.report.pages_processed,
            self.report.pages_edited,
            self.report.pages_skipped,
            self.report.pages_errored,
            self.report.elapsed_secs,
        )
        .emit();
        Ok(self.report.clone())
    }

    async fn walk(&mut self, titles: &[Title], review: &mut dyn EditReview, shutdown: &AtomicBool) {
        for (index, title) in titles.iter().enumerate() {
            if let Some(reason) = self.should_stop() {
                tracing::info!("Stopping bot: {}", reason);
                self.report.finalize(false, Some(reason));
                return;
            }
            if shutdown.load(Ordering::SeqCst) {
                tracing::info!("Graceful shutdown initiated");
                self.report
                    .finalize(false, Some("Interrupted by user".to_string()));
                return;
            }

            let started = Instant::now();
            let result = match self.process_page(title, review).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("Error processing page {}: {}", title, e);
                    TelemetryEvent::warning(format!("{}: {}", title.display, e)).emit();
                    PageResult::errored(&title.display, e.to_string())
                }
            };
            let outcome = match result.action {
                PageAction::Edited => "edited",
                PageAction::Skipped => "skipped",
                PageAction::Errored => "errored",
            };
            let elapsed_ms = started.elapsed().as_millis() as u64;
            TelemetryEvent::page_processed(&title.display, outcome, elapsed_ms).emit();
            self.report.record_page(result);

            if self.stop_requested {
                self.report.finalize(false, Some("Stopped by user".to_string()));
                return;
            }

            if (index + 1) % self.config.log_every_n.max(1) as usize == 0 {
                tracing::info!(
                    "Progress: {}/{} pages ({} edited, {} skipped, {} errors)",
                    index + 1,
                    titles.len(),
                    self.report.pages_edited,
                    self.report.pages_skipped,
                    self.report.pages_errored
                );
            }
        }

        self.report
            .finalize(true, Some("All pages processed".to_string()));
    }

    async fn process_page(
        &mut self,
        title: &Title,
        review: &mut dyn EditReview,
    ) -> Result<PageResult, BotError> {
        tracing::debug!("Processing page: {}", title);
        let page = self.client.get_page(title).await?;

        for decision in [self.skip.evaluate(&page), self.inserter.evaluate(&page)] {
            if let SkipDecision::Skip(reason) = decision {
                tracing::debug!("Skipping page {} ({})", title, reason);
                return Ok(PageResult::skipped(&title.display, reason));
            }
        }

        let Some(new_text) = self.inserter.apply(&page.wikitext) else {
            tracing::debug!("Skipping page {} (term not in text)", title);
            return Ok(PageResult::skipped(&title.display, "term not found"));
        };
        let diff = unified_diff(&page.wikitext, &new_text, 3);
        let stats = diff_stats(&page.wikitext, &new_text);

        if self.config.dry_run {
            tracing::info!("Dry-run: would edit page {}", title);
            return Ok(PageResult::skipped(&title.display, "dry run")
                .with_diff(diff)
                .with_stats(stats));
        }

        match review.review(title, &diff) {
            ReviewDecision::Save => {}
            ReviewDecision::Skip => {
                return Ok(PageResult::skipped(&title.display, "skipped by reviewer")
                    .with_diff(diff)
                    .with_stats(stats));
            }
            ReviewDecision::Stop => {
                self.stop_requested = true;
                return Ok(PageResult::skipped(&title.display, "stopped by reviewer"));
            }
        }

        let summary = self.config.summary_or(&self.inserter.summary());
        let response = self
            .client
            .edit_page(&EditRequest::replacing(&page, new_text, summary))
            .await?;
        tracing::info!("Saved page {} (rev: {:?})", title, response.new_revid);
        Ok(PageResult::edited(&title.display, response.new_revid, diff).with_stats(stats))
    }

    fn should_stop(&self) -> Option<String> {
        let max = self.config.max_edits?;
        (self.report.pages_edited >= max as usize)
            .then(|| format!("Maximum edits reached: {}", max))
    }
}

use super::review::InteractiveReview;
use anyhow::{Context, Result};
use console::style;
use std::path::PathBuf;
use wb_bot::{AlwaysSave, BotConfig, EditReview, ReadingListBot};
use wb_domain::types::{Namespace, Title};
use wb_mail::ImapMailbox;

pub async fn run(config_path: Option<PathBuf>, dry_run: bool, always: bool) -> Result<()> {
    let config = super::load_config(config_path)?;
    let reading_list = config
        .reading_list
        .as_ref()
        .context("The config file has no [reading_list] section")?;
    let dry_run = dry_run || config.bot.dry_run;

    println!("{}", style("Reading list").bold().cyan());
    println!("Wiki: {}", config.site.api_url);
    println!("Page: {}", reading_list.page);
    println!(
        "Mode: {}",
        if dry_run {
            style("DRY-RUN").yellow()
        } else if always {
            style("AUTONOMOUS").green().bold()
        } else {
            style("INTERACTIVE").cyan()
        }
    );
    println!();

    let client = super::connect_site(&config.site).await?;

    let mailbox = match ImapMailbox::connect(&reading_list.mailbox).await {
        Ok(mailbox) => mailbox,
        Err(e) if e.is_session_lost() => {
            tracing::info!("Mailbox session lost: {}", e);
            return Ok(());
        }
        Err(e) => {
            return Err(e).with_context(|| {
                format!("Failed to connect to {}", reading_list.mailbox.host)
            });
        }
    };

    let bot_config = BotConfig::new().with_dry_run(dry_run);
    let page = Title::new(Namespace::MAIN, reading_list.page.clone());
    let mut bot = ReadingListBot::new(bot_config, client, mailbox, page);

    let mut review: Box<dyn EditReview> = if always {
        Box::new(AlwaysSave)
    } else {
        Box::new(InteractiveReview)
    };

    let report = match bot.run(review.as_mut()).await {
        Ok(report) => report,
        Err(e) if e.is_session_lost() => {
            // Another client expunged under us; the next run picks up where this left off.
            println!("{} {}", style("ℹ").cyan(), e);
            return Ok(());
        }
        Err(e) => return Err(e).context("Reading-list run failed"),
    };

    for entry in report.entries() {
        println!("  {} {}", style("+").green(), entry);
    }
    if dry_run {
        for diff in report.page_results.iter().filter_map(|r| r.diff.as_deref()) {
            super::print_diff(diff);
        }
    }

    println!();
    println!("{}", style("═".repeat(60)).dim());
    println!("{}", report.to_summary());
    println!("{}", style("═".repeat(60)).dim());
    Ok(())
}

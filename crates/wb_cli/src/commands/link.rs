use super::review::InteractiveReview;
use anyhow::{Context, Result};
use console::style;
use std::path::PathBuf;
use wb_bot::{AlwaysSave, BotConfig, EditReview, LinkBot};
use wb_engine::SkipCondition;

pub struct LinkArgs {
    pub config_path: Option<PathBuf>,
    pub term: String,
    pub limit: usize,
    pub dry_run: bool,
    pub max_edits: Option<u32>,
    pub always: bool,
    pub skip_matching: Vec<String>,
    pub report_path: Option<PathBuf>,
}

pub async fn run(args: LinkArgs) -> Result<()> {
    let LinkArgs {
        config_path,
        term,
        limit,
        dry_run,
        max_edits,
        always,
        skip_matching,
        report_path,
    } = args;
    let config = super::load_config(config_path)?;
    let dry_run = dry_run || config.bot.dry_run;
    let max_edits = max_edits.or(config.bot.max_edits);

    println!("{}", style("Link bot").bold().cyan());
    println!("Wiki: {}", config.site.api_url);
    println!("Term: {}", term);
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
    if let Some(max) = max_edits {
        println!("Max edits: {}", max);
    }
    println!();

    let client = super::connect_site(&config.site).await?;

    let mut bot_config = BotConfig::new()
        .with_dry_run(dry_run)
        .with_search_limit(limit);
    if let Some(max) = max_edits {
        bot_config = bot_config.with_max_edits(max);
    }
    for pattern in skip_matching {
        bot_config = bot_config.with_skip_condition(SkipCondition::RegexMatch {
            pattern,
            invert: true,
        });
    }

    let mut bot = LinkBot::new(bot_config, client, &term).context("Invalid link bot setup")?;
    let mut review: Box<dyn EditReview> = if always {
        Box::new(AlwaysSave)
    } else {
        Box::new(InteractiveReview)
    };

    let report = bot.run(review.as_mut()).await.context("Link run failed")?;

    if dry_run {
        for result in &report.page_results {
            if let Some(diff) = result.diff.as_deref() {
                match result.stats {
                    Some(stats) => println!(
                        "\n{} {}",
                        style(&result.title).bold(),
                        style(format!("(+{} -{})", stats.inserted, stats.deleted)).dim()
                    ),
                    None => println!("\n{}", style(&result.title).bold()),
                }
                super::print_diff(diff);
            }
        }
    }

    println!();
    println!("{}", style("═".repeat(60)).dim());
    println!("{}", report.to_summary());
    println!("{}", style("═".repeat(60)).dim());

    if let Some(path) = report_path {
        std::fs::write(&path, report.to_json()?)
            .with_context(|| format!("Failed to save report to {}", path.display()))?;
        println!("Report saved to: {}", path.display());
    }

    Ok(())
}

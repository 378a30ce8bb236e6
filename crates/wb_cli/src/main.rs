use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use url::Url;

mod commands;

#[derive(Parser)]
#[command(name = "wikibots")]
#[command(version, long_about = None)]
#[command(about = "Wiki maintenance bots: email-fed reading list and wikilink inserter")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter configuration file
    InitConfig {
        /// Configuration file path (default: platform config dir)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Wiki API URL (e.g., https://en.wikipedia.org/w/api.php)
        #[arg(long)]
        wiki: Url,

        /// Bot username (Special:BotPasswords form, e.g. Reader@bot)
        #[arg(long)]
        username: String,

        /// Short name for the site
        #[arg(long, default_value = "default")]
        site_id: String,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Move shared links from the mailbox onto the reading-list page
    ReadingList {
        /// Configuration file path (default: platform config dir)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Show the page diff without saving or deleting mail
        #[arg(long)]
        dry_run: bool,

        /// Save without asking for confirmation
        #[arg(long)]
        always: bool,
    },

    /// Link the first unlinked mention of a term on every page that has one
    Link {
        /// Configuration file path (default: platform config dir)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Term to search for and link
        #[arg(long)]
        term: String,

        /// Maximum number of search results to visit
        #[arg(long, default_value = "500")]
        limit: usize,

        /// Show diffs without saving
        #[arg(long)]
        dry_run: bool,

        /// Maximum number of edits (default: from config, else unlimited)
        #[arg(long)]
        max_edits: Option<u32>,

        /// Save without asking for confirmation
        #[arg(long)]
        always: bool,

        /// Skip pages whose wikitext matches this regex (repeatable)
        #[arg(long = "skip-matching", value_name = "REGEX")]
        skip_matching: Vec<String>,

        /// Write the JSON run report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Print the reading-list entry each raw RFC 822 message would produce
    FormatEntry {
        /// Message files (.eml)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    wb_telemetry::init_telemetry(&wb_telemetry::TelemetryConfig {
        level: match cli.verbose {
            0 => tracing::Level::INFO,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        },
        json_output: cli.json_logs,
    })?;

    match cli.command {
        Commands::InitConfig {
            config,
            wiki,
            username,
            site_id,
            force,
        } => commands::init_config::run(config, wiki, username, site_id, force),
        Commands::ReadingList {
            config,
            dry_run,
            always,
        } => commands::reading_list::run(config, dry_run, always).await,
        Commands::Link {
            config,
            term,
            limit,
            dry_run,
            max_edits,
            always,
            skip_matching,
            report,
        } => {
            commands::link::run(commands::link::LinkArgs {
                config_path: config,
                term,
                limit,
                dry_run,
                max_edits,
                always,
                skip_matching,
                report_path: report,
            })
            .await
        }
        Commands::FormatEntry { files } => commands::format_entry::run(files),
    }
}

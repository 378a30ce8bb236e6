use anyhow::{Context, Result};
use console::style;
use std::path::PathBuf;
use url::Url;
use wb_domain::profile::ThrottlePolicy;
use wb_storage::config::SiteConfig;
use wb_storage::{BotSettings, WikibotsConfig};

pub fn run(
    config: Option<PathBuf>,
    wiki: Url,
    username: String,
    site_id: String,
    force: bool,
) -> Result<()> {
    let store = super::config_store(config)?;
    if store.path().exists() && !force {
        anyhow::bail!(
            "{} already exists; pass --force to replace it",
            store.path().display()
        );
    }

    let config = WikibotsConfig {
        site: SiteConfig {
            id: site_id,
            api_url: wiki,
            username,
            password: None,
            throttle_policy: ThrottlePolicy::default(),
        },
        reading_list: None,
        bot: BotSettings::default(),
    };
    store
        .save(&config)
        .with_context(|| format!("Failed to write {}", store.path().display()))?;

    println!(
        "{} Wrote {}",
        style("✓").green().bold(),
        store.path().display()
    );
    println!("Add a [reading_list.mailbox] section to use the reading-list bot.");
    println!(
        "Passwords can stay out of the file: set WIKIBOTS_BOT_PASSWORD and WIKIBOTS_MAILBOX_PASSWORD."
    );
    Ok(())
}

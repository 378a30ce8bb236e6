pub mod format_entry;
pub mod init_config;
pub mod link;
pub mod reading_list;
pub mod review;

use anyhow::{Context, Result};
use console::style;
use secrecy::ExposeSecret;
use std::io::Write;
use std::path::PathBuf;
use wb_mw_api::client::{MediaWikiClient, ReqwestMwClient};
use wb_storage::config::SiteConfig;
use wb_storage::config_store::default_config_path;
use wb_storage::{TomlConfigStore, WikibotsConfig};

pub(crate) fn config_store(path: Option<PathBuf>) -> Result<TomlConfigStore> {
    let path = match path {
        Some(path) => path,
        None => default_config_path()
            .context("No config directory on this platform; pass --config")?,
    };
    Ok(TomlConfigStore::new(path))
}

pub(crate) fn load_config(path: Option<PathBuf>) -> Result<WikibotsConfig> {
    let store = config_store(path)?;
    store
        .load()
        .with_context(|| format!("Failed to load config from {}", store.path().display()))
}

/// Log in with the site's bot password and prime the CSRF token.
pub(crate) async fn connect_site(site: &SiteConfig) -> Result<ReqwestMwClient> {
    let password = site
        .password
        .as_ref()
        .context(
            "No bot password configured. Set it in the config file or WIKIBOTS_BOT_PASSWORD.",
        )?;

    let profile = site.profile();
    let client = ReqwestMwClient::new(profile.api_url, profile.throttle_policy)
        .context("Failed to create HTTP client")?;

    print!("Logging in to {} as {}... ", profile.id, profile.username);
    std::io::stdout().flush().ok();
    client
        .login_bot_password(&profile.username, password.expose_secret())
        .await
        .context("Login failed")?;
    println!("{}", style("✓").green().bold());

    client
        .fetch_csrf_token()
        .await
        .context("Failed to fetch CSRF token")?;
    Ok(client)
}

pub(crate) fn print_diff(diff: &str) {
    for line in diff.lines() {
        if line.starts_with("+++") || line.starts_with("---") {
            println!("{}", style(line).bold());
        } else if line.starts_with('+') {
            println!("{}", style(line).green());
        } else if line.starts_with('-') {
            println!("{}", style(line).red());
        } else if line.starts_with("@@") {
            println!("{}", style(line).cyan());
        } else {
            println!("{}", line);
        }
    }
}

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use wb_domain::profile::{SiteProfile, ThrottlePolicy};
use wb_mail::MailboxConfig;

pub const DEFAULT_READING_LIST_PAGE: &str = "Reading list";

/// Environment variable overriding `site.password`.
pub const BOT_PASSWORD_ENV: &str = "WIKIBOTS_BOT_PASSWORD";
/// Environment variable overriding `reading_list.mailbox.password`.
pub const MAILBOX_PASSWORD_ENV: &str = "WIKIBOTS_MAILBOX_PASSWORD";

/// The whole configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikibotsConfig {
    pub site: SiteConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading_list: Option<ReadingListConfig>,
    #[serde(default)]
    pub bot: BotSettings,
}

impl WikibotsConfig {
    /// Replace passwords with values from `lookup` where it has one.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(password) = lookup(BOT_PASSWORD_ENV) {
            self.site.password = Some(SecretString::new(password.into()));
        }
        if let Some(password) = lookup(MAILBOX_PASSWORD_ENV) {
            if let Some(reading_list) = &mut self.reading_list {
                reading_list.mailbox.password = Some(SecretString::new(password.into()));
            }
        }
    }
}

#[derive(Clone)]
pub struct SiteConfig {
    pub id: String,
    pub api_url: url::Url,
    pub username: String,
    pub password: Option<SecretString>,
    pub throttle_policy: ThrottlePolicy,
}

impl SiteConfig {
    pub fn profile(&self) -> SiteProfile {
        SiteProfile {
            id: self.id.clone(),
            api_url: self.api_url.clone(),
            username: self.username.clone(),
            throttle_policy: self.throttle_policy.clone(),
        }
    }
}

impl std::fmt::Debug for SiteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteConfig")
            .field("id", &self.id)
            .field("api_url", &self.api_url.as_str())
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("throttle_policy", &self.throttle_policy)
            .finish()
    }
}

impl Serialize for SiteConfig {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct SiteConfigHelper<'a> {
            id: &'a str,
            api_url: &'a url::Url,
            username: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            password: Option<&'a str>,
            throttle_policy: &'a ThrottlePolicy,
        }

        SiteConfigHelper {
            id: &self.id,
            api_url: &self.api_url,
            username: &self.username,
            password: self.password.as_ref().map(|p| p.expose_secret()),
            throttle_policy: &self.throttle_policy,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SiteConfig {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct SiteConfigHelper {
            id: String,
            api_url: url::Url,
            username: String,
            #[serde(default)]
            password: Option<String>,
            #[serde(default)]
            throttle_policy: ThrottlePolicy,
        }

        let helper = SiteConfigHelper::deserialize(deserializer)?;
        Ok(SiteConfig {
            id: helper.id,
            api_url: helper.api_url,
            username: helper.username,
            password: helper.password.map(|p| SecretString::new(p.into())),
            throttle_policy: helper.throttle_policy,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingListConfig {
    #[serde(default = "default_page")]
    pub page: String,
    pub mailbox: MailboxConfig,
}

fn default_page() -> String {
    DEFAULT_READING_LIST_PAGE.to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotSettings {
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_edits: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SAMPLE: &str = r#"
[site]
id = "hive"
api_url = "https://wiki.example.org/w/api.php"
username = "ReadingBot@bot"
password = "from-file"

[reading_list.mailbox]
host = "imap.example.org"
user = "reader"
password = "mail-from-file"

[bot]
max_edits = 50
"#;

    #[test]
    fn test_parse_with_defaults() {
        let config: WikibotsConfig = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.site.id, "hive");
        assert_eq!(config.site.throttle_policy.maxlag, 5);
        let reading_list = config.reading_list.unwrap();
        assert_eq!(reading_list.page, "Reading list");
        assert_eq!(reading_list.mailbox.port, 993);
        assert_eq!(reading_list.mailbox.mailbox, "INBOX");
        assert!(!config.bot.dry_run);
        assert_eq!(config.bot.max_edits, Some(50));
    }

    #[test]
    fn test_overrides_replace_passwords() {
        let mut config: WikibotsConfig = toml::from_str(SAMPLE).unwrap();
        let env: HashMap<&str, &str> = HashMap::from([
            (BOT_PASSWORD_ENV, "from-env"),
            (MAILBOX_PASSWORD_ENV, "mail-from-env"),
        ]);
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.site.password.unwrap().expose_secret(), "from-env");
        let mailbox = config.reading_list.unwrap().mailbox;
        assert_eq!(mailbox.password.unwrap().expose_secret(), "mail-from-env");
    }

    #[test]
    fn test_no_overrides_keeps_file_values() {
        let mut config: WikibotsConfig = toml::from_str(SAMPLE).unwrap();
        config.apply_overrides(|_| None);
        assert_eq!(config.site.password.unwrap().expose_secret(), "from-file");
    }

    #[test]
    fn test_debug_redacts_password() {
        let config: WikibotsConfig = toml::from_str(SAMPLE).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("from-file"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_profile_from_site() {
        let config: WikibotsConfig = toml::from_str(SAMPLE).unwrap();
        let profile = config.site.profile();
        assert_eq!(profile.username, "ReadingBot@bot");
        assert_eq!(profile.api_url.as_str(), "https://wiki.example.org/w/api.php");
    }
}

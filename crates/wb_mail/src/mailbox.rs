use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::MailError;
use crate::imap::ImapSession;
use crate::stream::{MailStream, connect_plain, connect_tls};

pub const DEFAULT_IMAP_PORT: u16 = 993;
pub const DEFAULT_MAILBOX: &str = "INBOX";

/// Where the shared links arrive.
#[derive(Clone)]
pub struct MailboxConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<SecretString>,
    pub mailbox: String,
    /// Plain TCP is only for local test servers.
    pub tls: bool,
}

impl MailboxConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_IMAP_PORT,
            user: None,
            password: None,
            mailbox: DEFAULT_MAILBOX.to_string(),
            tls: true,
        }
    }
}

impl std::fmt::Debug for MailboxConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailboxConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("mailbox", &self.mailbox)
            .field("tls", &self.tls)
            .finish()
    }
}

#[derive(Serialize, Deserialize)]
struct MailboxConfigHelper {
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    password: Option<String>,
    #[serde(default = "default_mailbox")]
    mailbox: String,
    #[serde(default = "default_tls")]
    tls: bool,
}

fn default_port() -> u16 {
    DEFAULT_IMAP_PORT
}

fn default_mailbox() -> String {
    DEFAULT_MAILBOX.to_string()
}

fn default_tls() -> bool {
    true
}

impl Serialize for MailboxConfig {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        MailboxConfigHelper {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self
                .password
                .as_ref()
                .map(|p| p.expose_secret().to_string()),
            mailbox: self.mailbox.clone(),
            tls: self.tls,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MailboxConfig {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let helper = MailboxConfigHelper::deserialize(deserializer)?;
        Ok(MailboxConfig {
            host: helper.host,
            port: helper.port,
            user: helper.user,
            password: helper.password.map(|p| SecretString::new(p.into())),
            mailbox: helper.mailbox,
            tls: helper.tls,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedMessage {
    pub uid: u32,
    pub raw: Vec<u8>,
}

/// A mailbox the reading-list bot drains. Deletions take effect on
/// [`Mailbox::expunge`].
#[async_trait]
pub trait Mailbox: Send {
    async fn fetch_messages(&mut self) -> Result<Vec<FetchedMessage>, MailError>;
    async fn mark_deleted(&mut self, uid: u32) -> Result<(), MailError>;
    async fn expunge(&mut self) -> Result<(), MailError>;
    async fn logout(&mut self) -> Result<(), MailError>;
}

pub struct ImapMailbox {
    session: ImapSession<MailStream>,
    mailbox: String,
}

impl ImapMailbox {
    pub async fn connect(config: &MailboxConfig) -> Result<Self, MailError> {
        let stream = if config.tls {
            connect_tls(&config.host, config.port).await?
        } else {
            connect_plain(&config.host, config.port).await?
        };
        let mut session = ImapSession::start(stream).await?;
        if let Some(user) = &config.user {
            let password = config
                .password
                .as_ref()
                .map(|p| p.expose_secret())
                .unwrap_or_default();
            session.login(user, password).await?;
        }
        info!(
            host = %config.host,
            port = config.port,
            mailbox = %config.mailbox,
            "Connected to mailbox"
        );
        Ok(Self {
            session,
            mailbox: config.mailbox.clone(),
        })
    }
}

#[async_trait]
impl Mailbox for ImapMailbox {
    async fn fetch_messages(&mut self) -> Result<Vec<FetchedMessage>, MailError> {
        let exists = self.session.select(&self.mailbox).await?;
        if exists == 0 {
            return Ok(Vec::new());
        }
        let messages = self.session.fetch_all().await?;
        debug!(count = messages.len(), "Fetched messages");
        Ok(messages)
    }

    async fn mark_deleted(&mut self, uid: u32) -> Result<(), MailError> {
        self.session.uid_store_deleted(uid).await
    }

    async fn expunge(&mut self) -> Result<(), MailError> {
        self.session.expunge().await
    }

    async fn logout(&mut self) -> Result<(), MailError> {
        self.session.logout().await
    }
}

/// A mailbox held in memory, for tests and dry runs over saved messages.
#[derive(Debug, Default)]
pub struct InMemoryMailbox {
    messages: Vec<FetchedMessage>,
    flagged: Vec<u32>,
    expunged: Vec<u32>,
    logged_out: bool,
}

impl InMemoryMailbox {
    pub fn new(messages: Vec<FetchedMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    /// Messages still in the mailbox.
    pub fn messages(&self) -> &[FetchedMessage] {
        &self.messages
    }

    pub fn flagged(&self) -> &[u32] {
        &self.flagged
    }

    pub fn expunged(&self) -> &[u32] {
        &self.expunged
    }

    pub fn is_logged_out(&self) -> bool {
        self.logged_out
    }
}

#[async_trait]
impl Mailbox for InMemoryMailbox {
    async fn fetch_messages(&mut self) -> Result<Vec<FetchedMessage>, MailError> {
        Ok(self.messages.clone())
    }

    async fn mark_deleted(&mut self, uid: u32) -> Result<(), MailError> {
        if !self.messages.iter().any(|m| m.uid == uid) {
            return Err(MailError::Command {
                text: format!("NO no message with UID {uid}"),
            });
        }
        if !self.flagged.contains(&uid) {
            self.flagged.push(uid);
        }
        Ok(())
    }

    async fn expunge(&mut self) -> Result<(), MailError> {
        let flagged = std::mem::take(&mut self.flagged);
        self.messages.retain(|m| !flagged.contains(&m.uid));
        self.expunged.extend(flagged);
        Ok(())
    }

    async fn logout(&mut self) -> Result<(), MailError> {
        self.logged_out = true;
        Ok(())
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    #[error("Invalid server name: {0}")]
    InvalidDnsName(#[from] rustls::pki_types::InvalidDnsNameError),

    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The server answered a command with `NO` or `BAD`.
    #[error("Command failed: {text}")]
    Command { text: String },
}

impl MailError {
    /// The server dropped the session under us, typically because another
    /// client expunged the mailbox. Retrying later is the only remedy.
    pub fn is_session_lost(&self) -> bool {
        match self {
            Self::Command { text } => {
                let text = text.to_lowercase();
                text.contains("deleted under") || text.contains("please relogin")
            }
            _ => false,
        }
    }
}

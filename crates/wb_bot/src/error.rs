use thiserror::Error;
use wb_engine::link_insert::LinkError;
use wb_engine::skip::SkipError;
use wb_mail::MailError;
use wb_mw_api::MwApiError;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("API error: {0}")]
    Api(#[from] MwApiError),

    #[error("Mailbox error: {0}")]
    Mail(#[from] MailError),

    #[error("Invalid link term: {0}")]
    Link(#[from] LinkError),

    #[error("Invalid skip rule: {0}")]
    Skip(#[from] SkipError),
}

impl BotError {
    /// See [`MailError::is_session_lost`].
    pub fn is_session_lost(&self) -> bool {
        matches!(self, Self::Mail(e) if e.is_session_lost())
    }
}

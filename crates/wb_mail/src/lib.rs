pub mod error;
pub mod framed;
pub mod imap;
pub mod mailbox;
pub mod parse;
pub mod stream;

pub use error::MailError;
pub use mailbox::{FetchedMessage, ImapMailbox, InMemoryMailbox, Mailbox, MailboxConfig};
pub use parse::parse_message;

pub mod message;
pub mod profile;
pub mod types;

pub use message::Message;
pub use types::{Namespace, PageContent, PageId, RevisionId, SkipDecision, Title};

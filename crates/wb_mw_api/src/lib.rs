pub mod auth;
pub mod client;
pub mod error;
pub mod response;
pub mod retry;
pub mod search;
pub mod throttle;

pub use client::{EditRequest, EditResponse, MediaWikiClient, ReqwestMwClient};
pub use error::MwApiError;

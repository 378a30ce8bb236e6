pub mod config;
pub mod error;
pub mod link_bot;
pub mod reading_list_bot;
pub mod report;
pub mod review;

pub use config::BotConfig;
pub use error::BotError;
pub use link_bot::LinkBot;
pub use reading_list_bot::ReadingListBot;
pub use report::{BotReport, MessageResult, PageAction, PageResult};
pub use review::{AlwaysSave, EditReview, ReviewDecision};

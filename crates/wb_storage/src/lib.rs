pub mod config;
pub mod config_store;
pub mod error;

pub use config::{BotSettings, ReadingListConfig, SiteConfig, WikibotsConfig};
pub use config_store::TomlConfigStore;
pub use error::StorageError;

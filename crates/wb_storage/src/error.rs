use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Invalid config file: {0}")]
    Invalid(#[from] toml::de::Error),
    #[error("Could not encode config: {0}")]
    Encode(#[from] toml::ser::Error),
}

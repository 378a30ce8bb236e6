use crate::config::WikibotsConfig;
use crate::error::StorageError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `$XDG_CONFIG_HOME/wikibots/config.toml` or the platform equivalent.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("wikibots").join("config.toml"))
}

pub struct TomlConfigStore {
    path: PathBuf,
}

impl TomlConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file as written, without environment overrides.
    pub fn load_file(&self) -> Result<WikibotsConfig, StorageError> {
        if !self.path.exists() {
            return Err(StorageError::NotFound(self.path.clone()));
        }
        let data = std::fs::read_to_string(&self.path)?;
        let config: WikibotsConfig = toml::from_str(&data)?;
        debug!(path = %self.path.display(), site = %config.site.id, "Loaded configuration");
        Ok(config)
    }

    /// Read the file and apply the password environment variables.
    pub fn load(&self) -> Result<WikibotsConfig, StorageError> {
        let mut config = self.load_file()?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn save(&self, config: &WikibotsConfig) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = toml::to_string_pretty(config)?;

        let tmp_path = self.path.with_extension("toml.tmp");
        std::fs::write(&tmp_path, data)?;

        // Set restrictive permissions on Unix (0600 = owner read/write only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
        }

        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_path_ends_with_app_dir() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("wikibots/config.toml"));
        }
    }

    #[test]
    fn test_load_from_nonexistent_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = TomlConfigStore::new(temp_dir.path().join("nonexistent.toml"));

        match store.load_file() {
            Err(StorageError::NotFound(path)) => assert!(path.ends_with("nonexistent.toml")),
            other => panic!("Expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_file_is_deserialize_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[site]\nid = ").unwrap();

        let store = TomlConfigStore::new(&path);
        assert!(matches!(store.load_file(), Err(StorageError::Invalid(_))));
    }
}

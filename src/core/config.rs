use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use url::Url;

use crate::core::i18n::Locale;
use crate::core::state::SortKey;

pub const DEFAULT_ENDPOINT: &str = "https://rickandmortyapi.com/graphql";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default)]
    pub locale: Locale,

    #[serde(default)]
    pub sort_by: SortKey,

    /// Memoise envelopes per (page, filter) for the lifetime of the process.
    #[serde(default = "default_cache")]
    pub cache: bool,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}
fn default_cache() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            locale: Locale::default(),
            sort_by: SortKey::default(),
            cache: default_cache(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("{} not found. Please create one.", path.display());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = serde_yaml_ng::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.endpoint_url()?;
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise falls back to defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = serde_yaml_ng::to_string(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn endpoint_url(&self) -> Result<Url> {
        Url::parse(&self.endpoint).with_context(|| format!("Invalid endpoint URL: {}", self.endpoint))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("catalog.yml");
        fs::write(&path, "locale: de\n")?;

        let config = Config::load(&path)?;
        assert_eq!(config.locale, Locale::De);
        assert_eq!(config.sort_by, SortKey::Name);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert!(config.cache);
        Ok(())
    }

    #[test]
    fn test_save_then_load() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("catalog.yml");
        let config = Config {
            endpoint: "http://127.0.0.1:9000/graphql".to_string(),
            locale: Locale::De,
            sort_by: SortKey::Origin,
            cache: false,
        };

        config.save(&path)?;
        assert_eq!(Config::load(&path)?, config);
        Ok(())
    }

    #[test]
    fn test_invalid_endpoint_is_rejected() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("catalog.yml");
        fs::write(&path, "endpoint: not a url\n")?;

        assert!(Config::load(&path).is_err());
        Ok(())
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = Config::load_or_default(dir.path().join("absent.yml"))?;
        assert_eq!(config, Config::default());
        Ok(())
    }
}

use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::domain::{FeaturedStrategy, SortKey};

/// Configuration for a recipe collection.
///
/// Read from `config.toml` in the collection root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// File name of the durable store, relative to the collection root.
    store_file: String,

    /// How the featured recipe is chosen.
    pub featured: FeaturedStrategy,

    /// Default order for listings.
    pub sort: SortKey,

    /// Base URL of an optional network mirror.
    ///
    /// When set, every successful write is also sent to the mirror on a
    /// best-effort basis.
    pub remote: Option<String>,

    /// Request timeout for the network mirror, in seconds.
    remote_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_file: default_store_file(),
            featured: FeaturedStrategy::default(),
            sort: SortKey::default(),
            remote: None,
            remote_timeout_secs: default_remote_timeout_secs(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// File name of the durable store.
    #[must_use]
    pub fn store_file(&self) -> &str {
        &self.store_file
    }

    /// Request timeout for the network mirror.
    #[must_use]
    pub const fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs)
    }
}

fn default_store_file() -> String {
    "recipes.json".to_string()
}

const fn default_remote_timeout_secs() -> u64 {
    5
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_store_file")]
        store_file: String,

        #[serde(default)]
        featured: FeaturedStrategy,

        #[serde(default)]
        sort: SortKey,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        remote: Option<String>,

        #[serde(default = "default_remote_timeout_secs")]
        remote_timeout_secs: u64,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                store_file,
                featured,
                sort,
                remote,
                remote_timeout_secs,
            } => Self {
                store_file,
                featured,
                sort,
                remote,
                remote_timeout_secs,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            store_file: config.store_file,
            featured: config.featured,
            sort: config.sort,
            remote: config.remote,
            remote_timeout_secs: config.remote_timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\nstore_file = \"book.json\"\nfeatured = \"random\"\nsort = \"title\"\nremote = \"http://localhost:3000\"\nremote_timeout_secs = 2\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.store_file(), "book.json");
        assert_eq!(config.featured, FeaturedStrategy::Random);
        assert_eq!(config.sort, SortKey::Title);
        assert_eq!(config.remote.as_deref(), Some("http://localhost:3000"));
        assert_eq!(config.remote_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nsort = \"rating\"\n").unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn empty_file_returns_default() {
        // Tests that deserialising an empty file returns the default configuration.
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        let config = Config {
            featured: FeaturedStrategy::Random,
            remote: Some("http://example.test".to_string()),
            ..Config::default()
        };

        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }
}

//! Configuration loading and validation.
//!
//! Settings are layered, later sources overriding earlier ones:
//! 1. Built-in defaults.
//! 2. An optional configuration file (TOML, YAML or JSON, picked by
//!    extension; anything else is read as TOML).
//! 3. Environment variables prefixed with `LINKMAP_`, with `__` separating
//!    nested keys (e.g. `LINKMAP_SCAN__HEAD_BYTES=128`).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "LINKMAP_";
const DATABASE_FILENAME: &str = "links.sqlite";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file; created on first connect.
    pub path: PathBuf,
    pub max_connections: u32,
}
impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: linkmap_store::MAX_CONNECTIONS,
        }
    }
}

/// Which files carry link markers, and where to look for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Extensions of files included in directory listings.
    pub extensions: Vec<String>,
    /// Number of leading bytes searched for a link marker.
    pub head_bytes: usize,
}
impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: linkmap_fs::DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            head_bytes: linkmap_fs::DEFAULT_HEAD_BYTES,
        }
    }
}

fn default_database_path() -> PathBuf {
    ProjectDirs::from("", "", "linkmap")
        .map(|dirs| dirs.data_dir().join(DATABASE_FILENAME))
        .unwrap_or_else(|| PathBuf::from(DATABASE_FILENAME))
}

impl Config {
    /// Build the layered [`Figment`] without extracting it.
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = file {
            figment = match file.extension().and_then(|ext| ext.to_str()) {
                Some("yaml" | "yml") => figment.merge(Yaml::file(file)),
                Some("json") => figment.merge(Json::file(file)),
                _ => figment.merge(Toml::file(file)),
            };
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load and validate the configuration.
    ///
    /// An explicitly given file must exist.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        if let Some(file) = file
            && !file.is_file()
        {
            exn::bail!(ErrorKind::Missing(file.to_path_buf()));
        }
        let config: Config = Self::figment(file).extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        tracing::debug!(database = %config.database.path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.max_connections == 0 {
            exn::bail!(ErrorKind::Invalid("database.max_connections must be at least 1"));
        }
        if self.scan.head_bytes == 0 {
            exn::bail!(ErrorKind::Invalid("scan.head_bytes must be at least 1"));
        }
        if self.scan.extensions.iter().all(|ext| ext.trim_start_matches('.').is_empty()) {
            exn::bail!(ErrorKind::Invalid("scan.extensions must name at least one extension"));
        }
        Ok(())
    }
}

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use crate::Error;
use crate::query::ResolverOptions;
use crate::storage::StoreOptions;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Catalog database file
    pub database: Option<String>,
    /// Per-query timeout; unset means no deadline
    pub query_timeout_ms: Option<u64>,
    /// Pooled read connections
    pub read_connections: Option<usize>,
    /// Cap on channels returned by `package`; unset returns all of them
    pub package_channel_limit: Option<usize>,
}

impl CatalogConfig {
    pub fn store_options(&self) -> StoreOptions {
        let mut options = StoreOptions::default();
        if let Some(n) = self.read_connections {
            options.read_connections = n;
        }
        options
    }

    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            package_channel_limit: self.package_channel_limit,
        }
    }

    /// Reject settings no catalog run can use
    pub fn validate(&self) -> crate::Result<()> {
        if self.read_connections == Some(0) {
            return Err(Error::Config("read_connections must be at least 1".into()));
        }
        if self.package_channel_limit == Some(0) {
            return Err(Error::Config("package_channel_limit must be at least 1".into()));
        }
        Ok(())
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout_ms.map(Duration::from_millis)
    }

    /// Database path from the config, or the default next to the working directory
    pub fn database_path(&self) -> PathBuf {
        self.database
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("catalog-graph.toml")
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from("catalog.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<CatalogConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: CatalogConfig = toml::from_str(&contents)?;
    config.validate()?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &CatalogConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

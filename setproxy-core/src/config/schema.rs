//! Configuration schema types

use crate::error::{Result, SetProxyError};
use crate::option::ConnectionScope;
use crate::store::{FileStore, ProxyStore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Complete setproxy configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
}

/// Where proxy settings are read from and written to
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Location of the file backend's store
    pub path: Option<PathBuf>,
    /// Connection to edit; unset means the default connection
    pub connection: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// The operating system's proxy settings (Windows only)
    System,
    /// A TOML file holding the settings
    File,
}

impl Default for StoreBackend {
    fn default() -> Self {
        if cfg!(windows) {
            StoreBackend::System
        } else {
            StoreBackend::File
        }
    }
}

impl FromStr for StoreBackend {
    type Err = SetProxyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "system" => Ok(StoreBackend::System),
            "file" => Ok(StoreBackend::File),
            _ => Err(SetProxyError::ConfigError(format!(
                "Invalid store backend: {s}. Use 'system' or 'file'"
            ))),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::System => f.write_str("system"),
            StoreBackend::File => f.write_str("file"),
        }
    }
}

impl StoreConfig {
    pub fn scope(&self) -> ConnectionScope {
        ConnectionScope::from_name(self.connection.clone())
    }

    /// Path of the file backend, falling back to `store.toml` beside the
    /// default config file
    pub fn file_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            super::ConfigLoader::default_store_path(&super::ConfigLoader::default_config_path())
        })
    }

    /// Open the configured backend
    pub fn open(&self) -> Result<Box<dyn ProxyStore>> {
        match self.backend {
            StoreBackend::File => {
                let path = self.file_path();
                tracing::debug!("Using file store at {:?}", path);
                Ok(Box::new(FileStore::new(path)))
            }
            #[cfg(windows)]
            StoreBackend::System => Ok(Box::new(crate::store::SystemStore::new())),
            #[cfg(not(windows))]
            StoreBackend::System => Err(SetProxyError::ConfigError(
                "The system store is only available on Windows; use the file store".to_string(),
            )),
        }
    }
}

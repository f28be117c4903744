//! TOML-backed store for hosts without a system proxy store

use super::{ConnectionSettings, ProxyStore, StoreResult};
use crate::error::StoreError;
use crate::option::{ConfigOption, ConnectionScope, OptionId};
use chrono::{SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// On-disk layout of the store file
///
/// The unnamed connection lives in its own `[default]` table, so no
/// connection name can alias it.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StoreDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(rename = "default", default, skip_serializing_if = "Option::is_none")]
    pub default_connection: Option<ConnectionSettings>,
    #[serde(default)]
    pub connections: IndexMap<String, ConnectionSettings>,
}

impl StoreDocument {
    pub fn settings(&self, scope: &ConnectionScope) -> ConnectionSettings {
        let settings = match scope {
            ConnectionScope::Default => self.default_connection.as_ref(),
            ConnectionScope::Named(name) => self.connections.get(name),
        };
        settings.cloned().unwrap_or_default()
    }

    fn settings_mut(&mut self, scope: &ConnectionScope) -> &mut ConnectionSettings {
        match scope {
            ConnectionScope::Default => {
                self.default_connection.get_or_insert_with(Default::default)
            }
            ConnectionScope::Named(name) => self.connections.entry(name.clone()).or_default(),
        }
    }
}

pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the store file; a missing file is an empty store
    pub fn load(&self) -> StoreResult<StoreDocument> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("Store file {:?} not found, treating as empty", self.path);
                return Ok(StoreDocument::default());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        toml::from_str(&contents).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Replace the store file with `doc`
    ///
    /// The document is written to a temporary file next to the store and
    /// renamed over it.
    pub fn save(&self, doc: &StoreDocument) -> StoreResult<()> {
        let contents = toml::to_string_pretty(doc)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        tmp.write_all(contents.as_bytes())
            .map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path)
            .map_err(|e| self.io_error(e.error))?;

        tracing::debug!("Wrote store file {:?}", self.path);
        Ok(())
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ProxyStore for FileStore {
    fn read(&self, scope: &ConnectionScope, ids: &[OptionId]) -> StoreResult<Vec<ConfigOption>> {
        let settings = self.load()?.settings(scope);
        Ok(ids.iter().map(|id| settings.get(*id)).collect())
    }

    fn write(&mut self, scope: &ConnectionScope, options: &[ConfigOption]) -> StoreResult<()> {
        let mut doc = self.load()?;
        doc.settings_mut(scope).apply(options);
        doc.updated_at = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        self.save(&doc)
    }

    fn refresh(&mut self) -> StoreResult<()> {
        // Readers load the file on every access
        Ok(())
    }
}

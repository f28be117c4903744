//! In-process store, used by tests and dry runs

use super::{ConnectionSettings, ProxyStore, StoreResult};
use crate::error::StoreError;
use crate::option::{ConfigOption, ConnectionScope, OptionId};
use std::cell::Cell;
use std::collections::HashMap;

/// Store that keeps settings in memory and counts calls
///
/// Operations can be primed to fail via the `fail_*` fields. A primed write or
/// refresh fails once; a primed read keeps failing.
#[derive(Debug, Default)]
pub struct MemoryStore {
    connections: HashMap<ConnectionScope, ConnectionSettings>,
    reads: Cell<usize>,
    pub writes: usize,
    pub refreshes: usize,
    pub fail_read: Option<String>,
    pub fail_write: Option<String>,
    pub fail_refresh: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with the given options already set on the default connection
    pub fn with_options(options: &[ConfigOption]) -> Self {
        let mut store = Self::new();
        store
            .connections
            .entry(ConnectionScope::Default)
            .or_default()
            .apply(options);
        store
    }

    pub fn settings(&self, scope: &ConnectionScope) -> ConnectionSettings {
        self.connections.get(scope).cloned().unwrap_or_default()
    }

    /// Number of read calls, failed ones included
    pub fn reads(&self) -> usize {
        self.reads.get()
    }
}

impl ProxyStore for MemoryStore {
    fn read(&self, scope: &ConnectionScope, ids: &[OptionId]) -> StoreResult<Vec<ConfigOption>> {
        self.reads.set(self.reads.get() + 1);
        if let Some(reason) = &self.fail_read {
            return Err(StoreError::Unavailable(reason.clone()));
        }

        let settings = self.settings(scope);
        Ok(ids.iter().map(|id| settings.get(*id)).collect())
    }

    fn write(&mut self, scope: &ConnectionScope, options: &[ConfigOption]) -> StoreResult<()> {
        if let Some(reason) = self.fail_write.take() {
            return Err(StoreError::Unavailable(reason));
        }

        self.writes += 1;
        self.connections
            .entry(scope.clone())
            .or_default()
            .apply(options);
        Ok(())
    }

    fn refresh(&mut self) -> StoreResult<()> {
        if let Some(reason) = self.fail_refresh.take() {
            return Err(StoreError::Unavailable(reason));
        }

        self.refreshes += 1;
        Ok(())
    }
}

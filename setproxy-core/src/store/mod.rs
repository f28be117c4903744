//! Proxy configuration stores
//!
//! A store holds, per connection, a flags word and a few string options.
//! Reads and writes move whole option lists; options not named in a write are
//! left as they are.

pub mod file;
pub mod memory;
#[cfg(windows)]
pub mod system;

use crate::error::StoreError;
use crate::option::{ConfigOption, ConnectionScope, OptionId, OptionValue, ProxyFlags};
use serde::{Deserialize, Serialize};

pub use file::FileStore;
pub use memory::MemoryStore;
#[cfg(windows)]
pub use system::SystemStore;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

pub trait ProxyStore {
    /// Read the requested options, in request order
    ///
    /// Unset string options come back as [`OptionValue::Absent`].
    fn read(&self, scope: &ConnectionScope, ids: &[OptionId]) -> StoreResult<Vec<ConfigOption>>;

    /// Replace the given options for `scope`
    fn write(&mut self, scope: &ConnectionScope, options: &[ConfigOption]) -> StoreResult<()>;

    /// Tell consumers of the configuration to pick up changes
    fn refresh(&mut self) -> StoreResult<()>;
}

/// Stored options of one connection
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConnectionSettings {
    #[serde(default = "default_flags")]
    pub flags: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_bypass: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoconfig_url: Option<String>,
}

fn default_flags() -> u32 {
    ProxyFlags::DIRECT.bits()
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            flags: default_flags(),
            proxy_server: None,
            proxy_bypass: None,
            autoconfig_url: None,
        }
    }
}

impl ConnectionSettings {
    pub fn get(&self, id: OptionId) -> ConfigOption {
        let text = |v: &Option<String>| match v {
            Some(s) => ConfigOption::text(id, s.clone()),
            None => ConfigOption::absent(id),
        };

        match id {
            OptionId::Flags => ConfigOption::flags(ProxyFlags::from_bits_retain(self.flags)),
            OptionId::ProxyServer => text(&self.proxy_server),
            OptionId::ProxyBypass => text(&self.proxy_bypass),
            OptionId::AutoConfigUrl => text(&self.autoconfig_url),
        }
    }

    pub fn set(&mut self, option: &ConfigOption) {
        let slot = match option.id {
            OptionId::Flags => {
                match &option.value {
                    OptionValue::Flags(flags) => self.flags = flags.bits(),
                    other => tracing::debug!("ignoring non-flag value {:?} for flags", other),
                }
                return;
            }
            OptionId::ProxyServer => &mut self.proxy_server,
            OptionId::ProxyBypass => &mut self.proxy_bypass,
            OptionId::AutoConfigUrl => &mut self.autoconfig_url,
        };

        match &option.value {
            OptionValue::Text(s) => *slot = Some(s.clone()),
            OptionValue::Absent => *slot = None,
            OptionValue::Flags(flags) => {
                tracing::debug!("ignoring flag value {:#x} for {}", flags.bits(), option.id)
            }
        }
    }

    pub fn apply(&mut self, options: &[ConfigOption]) {
        for option in options {
            self.set(option);
        }
    }
}

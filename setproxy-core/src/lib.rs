//! Core library for the setproxy tools
//!
//! Resolves proxy requests into typed actions, edits the proxy bypass list,
//! and writes the resulting per-connection options to a proxy configuration
//! store.

pub mod action;
pub mod builder;
pub mod bypass;
pub mod config;
pub mod error;
pub mod option;
pub mod profile;
pub mod store;

pub use action::{Action, ActionKind, ProxyKind};
pub use builder::{OptionBuilder, Outcome, Plan};
pub use bypass::{BypassEdit, BypassList, EditMode};
pub use config::{Config, ConfigLoader, StoreBackend, StoreConfig};
pub use error::{ArgumentError, Result, SetProxyError, StoreError};
pub use option::{ConfigOption, ConnectionScope, OptionId, OptionValue, ProxyFlags};
pub use store::{FileStore, MemoryStore, ProxyStore};

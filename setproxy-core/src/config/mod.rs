//! Configuration for the setproxy tools
//!
//! - Config: which store backs the proxy settings and which connection to edit
//! - ConfigLoader: locating and reading the TOML config file

pub mod loader;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{Config, StoreBackend, StoreConfig};

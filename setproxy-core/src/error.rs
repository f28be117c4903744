//! Error types for proxy configuration operations

use crate::option::OptionId;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SetProxyError>;

#[derive(Debug, Error)]
pub enum SetProxyError {
    #[error("Invalid arguments")]
    InvalidArguments(#[from] ArgumentError),

    #[error("Cannot get current proxy bypass")]
    StoreRead(#[source] StoreError),

    #[error("Can't set proxy options")]
    StoreWrite(#[source] StoreError),

    #[error("Failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Failed to update profile {path}")]
    Profile {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Problems with the requested action and its values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("Unrecognized mode {mode}")]
    UnknownMode { mode: String },

    #[error("--{mode} expects {expected} value(s), got {got}")]
    WrongCount {
        mode: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("--{mode} requires a non-empty {field}")]
    EmptyValue {
        mode: &'static str,
        field: &'static str,
    },

    #[error("--{mode} takes a single pattern, got {pattern:?} containing '{separator}'")]
    ListPattern {
        mode: &'static str,
        pattern: String,
        separator: char,
    },
}

/// Failures reported by a proxy configuration store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot access store file {path}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed store file {path}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to serialize store")]
    Serialize(#[from] toml::ser::Error),

    #[error("store returned no value for {0}")]
    MissingOption(OptionId),

    #[error("system call failed (err={code})")]
    Os { code: u32 },

    #[error("{0}")]
    Unavailable(String),
}

//! Resolution of a requested mode and its values into an [`Action`]

use crate::bypass::SEPARATOR;
use crate::error::ArgumentError;
use std::fmt;
use std::str::FromStr;

/// Manual proxy protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyKind {
    Http,
    Socks,
}

impl ProxyKind {
    /// Prefix of the proxy server string the store expects
    pub fn server_prefix(self) -> &'static str {
        match self {
            ProxyKind::Http => "http://",
            ProxyKind::Socks => "socks=",
        }
    }
}

/// Discriminator of a requested action, as named on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    None,
    Auto,
    Pac,
    Http,
    Socks,
    AddException,
    DelException,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::None => "none",
            ActionKind::Auto => "auto",
            ActionKind::Pac => "pac",
            ActionKind::Http => "http",
            ActionKind::Socks => "socks",
            ActionKind::AddException => "add-exception",
            ActionKind::DelException => "del-exception",
        }
    }

    /// Names of the values this mode takes, in order
    pub fn value_names(self) -> &'static [&'static str] {
        match self {
            ActionKind::None | ActionKind::Auto => &[],
            ActionKind::Pac => &["pac-url"],
            ActionKind::Http | ActionKind::Socks => &["host", "port", "bypass"],
            ActionKind::AddException | ActionKind::DelException => &["pattern"],
        }
    }
}

impl FromStr for ActionKind {
    type Err = ArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix("--").unwrap_or(s) {
            "none" => Ok(ActionKind::None),
            "auto" => Ok(ActionKind::Auto),
            "pac" => Ok(ActionKind::Pac),
            "http" => Ok(ActionKind::Http),
            "socks" => Ok(ActionKind::Socks),
            "add-exception" => Ok(ActionKind::AddException),
            "del-exception" => Ok(ActionKind::DelException),
            _ => Err(ArgumentError::UnknownMode {
                mode: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated request against the proxy configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ClearProxy,
    AutoDetect,
    PacConfig {
        pac_url: String,
    },
    ManualProxy {
        kind: ProxyKind,
        host: String,
        port: String,
        bypass: String,
    },
    AddException {
        pattern: String,
    },
    RemoveException {
        pattern: String,
    },
}

impl Action {
    /// Resolve a mode token (with or without leading `--`) and its values
    pub fn parse<S: AsRef<str>>(mode: &str, values: &[S]) -> Result<Self, ArgumentError> {
        Self::resolve(mode.parse()?, values)
    }

    /// Build an action from its kind and exactly the values that kind takes
    ///
    /// Host, port, URL and pattern must be non-empty; a manual proxy's bypass
    /// may be empty, meaning no exceptions for that setting.
    pub fn resolve<S: AsRef<str>>(kind: ActionKind, values: &[S]) -> Result<Self, ArgumentError> {
        let expected = kind.value_names().len();
        if values.len() != expected {
            return Err(ArgumentError::WrongCount {
                mode: kind.as_str(),
                expected,
                got: values.len(),
            });
        }

        let value = |idx: usize| values[idx].as_ref();
        let required = |idx: usize| -> Result<String, ArgumentError> {
            let v = value(idx);
            if v.is_empty() {
                Err(ArgumentError::EmptyValue {
                    mode: kind.as_str(),
                    field: kind.value_names()[idx],
                })
            } else {
                Ok(v.to_string())
            }
        };
        let pattern = || -> Result<String, ArgumentError> {
            let p = value(0).trim();
            if p.is_empty() {
                Err(ArgumentError::EmptyValue {
                    mode: kind.as_str(),
                    field: "pattern",
                })
            } else if p.contains(SEPARATOR) {
                Err(ArgumentError::ListPattern {
                    mode: kind.as_str(),
                    pattern: p.to_string(),
                    separator: SEPARATOR,
                })
            } else {
                Ok(p.to_string())
            }
        };

        let action = match kind {
            ActionKind::None => Action::ClearProxy,
            ActionKind::Auto => Action::AutoDetect,
            ActionKind::Pac => Action::PacConfig {
                pac_url: required(0)?,
            },
            ActionKind::Http | ActionKind::Socks => Action::ManualProxy {
                kind: if kind == ActionKind::Http {
                    ProxyKind::Http
                } else {
                    ProxyKind::Socks
                },
                host: required(0)?,
                port: required(1)?,
                bypass: value(2).to_string(),
            },
            ActionKind::AddException => Action::AddException {
                pattern: pattern()?,
            },
            ActionKind::DelException => Action::RemoveException {
                pattern: pattern()?,
            },
        };

        Ok(action)
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::ClearProxy => ActionKind::None,
            Action::AutoDetect => ActionKind::Auto,
            Action::PacConfig { .. } => ActionKind::Pac,
            Action::ManualProxy {
                kind: ProxyKind::Http,
                ..
            } => ActionKind::Http,
            Action::ManualProxy {
                kind: ProxyKind::Socks,
                ..
            } => ActionKind::Socks,
            Action::AddException { .. } => ActionKind::AddException,
            Action::RemoveException { .. } => ActionKind::DelException,
        }
    }

    /// Whether the action edits the current bypass list in place
    pub fn is_read_modify_write(&self) -> bool {
        matches!(
            self,
            Action::AddException { .. } | Action::RemoveException { .. }
        )
    }
}

//! Typed per-connection proxy options exchanged with a store

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Connection flags word; decides how the other options are interpreted
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ProxyFlags: u32 {
        const DIRECT = 0x0000_0001;
        const PROXY = 0x0000_0002;
        const AUTO_PROXY_URL = 0x0000_0004;
        const AUTO_DETECT = 0x0000_0008;
    }
}

/// Identifier of a single per-connection option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionId {
    Flags,
    ProxyServer,
    ProxyBypass,
    AutoConfigUrl,
}

impl OptionId {
    /// Numeric option code used by the system store
    pub fn code(self) -> u32 {
        match self {
            OptionId::Flags => 1,
            OptionId::ProxyServer => 2,
            OptionId::ProxyBypass => 3,
            OptionId::AutoConfigUrl => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OptionId::Flags => "flags",
            OptionId::ProxyServer => "proxyServer",
            OptionId::ProxyBypass => "proxyBypass",
            OptionId::AutoConfigUrl => "autoconfigURL",
        }
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value held by an option
///
/// `Absent` only ever comes back from a read: the store distinguishes an unset
/// string from an empty one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Flags(ProxyFlags),
    Text(String),
    Absent,
}

impl OptionValue {
    /// String content, `None` for absent values and flag words
    pub fn as_text(&self) -> Option<&str> {
        match self {
            OptionValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigOption {
    pub id: OptionId,
    pub value: OptionValue,
}

impl ConfigOption {
    pub fn flags(flags: ProxyFlags) -> Self {
        Self {
            id: OptionId::Flags,
            value: OptionValue::Flags(flags),
        }
    }

    pub fn text(id: OptionId, value: impl Into<String>) -> Self {
        Self {
            id,
            value: OptionValue::Text(value.into()),
        }
    }

    pub fn absent(id: OptionId) -> Self {
        Self {
            id,
            value: OptionValue::Absent,
        }
    }
}

impl fmt::Display for ConfigOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            OptionValue::Flags(flags) => write!(f, "{}={:#x}", self.id, flags.bits()),
            OptionValue::Text(s) => write!(f, "{}={:?}", self.id, s),
            OptionValue::Absent => write!(f, "{}=<absent>", self.id),
        }
    }
}

/// Which network connection a store request applies to
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum ConnectionScope {
    /// The unnamed LAN connection
    #[default]
    Default,
    Named(String),
}

impl ConnectionScope {
    pub fn from_name(name: Option<String>) -> Self {
        match name {
            Some(name) if !name.is_empty() => ConnectionScope::Named(name),
            _ => ConnectionScope::Default,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            ConnectionScope::Default => None,
            ConnectionScope::Named(name) => Some(name),
        }
    }
}

impl fmt::Display for ConnectionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionScope::Default => f.write_str("default connection"),
            ConnectionScope::Named(name) => write!(f, "connection {name:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_codes_match_system_ids() {
        assert_eq!(OptionId::Flags.code(), 1);
        assert_eq!(OptionId::ProxyServer.code(), 2);
        assert_eq!(OptionId::ProxyBypass.code(), 3);
        assert_eq!(OptionId::AutoConfigUrl.code(), 4);
    }

    #[test]
    fn test_scope_from_name() {
        assert_eq!(ConnectionScope::from_name(None), ConnectionScope::Default);
        assert_eq!(
            ConnectionScope::from_name(Some(String::new())),
            ConnectionScope::Default
        );
        assert_eq!(
            ConnectionScope::from_name(Some("VPN".to_string())).name(),
            Some("VPN")
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(ConfigOption::flags(ProxyFlags::PROXY).to_string(), "flags=0x2");
        assert_eq!(
            ConfigOption::text(OptionId::ProxyBypass, "a.com").to_string(),
            "proxyBypass=\"a.com\""
        );
        assert_eq!(
            ConfigOption::absent(OptionId::ProxyBypass).to_string(),
            "proxyBypass=<absent>"
        );
    }
}

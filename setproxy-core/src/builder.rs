//! Translation of actions into store writes

use crate::action::{Action, ProxyKind};
use crate::bypass::{self, BypassEdit, EditMode};
use crate::error::{Result, SetProxyError, StoreError};
use crate::option::{ConfigOption, ConnectionScope, OptionId, ProxyFlags};
use crate::store::ProxyStore;

/// Options an action writes, or why it writes nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    Write(Vec<ConfigOption>),
    AlreadyPresent,
    NothingToDelete,
}

/// What applying an action did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied {
        options: Vec<ConfigOption>,
        refreshed: bool,
    },
    AlreadyPresent,
    NothingToDelete,
}

impl Outcome {
    pub fn wrote(&self) -> bool {
        matches!(self, Outcome::Applied { .. })
    }
}

/// Format the proxy server option for a manual proxy
pub fn proxy_server(kind: ProxyKind, host: &str, port: &str) -> String {
    format!("{}{}:{}", kind.server_prefix(), host, port)
}

/// Options for actions that do not depend on the current store contents
///
/// Returns `None` for the exception edits, which need a read first.
pub fn static_options(action: &Action) -> Option<Vec<ConfigOption>> {
    let options = match action {
        // Other options stay stored; the flags word makes them inert
        Action::ClearProxy => vec![ConfigOption::flags(ProxyFlags::DIRECT)],
        Action::AutoDetect => vec![ConfigOption::flags(ProxyFlags::AUTO_DETECT)],
        Action::PacConfig { pac_url } => vec![
            ConfigOption::flags(ProxyFlags::AUTO_PROXY_URL),
            ConfigOption::text(OptionId::AutoConfigUrl, pac_url.as_str()),
        ],
        Action::ManualProxy {
            kind,
            host,
            port,
            bypass,
        } => vec![
            ConfigOption::flags(ProxyFlags::PROXY),
            ConfigOption::text(OptionId::ProxyServer, proxy_server(*kind, host, port)),
            ConfigOption::text(OptionId::ProxyBypass, bypass.as_str()),
        ],
        Action::AddException { .. } | Action::RemoveException { .. } => return None,
    };

    Some(options)
}

/// Builds and applies option lists against a store
pub struct OptionBuilder<'a, S: ProxyStore + ?Sized> {
    store: &'a mut S,
    scope: ConnectionScope,
}

impl<'a, S: ProxyStore + ?Sized> OptionBuilder<'a, S> {
    pub fn new(store: &'a mut S, scope: ConnectionScope) -> Self {
        Self { store, scope }
    }

    /// Work out what `action` should write, reading the store if it must
    pub fn build(&self, action: &Action) -> Result<Plan> {
        let (pattern, mode) = match action {
            Action::AddException { pattern } => (pattern, EditMode::Add),
            Action::RemoveException { pattern } => (pattern, EditMode::Delete),
            _ => return Ok(Plan::Write(static_options(action).unwrap_or_default())),
        };

        let current = self.current_bypass()?;
        tracing::debug!("Current proxy bypass: {:?}", current);

        match bypass::edit(current.as_deref(), pattern, mode) {
            BypassEdit::Updated { bypass, removed } => {
                if removed > 0 {
                    tracing::info!("Removed bypass {pattern}");
                }
                Ok(Plan::Write(vec![ConfigOption::text(
                    OptionId::ProxyBypass,
                    bypass,
                )]))
            }
            BypassEdit::AlreadyPresent => Ok(Plan::AlreadyPresent),
            BypassEdit::NothingToDelete => Ok(Plan::NothingToDelete),
        }
    }

    /// Build the plan for `action`, write it, and refresh on success
    ///
    /// A failed refresh is logged and otherwise ignored.
    pub fn apply(&mut self, action: &Action) -> Result<Outcome> {
        describe(action);

        let options = match self.build(action)? {
            Plan::Write(options) => options,
            Plan::AlreadyPresent => {
                tracing::info!("Requested bypass already exists; exiting.");
                return Ok(Outcome::AlreadyPresent);
            }
            Plan::NothingToDelete => {
                tracing::info!("No exceptions to delete, skipping.");
                return Ok(Outcome::NothingToDelete);
            }
        };

        for option in &options {
            tracing::debug!("Writing {option} to {}", self.scope);
        }
        self.store
            .write(&self.scope, &options)
            .map_err(SetProxyError::StoreWrite)?;

        let refreshed = match self.store.refresh() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to refresh proxy settings: {e}");
                false
            }
        };

        Ok(Outcome::Applied { options, refreshed })
    }

    fn current_bypass(&self) -> Result<Option<String>> {
        let options = self
            .store
            .read(&self.scope, &[OptionId::ProxyBypass])
            .map_err(SetProxyError::StoreRead)?;

        let option = options
            .into_iter()
            .find(|o| o.id == OptionId::ProxyBypass)
            .ok_or_else(|| {
                SetProxyError::StoreRead(StoreError::MissingOption(OptionId::ProxyBypass))
            })?;

        Ok(option.value.as_text().map(str::to_string))
    }
}

fn describe(action: &Action) {
    match action {
        Action::ClearProxy => tracing::info!("Unsetting all proxy settings"),
        Action::AutoDetect => tracing::info!("Setting proxy settings to auto detect"),
        Action::PacConfig { pac_url } => tracing::info!("Setting proxy to PAC URL {pac_url}"),
        Action::ManualProxy { host, port, .. } => {
            tracing::info!("Setting proxy to {host}:{port}")
        }
        Action::AddException { pattern } => tracing::debug!("Adding bypass {pattern}"),
        Action::RemoveException { pattern } => tracing::debug!("Removing bypass {pattern}"),
    }
}

//! End-to-end runs of resolved actions against the stores

use setproxy_core::{
    Action, ConfigOption, ConnectionScope, FileStore, MemoryStore, OptionBuilder, OptionId,
    OptionValue, Outcome, ProxyFlags, ProxyStore,
};
use tempfile::TempDir;

fn apply<S: ProxyStore>(store: &mut S, mode: &str, values: &[&str]) -> Outcome {
    let action = Action::parse(mode, values).unwrap();
    OptionBuilder::new(store, ConnectionScope::Default)
        .apply(&action)
        .unwrap()
}

fn bypass<S: ProxyStore>(store: &S) -> OptionValue {
    store
        .read(&ConnectionScope::Default, &[OptionId::ProxyBypass])
        .unwrap()
        .remove(0)
        .value
}

#[test]
fn test_manual_proxy_then_edit_exceptions() {
    let mut store = MemoryStore::new();

    apply(&mut store, "--http", &["proxy.local", "8080", "a.com;b.com"]);
    apply(&mut store, "--add-exception", &["c.com"]);
    apply(&mut store, "--del-exception", &["a.com"]);

    let settings = store.settings(&ConnectionScope::Default);
    assert_eq!(settings.flags, ProxyFlags::PROXY.bits());
    assert_eq!(settings.proxy_server.as_deref(), Some("http://proxy.local:8080"));
    assert_eq!(settings.proxy_bypass.as_deref(), Some("b.com;c.com"));
    assert_eq!(store.writes, 3);
    assert_eq!(store.refreshes, 3);
}

#[test]
fn test_manual_proxy_replaces_exceptions_wholesale() {
    let mut store =
        MemoryStore::with_options(&[ConfigOption::text(OptionId::ProxyBypass, "old.com")]);

    apply(&mut store, "--socks", &["s.local", "1080", ""]);

    assert_eq!(bypass(&store), OptionValue::Text(String::new()));
    assert_eq!(
        store.settings(&ConnectionScope::Default).proxy_server.as_deref(),
        Some("socks=s.local:1080")
    );
}

#[test]
fn test_adding_twice_writes_once() {
    let mut store = MemoryStore::new();

    assert!(apply(&mut store, "--add-exception", &["x.com"]).wrote());
    assert_eq!(
        apply(&mut store, "--add-exception", &["x.com"]),
        Outcome::AlreadyPresent
    );
    assert_eq!(store.writes, 1);
    assert_eq!(bypass(&store), OptionValue::Text("x.com".to_string()));
}

#[test]
fn test_deleting_everything_leaves_empty_not_absent() {
    let mut store = MemoryStore::new();

    apply(&mut store, "--add-exception", &["x.com"]);
    apply(&mut store, "--del-exception", &["x.com"]);
    assert_eq!(bypass(&store), OptionValue::Text(String::new()));

    // Now empty: further deletes are skipped
    assert_eq!(
        apply(&mut store, "--del-exception", &["x.com"]),
        Outcome::NothingToDelete
    );
    assert_eq!(store.writes, 2);
}

#[test]
fn test_pac_then_clear_through_file_store() {
    let dir = TempDir::new().unwrap();
    let mut store = FileStore::new(dir.path().join("store.toml"));

    apply(&mut store, "--pac", &["http://wpad.corp/proxy.pac"]);
    apply(&mut store, "--none", &[]);

    let options = store
        .read(
            &ConnectionScope::Default,
            &[OptionId::Flags, OptionId::AutoConfigUrl, OptionId::ProxyServer],
        )
        .unwrap();
    assert_eq!(options[0], ConfigOption::flags(ProxyFlags::DIRECT));
    // Clearing only switches the flags word
    assert_eq!(
        options[1],
        ConfigOption::text(OptionId::AutoConfigUrl, "http://wpad.corp/proxy.pac")
    );
    assert_eq!(options[2], ConfigOption::absent(OptionId::ProxyServer));
}

#[test]
fn test_file_store_exception_edits_persist() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.toml");

    {
        let mut store = FileStore::new(&path);
        apply(&mut store, "--add-exception", &["a.com"]);
        apply(&mut store, "--add-exception", &["b.com"]);
    }

    let mut store = FileStore::new(&path);
    assert_eq!(bypass(&store), OptionValue::Text("a.com;b.com".to_string()));
    apply(&mut store, "--del-exception", &["a.com"]);
    assert_eq!(bypass(&store), OptionValue::Text("b.com".to_string()));
}

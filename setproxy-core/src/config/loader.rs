//! Configuration file loading

use super::schema::Config;
use crate::error::{Result, SetProxyError};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Directory holding the config file and the default file store
    pub fn config_dir() -> PathBuf {
        // Priority order:
        // 1. $XDG_CONFIG_HOME/setproxy
        // 2. ~/.config/setproxy
        // 3. %APPDATA%\setproxy

        if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("setproxy");
        }

        if let Ok(home) = env::var("HOME") {
            return PathBuf::from(home).join(".config/setproxy");
        }

        if let Ok(appdata) = env::var("APPDATA") {
            return PathBuf::from(appdata).join("setproxy");
        }

        PathBuf::from(".")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        if let Ok(path) = env::var("SETPROXY_CONFIG") {
            return PathBuf::from(path);
        }

        Self::config_dir().join("config.toml")
    }

    /// Default location of the file store: `store.toml` beside `config_path`
    pub fn default_store_path(config_path: &Path) -> PathBuf {
        match config_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join("store.toml"),
            _ => PathBuf::from("store.toml"),
        }
    }

    /// Load config from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| SetProxyError::ConfigLoad {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load config from an explicit path, or from the default location with
    /// fallback to defaults
    ///
    /// An explicit path must exist. A store path left unset in the file is
    /// filled in next to the config file that was looked up.
    pub fn load_or_default(path: Option<PathBuf>) -> Result<Config> {
        let (path, mut config) = match path {
            Some(p) => {
                let config = Self::load_from_file(&p)?;
                (p, config)
            }
            None => {
                let p = Self::default_config_path();
                let config = if p.exists() {
                    Self::load_from_file(&p)?
                } else {
                    tracing::debug!("Config file not found at {:?}, using defaults", p);
                    Config::default()
                };
                (p, config)
            }
        };

        if config.store.path.is_none() {
            config.store.path = Some(Self::default_store_path(&path));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreBackend;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_from_file() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(
            temp_file.path(),
            "[store]\nbackend = \"file\"\nconnection = \"Dial-up\"\n",
        )
        .unwrap();

        let config = ConfigLoader::load_or_default(Some(temp_file.path().to_path_buf())).unwrap();
        assert_eq!(config.store.backend, StoreBackend::File);
        assert_eq!(config.store.connection.as_deref(), Some("Dial-up"));
    }

    #[test]
    fn test_store_path_defaults_beside_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "[store]\nbackend = \"file\"\n").unwrap();

        let config = ConfigLoader::load_or_default(Some(config_path)).unwrap();
        assert_eq!(config.store.file_path(), dir.path().join("store.toml"));
    }

    #[test]
    fn test_explicit_store_path_kept() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "[store]\npath = \"/srv/proxy/store.toml\"\n").unwrap();

        let config = ConfigLoader::load_or_default(Some(config_path)).unwrap();
        assert_eq!(config.store.file_path(), PathBuf::from("/srv/proxy/store.toml"));
    }

    #[test]
    fn test_default_store_path_for_bare_file_name() {
        assert_eq!(
            ConfigLoader::default_store_path(Path::new("config.toml")),
            PathBuf::from("store.toml")
        );
        assert_eq!(
            ConfigLoader::default_store_path(Path::new("/etc/setproxy/config.toml")),
            PathBuf::from("/etc/setproxy/store.toml")
        );
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = ConfigLoader::load_or_default(Some(dir.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(err, SetProxyError::ConfigLoad { .. }));
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), "[store\n").unwrap();

        let err = ConfigLoader::load_from_file(temp_file.path()).unwrap_err();
        assert!(matches!(err, SetProxyError::ConfigParse(_)));
    }
}

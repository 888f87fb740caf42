use gem_keychain_core::{APP_DIR_NAME, HELPER_CONFIG_FILENAME};
use std::env;
use std::path::PathBuf;

/// XDG Base Directory paths for gem-keychain
pub struct XdgPaths;

impl XdgPaths {
    /// Get XDG_CONFIG_HOME/gem-keychain or fallback
    pub fn config_dir() -> PathBuf {
        env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .map(|home| home.join(".config"))
                    .unwrap_or_else(|| PathBuf::from(".config"))
            })
            .join(APP_DIR_NAME)
    }

    /// Get XDG_DATA_HOME/gem-keychain or fallback
    pub fn data_dir() -> PathBuf {
        env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .map(|home| home.join(".local/share"))
                    .unwrap_or_else(|| PathBuf::from(".local/share"))
            })
            .join(APP_DIR_NAME)
    }

    /// Helper configuration file
    pub fn helper_config_file() -> PathBuf {
        Self::config_dir().join(HELPER_CONFIG_FILENAME)
    }

    /// Root directory of the file-backed secret store
    pub fn store_dir() -> PathBuf {
        Self::data_dir().join("store")
    }

    /// The legacy plaintext credentials file written by `gem signin`
    pub fn legacy_credentials_file() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".gem")
            .join("credentials")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn with_var<F: FnOnce()>(key: &str, value: &str, f: F) {
        let original = env::var(key).ok();
        env::set_var(key, value);
        f();
        match original {
            Some(val) => env::set_var(key, val),
            None => env::remove_var(key),
        }
    }

    #[test]
    #[serial]
    fn test_xdg_paths_with_env() {
        with_var("XDG_CONFIG_HOME", "/tmp/config", || {
            assert_eq!(
                XdgPaths::config_dir(),
                PathBuf::from("/tmp/config/gem-keychain")
            );
            assert_eq!(
                XdgPaths::helper_config_file(),
                PathBuf::from("/tmp/config/gem-keychain/helper.json")
            );
        });
        with_var("XDG_DATA_HOME", "/tmp/data", || {
            assert_eq!(XdgPaths::data_dir(), PathBuf::from("/tmp/data/gem-keychain"));
            assert_eq!(
                XdgPaths::store_dir(),
                PathBuf::from("/tmp/data/gem-keychain/store")
            );
        });
    }

    #[test]
    fn test_legacy_credentials_file() {
        let path = XdgPaths::legacy_credentials_file();
        assert!(path.ends_with(".gem/credentials"));
    }
}

//! Sandbox shared by the helper integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const HELPER: &str = env!("CARGO_BIN_EXE_gem-keychain-helper");

/// A private file-backed store and config for one test
pub struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create sandbox");
        let config = r#"{"key_bits": 1024, "cert_validity_days": 1}"#;
        std::fs::write(dir.path().join("helper.json"), config).expect("write helper config");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn store_dir(&self) -> PathBuf {
        self.dir.path().join("store")
    }

    /// Variables that point the helper at this sandbox
    pub fn env(&self) -> Vec<(&'static str, String)> {
        vec![
            (
                "GEM_KEYCHAIN_CONFIG",
                self.path().join("helper.json").display().to_string(),
            ),
            ("GEM_KEYCHAIN_BACKEND", "file".to_string()),
            (
                "GEM_KEYCHAIN_STORE_DIR",
                self.store_dir().display().to_string(),
            ),
            ("GEM_KEYCHAIN_LOG", "warn".to_string()),
        ]
    }

    pub fn command(&self) -> assert_cmd::Command {
        let mut command = assert_cmd::Command::new(HELPER);
        command.envs(self.env());
        command
    }

    pub fn client(&self) -> gem_keychain::HelperClient {
        self.env()
            .into_iter()
            .fold(gem_keychain::HelperClient::new(HELPER), |client, (key, value)| {
                client.with_env(key, value)
            })
    }
}

//! Client configuration

use gem_keychain_core::{CREDENTIALS_PATH_VAR, HELPER_BINARY, HELPER_PATH_VAR};
use gem_keychain_utils::XdgPaths;
use std::env;
use std::path::PathBuf;

/// Where the client finds its collaborators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// The helper executable
    pub helper: PathBuf,
    /// The legacy credentials file used as a fallback
    pub credentials_path: PathBuf,
}

impl ClientConfig {
    /// Resolve from the environment
    pub fn from_env() -> Self {
        Self {
            helper: resolve_helper(),
            credentials_path: resolve_credentials_path(),
        }
    }
}

fn non_empty_var(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// `GEM_KEYCHAIN_HELPER`, then `PATH`, then next to the running executable
fn resolve_helper() -> PathBuf {
    if let Some(path) = non_empty_var(HELPER_PATH_VAR) {
        return path;
    }
    if let Ok(path) = which::which(HELPER_BINARY) {
        return path;
    }
    let sibling = env::current_exe().ok().and_then(|exe| {
        let candidate = exe
            .parent()?
            .join(format!("{HELPER_BINARY}{}", env::consts::EXE_SUFFIX));
        candidate.is_file().then_some(candidate)
    });
    sibling.unwrap_or_else(|| {
        tracing::debug!("helper not found, relying on PATH at spawn time");
        PathBuf::from(HELPER_BINARY)
    })
}

fn resolve_credentials_path() -> PathBuf {
    non_empty_var(CREDENTIALS_PATH_VAR).unwrap_or_else(XdgPaths::legacy_credentials_file)
}

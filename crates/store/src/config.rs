//! Helper configuration
//!
//! Built-in defaults, overlaid by an optional JSON file, overlaid by a few
//! environment variables.

use crate::backend::{FileStore, SecretStore};
use crate::lifecycle::CertificateSettings;
use gem_keychain_core::{
    Error, Result, BACKEND_VAR, CONFIG_PATH_VAR, DEFAULT_CERT_SUBJECT, DEFAULT_CERT_VALIDITY_DAYS,
    DEFAULT_KEY_BITS, MIN_KEY_BITS, STORE_DIR_VAR,
};
use gem_keychain_utils::XdgPaths;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const MAX_CERT_VALIDITY_DAYS: u32 = 3650;

/// Which secret store the helper talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// The platform secret store
    Keyring,
    /// Private files under `store_dir`
    File,
}

impl Default for Backend {
    /// The platform store where it persists across logins (macOS Keychain,
    /// Windows Credential Manager), private files everywhere else. The Linux
    /// kernel keyring is emptied on reboot, so it is never the default.
    fn default() -> Self {
        if cfg!(all(
            feature = "keyring",
            any(target_os = "macos", target_os = "windows")
        )) {
            Backend::Keyring
        } else {
            Backend::File
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Keyring => f.write_str("keyring"),
            Backend::File => f.write_str("file"),
        }
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keyring" => Ok(Backend::Keyring),
            "file" => Ok(Backend::File),
            other => Err(Error::configuration(format!(
                "unknown backend '{other}', expected 'keyring' or 'file'"
            ))),
        }
    }
}

/// Settings for the helper process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HelperConfig {
    pub backend: Backend,
    /// Root of the file backend, defaults to the XDG data directory
    pub store_dir: Option<PathBuf>,
    pub key_bits: usize,
    pub cert_validity_days: u32,
    pub cert_subject: String,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            store_dir: None,
            key_bits: DEFAULT_KEY_BITS,
            cert_validity_days: DEFAULT_CERT_VALIDITY_DAYS,
            cert_subject: DEFAULT_CERT_SUBJECT.to_string(),
        }
    }
}

impl HelperConfig {
    /// Load the effective configuration for this process
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(XdgPaths::helper_config_file);

        let mut config = Self::from_file(&path)?.unwrap_or_default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file, `None` if it does not exist
    pub fn from_file(path: &Path) -> Result<Option<Self>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::file_system(path, "read", e)),
        };
        let config = serde_json::from_str(&content).map_err(|e| {
            Error::configuration(format!("invalid config file {}: {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), "loaded helper config");
        Ok(Some(config))
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(backend) = std::env::var(BACKEND_VAR) {
            self.backend = backend.parse()?;
        }
        if let Some(dir) = std::env::var_os(STORE_DIR_VAR) {
            if !dir.is_empty() {
                self.store_dir = Some(PathBuf::from(dir));
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.key_bits < MIN_KEY_BITS {
            return Err(Error::configuration(format!(
                "key_bits must be at least {MIN_KEY_BITS}, got {}",
                self.key_bits
            )));
        }
        if !(1..=MAX_CERT_VALIDITY_DAYS).contains(&self.cert_validity_days) {
            return Err(Error::configuration(format!(
                "cert_validity_days must be between 1 and {MAX_CERT_VALIDITY_DAYS}, got {}",
                self.cert_validity_days
            )));
        }
        self.certificate_settings().map(|_| ())
    }

    /// Root directory of the file backend
    pub fn store_dir(&self) -> PathBuf {
        self.store_dir.clone().unwrap_or_else(XdgPaths::store_dir)
    }

    pub fn certificate_settings(&self) -> Result<CertificateSettings> {
        CertificateSettings::new(&self.cert_subject, self.cert_validity_days)
    }

    /// Open the configured secret store
    pub fn open_store(&self) -> Result<Box<dyn SecretStore>> {
        tracing::debug!(backend = %self.backend, "opening secret store");
        match self.backend {
            Backend::File => Ok(Box::new(FileStore::new(self.store_dir()))),
            #[cfg(feature = "keyring")]
            Backend::Keyring => {
                if !cfg!(any(target_os = "macos", target_os = "windows")) {
                    tracing::warn!("the kernel keyring does not keep secrets across reboots");
                }
                Ok(Box::new(crate::backend::KeyringStore::new()))
            }
            #[cfg(not(feature = "keyring"))]
            Backend::Keyring => Err(Error::configuration(
                "this helper was built without platform keyring support, use the file backend",
            )),
        }
    }
}

//! The legacy plaintext credentials file
//!
//! `~/.gem/credentials` is a flat YAML mapping of host to api key, written by
//! older tooling with Ruby symbol keys (`:rubygems_api_key: ...`). It is read
//! once and never written.

use gem_keychain_core::{Error, Host, Result, SecretText};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Read-only host to api key map used when the keychain has no entry
#[derive(Default)]
pub struct FallbackCredentials {
    entries: BTreeMap<Host, SecretText>,
}

impl FallbackCredentials {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the credentials file. A missing file is an empty map.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => SecretText::new(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no legacy credentials file");
                return Ok(Self::empty());
            }
            Err(e) => return Err(Error::file_system(path, "read", e)),
        };
        let credentials = Self::parse(&content)?;
        tracing::debug!(
            path = %path.display(),
            hosts = credentials.len(),
            "loaded legacy credentials"
        );
        Ok(credentials)
    }

    /// Parse the YAML text of a credentials file
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::empty());
        }
        let mapping = match serde_yaml::from_str::<Value>(content)? {
            Value::Null => return Ok(Self::empty()),
            Value::Mapping(mapping) => mapping,
            _ => {
                return Err(Error::configuration(
                    "credentials file must be a mapping of host to api key",
                ))
            }
        };

        let mut entries = BTreeMap::new();
        for (key, value) in mapping {
            let (Some(key), Some(value)) = (scalar_to_string(&key), scalar_to_string(&value))
            else {
                tracing::warn!("skipping non-scalar entry in credentials file");
                continue;
            };
            // Symbol keys keep their leading colon in YAML
            let host = Host::from(key.strip_prefix(':').unwrap_or(&key));
            entries.entry(host).or_insert_with(|| SecretText::new(value));
        }
        Ok(Self { entries })
    }

    pub fn get(&self, host: &Host) -> Option<&str> {
        self.entries.get(host).map(|token| token.as_str())
    }

    pub fn contains(&self, host: &Host) -> bool {
        self.entries.contains_key(host)
    }

    pub fn hosts(&self) -> impl Iterator<Item = &Host> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<H: Into<Host>, T: Into<String>> FromIterator<(H, T)> for FallbackCredentials {
    fn from_iter<I: IntoIterator<Item = (H, T)>>(iter: I) -> Self {
        let mut entries = BTreeMap::new();
        for (host, token) in iter {
            entries
                .entry(host.into())
                .or_insert_with(|| SecretText::new(token.into()));
        }
        Self { entries }
    }
}

impl std::fmt::Debug for FallbackCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackCredentials")
            .field("hosts", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

//! Secret store backends
//!
//! The helper never implements encryption at rest itself; it hands bytes to a
//! backend and asks for them back. Backends must report absence as `Ok(None)`
//! and reserve `Err` for real failures.

mod file;
mod memory;
#[cfg(feature = "keyring")]
mod platform;

pub use file::FileStore;
pub use memory::MemoryStore;
#[cfg(feature = "keyring")]
pub use platform::KeyringStore;

use gem_keychain_core::{
    Result, SecretBytes, API_KEY_SERVICE, CERTIFICATE_SERVICE, SIGNING_KEY_SERVICE,
};
use std::fmt;
use std::sync::Arc;

/// The kinds of item the helper keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemKind {
    /// Bearer tokens, one per host
    Token,
    /// The RSA signing key, PKCS#8 DER, under the fixed tag
    SigningKey,
    /// The current self-signed certificate, DER, under the fixed tag
    Certificate,
}

impl ItemKind {
    /// Service name used to namespace items in platform stores
    #[must_use]
    pub const fn service(self) -> &'static str {
        match self {
            ItemKind::Token => API_KEY_SERVICE,
            ItemKind::SigningKey => SIGNING_KEY_SERVICE,
            ItemKind::Certificate => CERTIFICATE_SERVICE,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            ItemKind::Token => "api key",
            ItemKind::SigningKey => "signing key",
            ItemKind::Certificate => "signing certificate",
        }
    }

    /// Directory name used by the file backend
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            ItemKind::Token => "api-keys",
            ItemKind::SigningKey => "keys",
            ItemKind::Certificate => "certificates",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How `put` treats an existing item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Fail with `Error::AlreadyExists` if the item exists
    CreateNew,
    /// Replace any existing item
    Overwrite,
}

/// Synchronous access to a protected secret store.
///
/// Per-item atomicity and serialization of concurrent writers are the
/// backend's responsibility; callers do no locking of their own.
pub trait SecretStore: Send + Sync {
    /// Read an item, `None` if it does not exist
    fn get(&self, kind: ItemKind, account: &str) -> Result<Option<SecretBytes>>;

    /// Store an item
    fn put(&self, kind: ItemKind, account: &str, value: &[u8], mode: WriteMode) -> Result<()>;

    /// Remove an item, returning whether it existed
    fn delete(&self, kind: ItemKind, account: &str) -> Result<bool>;

    /// Account names holding an item of `kind`, in no particular order
    fn accounts(&self, kind: ItemKind) -> Result<Vec<String>>;

    /// Whether an item exists
    fn contains(&self, kind: ItemKind, account: &str) -> Result<bool> {
        Ok(self.get(kind, account)?.is_some())
    }
}

impl<S: SecretStore + ?Sized> SecretStore for Arc<S> {
    fn get(&self, kind: ItemKind, account: &str) -> Result<Option<SecretBytes>> {
        (**self).get(kind, account)
    }

    fn put(&self, kind: ItemKind, account: &str, value: &[u8], mode: WriteMode) -> Result<()> {
        (**self).put(kind, account, value, mode)
    }

    fn delete(&self, kind: ItemKind, account: &str) -> Result<bool> {
        (**self).delete(kind, account)
    }

    fn accounts(&self, kind: ItemKind) -> Result<Vec<String>> {
        (**self).accounts(kind)
    }

    fn contains(&self, kind: ItemKind, account: &str) -> Result<bool> {
        (**self).contains(kind, account)
    }
}

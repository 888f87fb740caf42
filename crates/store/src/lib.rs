//! The privileged side of gem-keychain.
//!
//! This crate is the only code that touches the secret store. It provides the
//! [`SecretStore`] abstraction and its backends, custody of the signing key,
//! the certificate lifecycle, and the [`Adapter`] that turns one helper
//! command into store operations and an exit status.

pub mod adapter;
pub mod backend;
pub mod config;
pub mod identity;
pub mod lifecycle;

#[cfg(test)]
pub(crate) mod testutil;

pub use adapter::Adapter;
pub use backend::{FileStore, ItemKind, MemoryStore, SecretStore, WriteMode};
#[cfg(feature = "keyring")]
pub use backend::KeyringStore;
pub use config::{Backend, HelperConfig};
pub use lifecycle::{CertificateManager, CertificateSettings, Clock, IdentityState, SystemClock};

//! Keychain-backed api keys and gem signing
//!
//! This crate is the unprivileged side of gem-keychain. It never touches the
//! secret store; every operation is a call to the `gem-keychain-helper`
//! process.
//!
//! ## Key Components
//!
//! - **`HelperClient`**: runs the helper and maps its exit status to
//!   [`HelperOutcome`] or an error.
//! - **`ApiKeys`**: api key lookup with fallback to `~/.gem/credentials`.
//! - **`KeychainSigner`**: a [`Signer`] whose key stays in the keychain.
//! - **`SignerFactory`**: picks the keychain signer when a key is stored.
//! - **`Keychain`**: facade over all of the above.

pub mod api_keys;
pub mod client;
pub mod config;
pub mod credentials;
pub mod executor;
pub mod keychain;
pub mod policy;
pub mod signer;

#[cfg(test)]
pub(crate) mod testutil;

pub use api_keys::ApiKeys;
pub use client::{HelperClient, HelperOutcome};
pub use config::ClientConfig;
pub use credentials::FallbackCredentials;
pub use executor::{CommandExecutor, CommandExecutorFactory, SystemCommandExecutor};
pub use keychain::Keychain;
pub use policy::{certificate_public_key, SigningPolicy};
pub use signer::{DigestAlgorithm, KeychainSigner, Signer, SignerFactory};

pub use gem_keychain_core::{Error, Host, Result};

//! The entry point for host tooling
//!
//! Token management goes straight to the helper; lookups that should honour
//! the legacy credentials file go through [`ApiKeys`].

use crate::api_keys::ApiKeys;
use crate::client::HelperClient;
use crate::config::ClientConfig;
use crate::credentials::FallbackCredentials;
use crate::signer::SignerFactory;
use gem_keychain_core::{Host, Result, SecretText};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Keychain-backed api keys and signing
#[derive(Debug, Clone)]
pub struct Keychain {
    client: Arc<HelperClient>,
    credentials_path: PathBuf,
}

impl Keychain {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_client(HelperClient::new(config.helper), config.credentials_path)
    }

    /// Configured from the environment
    pub fn from_env() -> Self {
        Self::new(ClientConfig::from_env())
    }

    pub fn with_client(client: HelperClient, credentials_path: impl Into<PathBuf>) -> Self {
        Self {
            client: Arc::new(client),
            credentials_path: credentials_path.into(),
        }
    }

    pub fn client(&self) -> &HelperClient {
        &self.client
    }

    /// Whether the keychain itself holds a key for `host`
    pub fn has_token(&self, host: impl Into<Host>) -> Result<bool> {
        self.client.has_token(&host.into())
    }

    /// The keychain's key for `host`, ignoring the legacy file
    pub fn get_token(&self, host: impl Into<Host>) -> Result<Option<SecretText>> {
        self.client.get_token(&host.into())
    }

    pub fn set_token(&self, host: impl Into<Host>, token: &str) -> Result<()> {
        let host = host.into();
        self.client.set_token(&host, token)?;
        tracing::info!(%host, "api key saved to keychain");
        Ok(())
    }

    pub fn rm_token(&self, host: impl Into<Host>) -> Result<()> {
        let host = host.into();
        self.client.rm_token(&host)?;
        tracing::info!(%host, "api key removed from keychain");
        Ok(())
    }

    pub fn list_tokens(&self) -> Result<BTreeSet<String>> {
        self.client.list_tokens()
    }

    /// Resolver with the legacy credentials file loaded as fallback
    pub fn api_keys(&self) -> Result<ApiKeys> {
        let fallback = FallbackCredentials::load(&self.credentials_path)?;
        Ok(ApiKeys::new(Arc::clone(&self.client), fallback))
    }

    pub fn signer_factory(&self) -> SignerFactory {
        SignerFactory::new(Arc::clone(&self.client))
    }
}

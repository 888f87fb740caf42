//! Api key lookup with legacy fallback

use crate::client::HelperClient;
use crate::credentials::FallbackCredentials;
use gem_keychain_core::{Host, Result, SecretText};
use std::sync::Arc;

/// Resolves api keys from the keychain, then from the legacy credentials file.
///
/// Only a "not found" answer from the helper falls through to the file. A
/// helper failure is returned as-is so that a locked or broken keychain is
/// never mistaken for a missing key.
#[derive(Debug)]
pub struct ApiKeys {
    client: Arc<HelperClient>,
    fallback: FallbackCredentials,
}

impl ApiKeys {
    pub fn new(client: Arc<HelperClient>, fallback: FallbackCredentials) -> Self {
        Self { client, fallback }
    }

    pub fn has_token(&self, host: &Host) -> Result<bool> {
        if self.client.has_token(host)? {
            return Ok(true);
        }
        Ok(self.fallback.contains(host))
    }

    pub fn get_token(&self, host: &Host) -> Result<Option<SecretText>> {
        if let Some(token) = self.client.get_token(host)? {
            return Ok(Some(token));
        }
        let fallback = self.fallback.get(host).map(|token| {
            tracing::debug!(%host, "using api key from legacy credentials");
            SecretText::new(token.to_string())
        });
        Ok(fallback)
    }

    pub fn fallback(&self) -> &FallbackCredentials {
        &self.fallback
    }
}

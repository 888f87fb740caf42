//! Gem signing backed by the keychain
//!
//! [`KeychainSigner`] never sees the private key. It fetches the helper's
//! self-signed certificate once, verifies the chain locally, and only then
//! asks the helper for a signature.

use crate::client::{HelperClient, NO_KEY_MESSAGE};
use crate::policy::SigningPolicy;
use gem_keychain_core::{Error, Result};
use once_cell::unsync::OnceCell;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;
use x509_cert::name::Name;
use x509_cert::Certificate;

/// Digest used for gem signatures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Sha1,
    Sha256,
}

impl DigestAlgorithm {
    pub const fn name(self) -> &'static str {
        match self {
            DigestAlgorithm::Sha1 => "SHA1",
            DigestAlgorithm::Sha256 => "SHA256",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Something that can sign gem contents
pub trait Signer {
    /// The signing certificate
    fn cert(&self) -> Result<&Certificate>;

    /// The chain from the signing certificate to its root, leaf first
    fn cert_chain(&self) -> Result<Vec<Certificate>>;

    fn digest_algorithm(&self) -> DigestAlgorithm;

    /// Detached signature over `data`
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Signs through the helper with the keychain's signing identity
pub struct KeychainSigner {
    client: Arc<HelperClient>,
    policy: SigningPolicy,
    expected_subject: Option<Name>,
    cert: OnceCell<Certificate>,
}

impl KeychainSigner {
    pub fn new(client: Arc<HelperClient>) -> Self {
        Self {
            client,
            policy: SigningPolicy::new(),
            expected_subject: None,
            cert: OnceCell::new(),
        }
    }

    /// Require the certificate to carry `subject` rather than whatever the
    /// helper issued
    #[must_use]
    pub fn with_expected_subject(mut self, subject: Name) -> Self {
        self.expected_subject = Some(subject);
        self
    }

    fn fetch_cert(&self) -> Result<Certificate> {
        if !self.client.has_key()? {
            return Err(Error::key_absent(NO_KEY_MESSAGE));
        }
        let cert = self.client.get_cert()?;
        tracing::debug!(
            subject = %cert.tbs_certificate.subject,
            not_after = %cert.tbs_certificate.validity.not_after,
            "fetched signing certificate"
        );
        Ok(cert)
    }
}

impl Signer for KeychainSigner {
    fn cert(&self) -> Result<&Certificate> {
        self.cert.get_or_try_init(|| self.fetch_cert())
    }

    fn cert_chain(&self) -> Result<Vec<Certificate>> {
        Ok(vec![self.cert()?.clone()])
    }

    fn digest_algorithm(&self) -> DigestAlgorithm {
        DigestAlgorithm::Sha1
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        let chain = self.cert_chain()?;
        let expected = match &self.expected_subject {
            Some(subject) => subject.clone(),
            None => self.cert()?.tbs_certificate.subject.clone(),
        };
        self.policy
            .verify(&chain, None, SystemTime::now(), &expected)?;
        self.client.sign(data)
    }
}

impl fmt::Debug for KeychainSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeychainSigner")
            .field("client", &self.client)
            .field("cert_loaded", &self.cert.get().is_some())
            .finish()
    }
}

/// Chooses the keychain signer when a signing key is stored
#[derive(Debug, Clone)]
pub struct SignerFactory {
    client: Arc<HelperClient>,
}

impl SignerFactory {
    pub fn new(client: Arc<HelperClient>) -> Self {
        Self { client }
    }

    /// The keychain signer if the keychain holds a signing key, `default`
    /// otherwise
    pub fn select(&self, default: Box<dyn Signer>) -> Result<Box<dyn Signer>> {
        if self.client.has_key()? {
            tracing::debug!("using keychain signer");
            Ok(Box::new(KeychainSigner::new(Arc::clone(&self.client))))
        } else {
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::TestCommandExecutor;

    struct StubSigner;

    impl Signer for StubSigner {
        fn cert(&self) -> Result<&Certificate> {
            Err(Error::certificate_missing("stub"))
        }

        fn cert_chain(&self) -> Result<Vec<Certificate>> {
            Ok(Vec::new())
        }

        fn digest_algorithm(&self) -> DigestAlgorithm {
            DigestAlgorithm::Sha256
        }

        fn sign(&self, _data: &[u8]) -> Result<Vec<u8>> {
            Ok(b"stub".to_vec())
        }
    }

    fn client(executor: &TestCommandExecutor) -> Arc<HelperClient> {
        Arc::new(HelperClient::with_executor(
            "gem-keychain-helper",
            Box::new(executor.clone()),
        ))
    }

    #[test]
    fn test_no_key_is_key_absent() {
        let executor = TestCommandExecutor::new();
        executor.add_not_found(&["has-key"]);
        let signer = KeychainSigner::new(client(&executor));

        assert!(signer.cert().unwrap_err().is_key_absent());
        assert!(signer.sign(b"data").unwrap_err().is_key_absent());
        // Never asks for a certificate or a signature without a key
        assert!(executor
            .calls()
            .iter()
            .all(|call| call.args == ["has-key".to_string()]));
    }

    #[test]
    fn test_helper_failure_propagates() {
        let executor = TestCommandExecutor::new();
        executor.add_success(&["has-key"], b"");
        executor.add_failure(&["get-cert"], "Error: secret store read failed");
        let signer = KeychainSigner::new(client(&executor));

        let err = signer.cert().unwrap_err();
        assert!(err.is_operational(), "{err}");
    }

    #[test]
    fn test_digest_is_sha1() {
        let executor = TestCommandExecutor::new();
        let signer = KeychainSigner::new(client(&executor));
        assert_eq!(signer.digest_algorithm(), DigestAlgorithm::Sha1);
        assert_eq!(signer.digest_algorithm().to_string(), "SHA1");
    }

    #[test]
    fn test_factory_falls_back_without_key() {
        let executor = TestCommandExecutor::new();
        executor.add_not_found(&["has-key"]);
        let factory = SignerFactory::new(client(&executor));

        let signer = factory.select(Box::new(StubSigner)).unwrap();
        assert_eq!(signer.digest_algorithm(), DigestAlgorithm::Sha256);
        assert_eq!(signer.sign(b"x").unwrap(), b"stub");
    }

    #[test]
    fn test_factory_prefers_keychain() {
        let executor = TestCommandExecutor::new();
        executor.add_success(&["has-key"], b"");
        let factory = SignerFactory::new(client(&executor));

        let signer = factory.select(Box::new(StubSigner)).unwrap();
        assert_eq!(signer.digest_algorithm(), DigestAlgorithm::Sha1);
    }

    #[test]
    fn test_factory_surfaces_failures() {
        let executor = TestCommandExecutor::new();
        executor.add_failure(&["has-key"], "Error: keychain locked");
        let factory = SignerFactory::new(client(&executor));

        let err = factory.select(Box::new(StubSigner)).err().unwrap();
        assert!(err.is_operational());
    }
}

//! Shared fixtures for client tests

use gem_keychain_store::{identity, CertificateManager, CertificateSettings, MemoryStore};
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::RsaPrivateKey;
use x509_cert::Certificate;

pub const SUBJECT: &str = "CN=gem-keychain,O=RubyGems";

static TEST_KEY: Lazy<RsaPrivateKey> =
    Lazy::new(|| RsaPrivateKey::new(&mut OsRng, 1024).expect("generate test key"));

static OTHER_KEY: Lazy<RsaPrivateKey> =
    Lazy::new(|| RsaPrivateKey::new(&mut OsRng, 1024).expect("generate test key"));

pub fn test_key() -> &'static RsaPrivateKey {
    &TEST_KEY
}

pub fn other_key() -> &'static RsaPrivateKey {
    &OTHER_KEY
}

/// A self-signed certificate over `key`, issued the way the helper does it
pub fn issue_certificate(key: &RsaPrivateKey, subject: &str) -> Certificate {
    let store = MemoryStore::new();
    let pem = key.to_pkcs8_pem(LineEnding::LF).expect("encode test key");
    identity::import_key(&store, pem.as_bytes()).expect("import test key");
    let settings = CertificateSettings::new(subject, 365).expect("certificate settings");
    CertificateManager::new(settings)
        .current(&store)
        .expect("issue test certificate")
}

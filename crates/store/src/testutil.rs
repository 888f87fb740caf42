//! Shared fixtures for store tests

use crate::lifecycle::Clock;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rand::rngs::OsRng;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::RsaPrivateKey;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use zeroize::Zeroizing;

// Key generation dominates test time, so every test shares one small key
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

pub fn test_key_pem() -> Zeroizing<String> {
    TEST_KEY.to_pkcs8_pem(LineEnding::LF).expect("encode test key")
}

pub fn other_key_pem() -> Zeroizing<String> {
    OTHER_KEY.to_pkcs8_pem(LineEnding::LF).expect("encode test key")
}

/// A clock that only moves when told to
#[derive(Clone)]
pub struct FixedClock {
    now: Arc<Mutex<SystemTime>>,
}

impl FixedClock {
    pub fn new(now: SystemTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        // Whole seconds, since certificate times have second resolution
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1_760_000_000);
        Self::new(now)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> SystemTime {
        *self.now.lock()
    }
}

//! Self-signed certificate lifecycle
//!
//! The signing key is permanent; the certificate over it is disposable. A
//! fresh certificate is issued whenever one is requested and the stored one
//! is missing, expired or no longer describes the current key and subject.
//! There is no certificate history: a reissue overwrites in place.

use crate::backend::{ItemKind, SecretStore, WriteMode};
use crate::identity;
use gem_keychain_core::{Error, Result, SIGNING_KEY_TAG};
use rand::rngs::OsRng;
use rand::RngCore;
use rsa::pkcs1v15::{Signature, SigningKey};
use rsa::RsaPrivateKey;
use sha2::Sha256;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use x509_cert::builder::{Builder, CertificateBuilder, Profile};
use x509_cert::der::asn1::{GeneralizedTime, UtcTime};
use x509_cert::der::pem::LineEnding;
use x509_cert::der::{Decode, Encode, EncodePem};
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::SubjectPublicKeyInfoOwned;
use x509_cert::time::{Time, Validity};
use x509_cert::Certificate;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// 2050-01-01T00:00:00Z
const GENERALIZED_TIME_FROM: Duration = Duration::from_secs(2_524_608_000);

/// Source of wall-clock time
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

/// The system wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Where the signing identity stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityState {
    NoKey,
    KeyNoCert,
    CertValid,
    CertExpired,
}

impl fmt::Display for IdentityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            IdentityState::NoKey => "no key",
            IdentityState::KeyNoCert => "key without certificate",
            IdentityState::CertValid => "certificate valid",
            IdentityState::CertExpired => "certificate expired",
        };
        f.write_str(text)
    }
}

/// What goes into an issued certificate
#[derive(Debug, Clone)]
pub struct CertificateSettings {
    pub subject: Name,
    pub validity: Duration,
}

impl CertificateSettings {
    /// Settings from an RFC 4514 subject string and a validity in days
    pub fn new(subject: &str, validity_days: u32) -> Result<Self> {
        let subject = Name::from_str(subject).map_err(|e| {
            Error::configuration(format!("invalid certificate subject '{subject}': {e}"))
        })?;
        if validity_days == 0 {
            return Err(Error::configuration(
                "certificate validity must be at least one day",
            ));
        }
        Ok(Self {
            subject,
            validity: Duration::from_secs(u64::from(validity_days) * SECONDS_PER_DAY),
        })
    }
}

/// Issues and renews the certificate over the stored signing key
pub struct CertificateManager {
    settings: CertificateSettings,
    clock: Box<dyn Clock>,
}

impl CertificateManager {
    pub fn new(settings: CertificateSettings) -> Self {
        Self::with_clock(settings, Box::new(SystemClock))
    }

    pub fn with_clock(settings: CertificateSettings, clock: Box<dyn Clock>) -> Self {
        Self { settings, clock }
    }

    pub fn settings(&self) -> &CertificateSettings {
        &self.settings
    }

    /// Current lifecycle state. Never writes to the store.
    pub fn state(&self, store: &dyn SecretStore) -> Result<IdentityState> {
        let Some(key) = identity::load_key(store)? else {
            return Ok(IdentityState::NoKey);
        };
        let stored = stored_certificate(store)?;
        self.classify(&key, stored.as_ref())
    }

    /// A valid certificate for the stored key, issuing one if needed.
    ///
    /// Fails with `KeyAbsent` when there is no key; never fabricates a
    /// certificate without one.
    pub fn current(&self, store: &dyn SecretStore) -> Result<Certificate> {
        let key = identity::require_key(store)?;
        if let Some(cert) = stored_certificate(store)? {
            let state = self.classify(&key, Some(&cert))?;
            if state == IdentityState::CertValid {
                return Ok(cert);
            }
            tracing::info!(%state, "replacing signing certificate");
        }

        let cert = self.issue(&key)?;
        let der = cert
            .to_der()
            .map_err(|e| Error::crypto("encode certificate", e.to_string()))?;
        store.put(
            ItemKind::Certificate,
            SIGNING_KEY_TAG,
            &der,
            WriteMode::Overwrite,
        )?;
        Ok(cert)
    }

    /// `current` rendered as PEM
    pub fn current_pem(&self, store: &dyn SecretStore) -> Result<String> {
        let cert = self.current(store)?;
        cert.to_pem(LineEnding::LF)
            .map_err(|e| Error::crypto("encode certificate", e.to_string()))
    }

    /// The signing key, provided a valid certificate has already been issued
    /// for it. Signing never issues certificates itself.
    pub fn require_valid(&self, store: &dyn SecretStore) -> Result<RsaPrivateKey> {
        let key = identity::require_key(store)?;
        let stored = stored_certificate(store)?;
        match self.classify(&key, stored.as_ref())? {
            IdentityState::CertValid => Ok(key),
            IdentityState::CertExpired => Err(Error::certificate_expired(
                "request the certificate again to renew it",
            )),
            IdentityState::KeyNoCert | IdentityState::NoKey => Err(Error::certificate_missing(
                "request the certificate before signing",
            )),
        }
    }

    /// Whether `now` falls inside the certificate's validity window
    pub fn is_current(&self, cert: &Certificate) -> bool {
        is_valid_at(cert, self.clock.now())
    }

    fn classify(&self, key: &RsaPrivateKey, cert: Option<&Certificate>) -> Result<IdentityState> {
        let Some(cert) = cert else {
            return Ok(IdentityState::KeyNoCert);
        };
        if !self.issued_for(key, cert)? {
            return Ok(IdentityState::KeyNoCert);
        }
        if self.is_current(cert) {
            Ok(IdentityState::CertValid)
        } else {
            Ok(IdentityState::CertExpired)
        }
    }

    fn issued_for(&self, key: &RsaPrivateKey, cert: &Certificate) -> Result<bool> {
        let tbs = &cert.tbs_certificate;
        Ok(tbs.subject == self.settings.subject
            && tbs.subject_public_key_info == public_key_info(key)?)
    }

    fn issue(&self, key: &RsaPrivateKey) -> Result<Certificate> {
        let now = self.clock.now();
        let validity = Validity {
            not_before: cert_time(now)?,
            not_after: cert_time(now + self.settings.validity)?,
        };

        let signer = SigningKey::<Sha256>::new(key.clone());
        let builder = CertificateBuilder::new(
            Profile::Root,
            random_serial()?,
            validity,
            self.settings.subject.clone(),
            public_key_info(key)?,
            &signer,
        )
        .map_err(|e| Error::crypto("issue certificate", e.to_string()))?;

        let cert = builder
            .build::<Signature>()
            .map_err(|e| Error::crypto("issue certificate", e.to_string()))?;
        tracing::info!(
            subject = %self.settings.subject,
            not_after = %cert.tbs_certificate.validity.not_after,
            "issued signing certificate"
        );
        Ok(cert)
    }
}

/// Whether `time` falls inside `[notBefore, notAfter]`, both ends inclusive
pub fn is_valid_at(cert: &Certificate, time: SystemTime) -> bool {
    let Ok(since_epoch) = time.duration_since(UNIX_EPOCH) else {
        return false;
    };
    let validity = &cert.tbs_certificate.validity;
    validity.not_before.to_unix_duration() <= since_epoch
        && since_epoch <= validity.not_after.to_unix_duration()
}

fn stored_certificate(store: &dyn SecretStore) -> Result<Option<Certificate>> {
    let Some(der) = store.get(ItemKind::Certificate, SIGNING_KEY_TAG)? else {
        return Ok(None);
    };
    match Certificate::from_der(&der) {
        Ok(cert) => Ok(Some(cert)),
        Err(e) => {
            // Regenerable, so a damaged copy is treated as missing
            tracing::warn!(error = %e, "ignoring unreadable stored certificate");
            Ok(None)
        }
    }
}

fn public_key_info(key: &RsaPrivateKey) -> Result<SubjectPublicKeyInfoOwned> {
    SubjectPublicKeyInfoOwned::from_key(key.to_public_key())
        .map_err(|e| Error::crypto("encode public key", e.to_string()))
}

/// RFC 5280 encoding: UTCTime through 2049, GeneralizedTime from 2050 on
fn cert_time(time: SystemTime) -> Result<Time> {
    let since_epoch = time
        .duration_since(UNIX_EPOCH)
        .map_err(|e| Error::crypto("certificate validity", e.to_string()))?;
    // Certificate times carry whole seconds
    let since_epoch = Duration::from_secs(since_epoch.as_secs());
    let encoded = if since_epoch < GENERALIZED_TIME_FROM {
        UtcTime::from_unix_duration(since_epoch).map(Time::UtcTime)
    } else {
        GeneralizedTime::from_unix_duration(since_epoch).map(Time::GeneralTime)
    };
    encoded.map_err(|e| Error::crypto("certificate validity", e.to_string()))
}

fn random_serial() -> Result<SerialNumber> {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    // Positive and without a redundant leading zero
    bytes[0] &= 0x7f;
    bytes[0] |= 0x01;
    SerialNumber::new(&bytes).map_err(|e| Error::crypto("certificate serial", e.to_string()))
}

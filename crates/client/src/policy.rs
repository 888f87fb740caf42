//! Local certificate chain verification
//!
//! Runs before any signature is requested from the helper and never needs the
//! private key. Checks, in order: the chain is non-empty, every certificate is
//! inside its validity window, the root is self-issued and self-signed, each
//! certificate is signed by the next one, the leaf carries the expected
//! subject, and, if a public key is supplied, the leaf was issued for it.

use gem_keychain_core::{Error, Result};
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::pkcs8::DecodePublicKey;
use rsa::signature::Verifier;
use rsa::RsaPublicKey;
use sha1::Sha1;
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use x509_cert::der::asn1::ObjectIdentifier;
use x509_cert::der::Encode;
use x509_cert::name::Name;
use x509_cert::spki::SubjectPublicKeyInfoOwned;
use x509_cert::Certificate;

const SHA1_WITH_RSA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.5");
const SHA256_WITH_RSA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.11");

/// Verifier for signing certificate chains, leaf first
#[derive(Debug, Clone, Copy, Default)]
pub struct SigningPolicy;

impl SigningPolicy {
    pub fn new() -> Self {
        Self
    }

    pub fn verify(
        &self,
        chain: &[Certificate],
        key: Option<&RsaPublicKey>,
        time: SystemTime,
        expected_subject: &Name,
    ) -> Result<()> {
        let (Some(leaf), Some(root)) = (chain.first(), chain.last()) else {
            return Err(Error::policy_violation("certificate chain is empty"));
        };

        for cert in chain {
            check_validity(cert, time)?;
        }

        if root.tbs_certificate.issuer != root.tbs_certificate.subject {
            return Err(Error::policy_violation(format!(
                "root certificate {} is not self-issued",
                root.tbs_certificate.subject
            )));
        }
        check_signature(root, root)?;

        for pair in chain.windows(2) {
            let (cert, issuer) = (&pair[0], &pair[1]);
            if cert.tbs_certificate.issuer != issuer.tbs_certificate.subject {
                return Err(Error::policy_violation(format!(
                    "certificate {} was not issued by {}",
                    cert.tbs_certificate.subject, issuer.tbs_certificate.subject
                )));
            }
            check_signature(cert, issuer)?;
        }

        if leaf.tbs_certificate.subject != *expected_subject {
            return Err(Error::policy_violation(format!(
                "certificate subject {} does not match {expected_subject}",
                leaf.tbs_certificate.subject
            )));
        }

        if let Some(key) = key {
            let expected = SubjectPublicKeyInfoOwned::from_key(key.clone())
                .map_err(|e| Error::crypto("encode public key", e.to_string()))?;
            if leaf.tbs_certificate.subject_public_key_info != expected {
                return Err(Error::policy_violation(
                    "signing key does not match the certificate",
                ));
            }
        }

        tracing::debug!(length = chain.len(), "certificate chain verified");
        Ok(())
    }
}

/// The RSA public key a certificate was issued for
pub fn certificate_public_key(cert: &Certificate) -> Result<RsaPublicKey> {
    let spki = cert
        .tbs_certificate
        .subject_public_key_info
        .to_der()
        .map_err(|e| Error::crypto("read certificate key", e.to_string()))?;
    RsaPublicKey::from_public_key_der(&spki)
        .map_err(|e| Error::crypto("read certificate key", e.to_string()))
}

/// RFC 5280 validity: both `notBefore` and `notAfter` are inclusive
fn check_validity(cert: &Certificate, time: SystemTime) -> Result<()> {
    let validity = &cert.tbs_certificate.validity;
    let since_epoch = time.duration_since(UNIX_EPOCH).unwrap_or_default();

    if since_epoch < validity.not_before.to_unix_duration() {
        return Err(Error::policy_violation(format!(
            "certificate {} is not valid before {}",
            cert.tbs_certificate.subject, validity.not_before
        )));
    }
    if since_epoch > validity.not_after.to_unix_duration() {
        return Err(Error::policy_violation(format!(
            "certificate {} expired at {}",
            cert.tbs_certificate.subject, validity.not_after
        )));
    }
    Ok(())
}

fn check_signature(cert: &Certificate, issuer: &Certificate) -> Result<()> {
    let public_key = certificate_public_key(issuer)?;
    let tbs = cert
        .tbs_certificate
        .to_der()
        .map_err(|e| Error::crypto("encode certificate", e.to_string()))?;
    let signature = Signature::try_from(cert.signature.raw_bytes())
        .map_err(|e| Error::policy_violation(format!("malformed certificate signature: {e}")))?;

    let algorithm = cert.signature_algorithm.oid;
    let verified = if algorithm == SHA256_WITH_RSA {
        VerifyingKey::<Sha256>::new(public_key).verify(&tbs, &signature)
    } else if algorithm == SHA1_WITH_RSA {
        VerifyingKey::<Sha1>::new(public_key).verify(&tbs, &signature)
    } else {
        return Err(Error::policy_violation(format!(
            "unsupported certificate signature algorithm {algorithm}"
        )));
    };

    verified.map_err(|_| {
        Error::policy_violation(format!(
            "signature on certificate {} does not verify against {}",
            cert.tbs_certificate.subject, issuer.tbs_certificate.subject
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;
    use std::str::FromStr;
    use std::time::Duration;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn subject() -> Name {
        Name::from_str(testutil::SUBJECT).unwrap()
    }

    #[test]
    fn test_single_self_signed_certificate_passes() {
        let cert = testutil::issue_certificate(testutil::test_key(), testutil::SUBJECT);
        let policy = SigningPolicy::new();

        policy
            .verify(std::slice::from_ref(&cert), None, SystemTime::now(), &subject())
            .unwrap();
        let public_key = testutil::test_key().to_public_key();
        policy
            .verify(&[cert], Some(&public_key), SystemTime::now(), &subject())
            .unwrap();
    }

    #[test]
    fn test_empty_chain() {
        let err = SigningPolicy::new()
            .verify(&[], None, SystemTime::now(), &subject())
            .unwrap_err();
        assert!(err.is_policy_violation());
    }

    #[test]
    fn test_outside_validity_window() {
        let cert = testutil::issue_certificate(testutil::test_key(), testutil::SUBJECT);
        let policy = SigningPolicy::new();
        let chain = [cert];

        let later = SystemTime::now() + DAY * 400;
        assert!(policy
            .verify(&chain, None, later, &subject())
            .unwrap_err()
            .is_policy_violation());

        let earlier = SystemTime::now() - DAY;
        assert!(policy
            .verify(&chain, None, earlier, &subject())
            .unwrap_err()
            .is_policy_violation());
    }

    #[test]
    fn test_validity_window_is_inclusive() {
        let cert = testutil::issue_certificate(testutil::test_key(), testutil::SUBJECT);
        let validity = &cert.tbs_certificate.validity;
        let not_before = UNIX_EPOCH + validity.not_before.to_unix_duration();
        let not_after = UNIX_EPOCH + validity.not_after.to_unix_duration();
        let second = Duration::from_secs(1);
        let chain = [cert];
        let policy = SigningPolicy::new();

        policy.verify(&chain, None, not_before, &subject()).unwrap();
        policy.verify(&chain, None, not_after, &subject()).unwrap();
        assert!(policy
            .verify(&chain, None, not_before - second, &subject())
            .is_err());
        assert!(policy
            .verify(&chain, None, not_after + second, &subject())
            .is_err());
    }

    #[test]
    fn test_subject_mismatch() {
        let cert = testutil::issue_certificate(testutil::test_key(), testutil::SUBJECT);
        let other = Name::from_str("CN=someone-else").unwrap();
        let err = SigningPolicy::new()
            .verify(&[cert], None, SystemTime::now(), &other)
            .unwrap_err();
        assert!(err.is_policy_violation(), "{err}");
    }

    #[test]
    fn test_key_mismatch() {
        let cert = testutil::issue_certificate(testutil::test_key(), testutil::SUBJECT);
        let wrong = testutil::other_key().to_public_key();
        let err = SigningPolicy::new()
            .verify(&[cert], Some(&wrong), SystemTime::now(), &subject())
            .unwrap_err();
        assert!(err.is_policy_violation(), "{err}");
    }

    #[test]
    fn test_unlinked_chain() {
        let leaf = testutil::issue_certificate(testutil::test_key(), testutil::SUBJECT);
        let unrelated = testutil::issue_certificate(testutil::other_key(), "CN=unrelated");
        let err = SigningPolicy::new()
            .verify(&[leaf, unrelated], None, SystemTime::now(), &subject())
            .unwrap_err();
        assert!(err.is_policy_violation(), "{err}");
    }

    #[test]
    fn test_tampered_certificate() {
        let mut cert = testutil::issue_certificate(testutil::test_key(), testutil::SUBJECT);
        cert.tbs_certificate.subject = Name::from_str("CN=forged").unwrap();
        cert.tbs_certificate.issuer = cert.tbs_certificate.subject.clone();
        let err = SigningPolicy::new()
            .verify(
                &[cert],
                None,
                SystemTime::now(),
                &Name::from_str("CN=forged").unwrap(),
            )
            .unwrap_err();
        assert!(err.to_string().contains("does not verify"), "{err}");
    }
}

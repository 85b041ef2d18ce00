//! Loading of the client's mutual-TLS identity from a PKCS#12 bundle.

use crate::error::Error;
use chrono::{DateTime, TimeZone, Utc};
use openssl::{asn1::Asn1Time, pkcs12::Pkcs12};
use std::path::Path;

/// The client's mutual-TLS identity: the private key and certificate decoded
/// from a PKCS#12 bundle, ready to be attached to a [`reqwest::Client`].
///
/// The material is kept in memory only and is read-only after construction;
/// it is released when the identity (and the clients built from it) are
/// dropped.
#[derive(Debug, Clone)]
pub struct TlsIdentity {
    identity: reqwest::Identity,
    not_after: DateTime<Utc>,
}

/// Outcome of a non-fatal certificate expiry check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CertificateStatus {
    /// The certificate expires within the warning threshold.
    pub expiring_soon: bool,
    /// Whole days until `not_after`.
    pub days_remaining: i64,
}

impl TlsIdentity {
    /// Reads a PKCS#12 bundle from disk and decodes it.
    ///
    /// Fails with [`Error::CertificateNotFound`] if the file cannot be read
    /// and with [`Error::CertificateDecode`] if the password is wrong or the
    /// container is malformed.
    pub fn from_pkcs12_file(path: impl AsRef<Path>, password: &str) -> Result<Self, Error> {
        let path = path.as_ref();
        let der = std::fs::read(path)
            .map_err(|_| Error::CertificateNotFound(path.to_path_buf()))?;
        Self::from_pkcs12_der(&der, password)
    }

    /// Decodes a PKCS#12 bundle already held in memory.
    pub fn from_pkcs12_der(der: &[u8], password: &str) -> Result<Self, Error> {
        let parsed = Pkcs12::from_der(der)?.parse2(password)?;
        let certificate = parsed.cert.ok_or_else(|| {
            Error::Other(anyhow::anyhow!("PKCS#12 bundle contains no certificate"))
        })?;
        if parsed.pkey.is_none() {
            return Err(Error::Other(anyhow::anyhow!(
                "PKCS#12 bundle contains no private key"
            )));
        }

        let not_after = asn1_to_datetime(certificate.not_after())?;
        let identity = reqwest::Identity::from_pkcs12_der(der, password)
            .map_err(|e| Error::Other(anyhow::Error::new(e).context("building TLS identity")))?;

        Ok(Self {
            identity,
            not_after,
        })
    }

    /// Checks the certificate's `not_after` against the current time.
    ///
    /// An already-expired certificate is a fatal [`Error::CertificateExpired`];
    /// one expiring within `warn_threshold_days` is reported as a non-fatal
    /// [`CertificateStatus`] the caller should surface.
    pub fn check_expiry(&self, warn_threshold_days: i64) -> Result<CertificateStatus, Error> {
        let now = Utc::now();
        if self.not_after <= now {
            return Err(Error::CertificateExpired {
                expired_at: self.not_after,
            });
        }

        let days_remaining = (self.not_after - now).num_days();
        Ok(CertificateStatus {
            expiring_soon: days_remaining <= warn_threshold_days,
            days_remaining,
        })
    }

    /// Expiration instant of the client certificate.
    pub fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    pub(crate) fn identity(&self) -> reqwest::Identity {
        self.identity.clone()
    }
}

fn asn1_to_datetime(time: &openssl::asn1::Asn1TimeRef) -> Result<DateTime<Utc>, Error> {
    // ASN.1 times only expose a diff; measure from the Unix epoch.
    let epoch = Asn1Time::from_unix(0)?;
    let diff = epoch.diff(time)?;
    let timestamp = i64::from(diff.days) * 86_400 + i64::from(diff.secs);
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .ok_or_else(|| Error::Other(anyhow::anyhow!("certificate expiry out of range")))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Duration;
    use openssl::{
        hash::MessageDigest,
        pkey::PKey,
        rsa::Rsa,
        x509::{X509Name, X509},
    };

    /// Builds a password-protected PKCS#12 bundle for a self-signed
    /// certificate valid in the given unix-timestamp window.
    pub(crate) fn pkcs12_bundle(
        not_before: i64,
        not_after: i64,
        password: &str,
    ) -> Vec<u8> {
        let rsa = Rsa::generate(2048).unwrap();
        let pkey = PKey::from_rsa(rsa).unwrap();

        let mut name = X509Name::builder().unwrap();
        name.append_entry_by_text("CN", "inter-rust test").unwrap();
        let name = name.build();

        let mut builder = X509::builder().unwrap();
        builder.set_version(2).unwrap();
        builder.set_subject_name(&name).unwrap();
        builder.set_issuer_name(&name).unwrap();
        builder.set_pubkey(&pkey).unwrap();
        builder
            .set_not_before(&Asn1Time::from_unix(not_before).unwrap())
            .unwrap();
        builder
            .set_not_after(&Asn1Time::from_unix(not_after).unwrap())
            .unwrap();
        builder.sign(&pkey, MessageDigest::sha256()).unwrap();
        let cert = builder.build();

        Pkcs12::builder()
            .name("inter-rust test")
            .pkey(&pkey)
            .cert(&cert)
            .build2(password)
            .unwrap()
            .to_der()
            .unwrap()
    }

    fn days_from_now(days: i64) -> i64 {
        Utc::now().timestamp() + days * 86_400
    }

    #[test]
    fn loads_a_valid_bundle_and_reports_days_remaining() {
        let der = pkcs12_bundle(days_from_now(-1), days_from_now(90), "secret");
        let identity = TlsIdentity::from_pkcs12_der(&der, "secret").unwrap();

        let status = identity.check_expiry(30).unwrap();
        assert!(!status.expiring_soon);
        // 90 days minus the instants spent in the test.
        assert!((89..=90).contains(&status.days_remaining));
    }

    #[test]
    fn warns_when_certificate_expires_within_threshold() {
        let der = pkcs12_bundle(days_from_now(-1), days_from_now(10), "secret");
        let identity = TlsIdentity::from_pkcs12_der(&der, "secret").unwrap();

        let status = identity.check_expiry(30).unwrap();
        assert!(status.expiring_soon);
        assert!((9..=10).contains(&status.days_remaining));
    }

    #[test]
    fn expired_certificate_is_fatal() {
        let der = pkcs12_bundle(days_from_now(-10), days_from_now(-1), "secret");
        let identity = TlsIdentity::from_pkcs12_der(&der, "secret").unwrap();

        let err = identity.check_expiry(30).unwrap_err();
        let expected = Utc::now() - Duration::days(1);
        match err {
            Error::CertificateExpired { expired_at } => {
                assert!((expired_at - expected).num_seconds().abs() < 5);
            }
            e => panic!("unexpected error: {}", e),
        }
    }

    #[test]
    fn wrong_password_is_a_decode_error() {
        let der = pkcs12_bundle(days_from_now(-1), days_from_now(90), "secret");
        let err = TlsIdentity::from_pkcs12_der(&der, "wrong").unwrap_err();
        assert!(matches!(err, Error::CertificateDecode(_)));
    }

    #[test]
    fn missing_file_is_reported_as_not_found() {
        let err =
            TlsIdentity::from_pkcs12_file("/definitely/not/here.pfx", "secret").unwrap_err();
        assert!(matches!(err, Error::CertificateNotFound(_)));
    }
}

//! Analysis data types: per-certificate facts, cross-signing records,
//! candidate chain paths and the analysis record that owns them.

use serde::Serialize;
use std::collections::BTreeMap;

/// Immutable snapshot of one input certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateFact {
    /// Position in the input sequence (0 = first certificate supplied).
    pub index: usize,
    /// Subject distinguished name (one-line form).
    pub subject: String,
    /// Issuer distinguished name (one-line form).
    pub issuer: String,
    /// Serial number as a colon-separated hex string.
    pub serial: String,
    /// Validity start date.
    pub not_before: DateTime,
    /// Validity end date.
    pub not_after: DateTime,
    /// Whether the analysis time is past `not_after`.
    pub is_expired: bool,
    /// CA flag from the Basic Constraints extension.
    pub is_ca: bool,
    /// Active Key Usage flags, in canonical bit order.
    pub key_usage: Vec<String>,
    /// Extended Key Usage purposes, in encoded order.
    pub ext_key_usage: Vec<String>,
    /// DNS names from the Subject Alternative Name extension.
    pub dns_names: Vec<String>,
    /// Signature algorithm name.
    pub signature_algorithm: String,
    /// Public key algorithm name: "RSA", "EC", "Ed25519", etc.
    pub public_key_algorithm: String,
    /// Public key size in bits, 0 when it cannot be determined.
    pub public_key_size: u32,
    /// X.509v3 extensions in certificate order.
    pub extensions: Vec<ExtensionFact>,
    /// SHA-256 fingerprint of the certificate DER.
    pub fingerprint: String,

    /// Raw SubjectPublicKeyInfo bytes, only compared for equality.
    #[serde(skip)]
    pub public_key_der: Vec<u8>,
}

/// An extension as reported in a [`CertificateFact`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionFact {
    /// OID as a dotted-decimal string.
    pub oid: String,
    /// Human-readable name, or "Unknown Extension".
    pub name: String,
    /// Whether this extension is marked critical.
    pub critical: bool,
    /// Lowercase hex of the raw extension value.
    pub value: String,
}

/// Date-time representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateTime {
    /// ISO 8601 formatted string.
    pub iso8601: String,
    /// Unix timestamp.
    pub timestamp: i64,
}

impl DateTime {
    /// Build from a Unix timestamp.
    pub fn from_timestamp(ts: i64) -> Self {
        let iso8601 = match ::time::OffsetDateTime::from_unix_timestamp(ts) {
            Ok(dt) => format!(
                "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
                dt.year(),
                u8::from(dt.month()),
                dt.day(),
                dt.hour(),
                dt.minute(),
                dt.second()
            ),
            Err(_) => format!("{}", ts),
        };
        DateTime {
            iso8601,
            timestamp: ts,
        }
    }
}

impl std::fmt::Display for DateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.iso8601)
    }
}

/// A certificate that shares subject and public key with another
/// certificate in the input but was issued by a different authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossSignedCert {
    /// Position of the certificate in the input sequence.
    pub index: usize,
    pub subject: String,
    pub issuer: String,
    pub serial: String,
    #[serde(skip)]
    pub public_key_der: Vec<u8>,
}

/// Cross-signing groups keyed by subject name.
///
/// Only subjects with two or more members are present. Iteration is sorted
/// by subject; members keep detection order.
pub type CrossSigning = BTreeMap<String, Vec<CrossSignedCert>>;

/// One candidate validation path, leaf toward root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainPath {
    pub path: Vec<CertificateFact>,
    pub is_complete: bool,
    pub description: String,
}

/// The single output record of one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainAnalysis {
    /// Per-certificate facts, index-aligned with the input.
    pub certificates: Vec<CertificateFact>,
    /// `true` iff `errors` is empty.
    pub is_valid: bool,
    /// Human-readable validation errors.
    pub errors: Vec<String>,
    pub cross_signing: CrossSigning,
    pub chain_paths: Vec<ChainPath>,
    /// Unix timestamp the run was evaluated at.
    pub analyzed_at: i64,
}

impl ChainAnalysis {
    /// The first certificate of the input, conventionally the end entity.
    pub fn leaf(&self) -> Option<&CertificateFact> {
        self.certificates.first()
    }

    /// Whether any cross-signed subject was detected.
    pub fn has_cross_signing(&self) -> bool {
        !self.cross_signing.is_empty()
    }
}

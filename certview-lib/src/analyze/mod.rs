//! Certificate chain analysis engine.
//!
//! Turns an ordered list of parsed certificates (conventionally leaf first)
//! into a [`ChainAnalysis`]: per-certificate facts, validation errors,
//! cross-signing groups and candidate validation paths.
//!
//! The engine is a pure computation over in-memory certificates. It never
//! fails: expired or unlinked certificates are reported as errors inside the
//! record, and undecodable fields degrade to fallback values. Malformed
//! bytes are rejected earlier, by the loader.

mod cross_sign;
pub(crate) mod helpers;
mod paths;
mod validate;

pub use cross_sign::detect_cross_signing;
pub use paths::{build_paths, PRIMARY_CHAIN};
pub use validate::validate_chain;

use crate::extract::extract_fact;
use crate::fields::ChainAnalysis;
use crate::CertviewError;
use helpers::{dn_oneline, format_serial};
use std::time::{SystemTime, UNIX_EPOCH};
use x509_parser::prelude::*;

/// What the chain checks need to know about a certificate.
///
/// Implemented for [`ParsedCertificate`]; any other certificate
/// representation can implement it to be validated and cross-sign checked.
pub trait ChainCertificate {
    /// Subject distinguished name in one-line form.
    fn subject_name(&self) -> String;
    /// Issuer distinguished name in one-line form.
    fn issuer_name(&self) -> String;
    /// Serial number as colon-separated hex.
    fn serial(&self) -> String;
    /// Start of the validity window (Unix timestamp).
    fn not_before(&self) -> i64;
    /// End of the validity window (Unix timestamp).
    fn not_after(&self) -> i64;
    /// Raw encoded SubjectPublicKeyInfo.
    fn public_key_der(&self) -> &[u8];
    /// Check that `self` was signed by `issuer`'s key, returning the failure
    /// reason otherwise.
    fn verified_by(&self, issuer: &Self) -> Result<(), String>;
}

/// A parsed certificate together with the DER bytes it was parsed from.
#[derive(Debug)]
pub struct ParsedCertificate<'a> {
    pub der: &'a [u8],
    pub x509: X509Certificate<'a>,
}

impl<'a> ParsedCertificate<'a> {
    /// Parse one DER-encoded certificate.
    pub fn from_der(der: &'a [u8]) -> Result<Self, CertviewError> {
        let (remaining, x509) =
            X509Certificate::from_der(der).map_err(|e| CertviewError::DerError(format!("{}", e)))?;
        let cert_len = der.len() - remaining.len();
        Ok(ParsedCertificate {
            der: der.get(..cert_len).unwrap_or(der),
            x509,
        })
    }
}

impl ChainCertificate for ParsedCertificate<'_> {
    fn subject_name(&self) -> String {
        dn_oneline(self.x509.subject())
    }

    fn issuer_name(&self) -> String {
        dn_oneline(self.x509.issuer())
    }

    fn serial(&self) -> String {
        format_serial(self.x509.raw_serial())
    }

    fn not_before(&self) -> i64 {
        self.x509.validity().not_before.timestamp()
    }

    fn not_after(&self) -> i64 {
        self.x509.validity().not_after.timestamp()
    }

    fn public_key_der(&self) -> &[u8] {
        self.x509.public_key().raw
    }

    fn verified_by(&self, issuer: &Self) -> Result<(), String> {
        self.x509
            .verify_signature(Some(issuer.x509.public_key()))
            .map_err(|e| e.to_string())
    }
}

/// Options controlling an analysis run.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzeOptions {
    /// Evaluate validity at a specific Unix timestamp instead of the
    /// current time. Matches OpenSSL's `-attime` flag.
    pub at_time: Option<i64>,
}

impl AnalyzeOptions {
    /// Pin the analysis to a fixed instant.
    pub fn at(timestamp: i64) -> Self {
        AnalyzeOptions {
            at_time: Some(timestamp),
        }
    }

    fn now(&self) -> i64 {
        self.at_time.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs() as i64
        })
    }
}

/// Analyze a chain at the current wall-clock time.
pub fn analyze_chain(certs: &[ParsedCertificate<'_>]) -> ChainAnalysis {
    analyze_chain_with_options(certs, &AnalyzeOptions::default())
}

/// Analyze a chain with configurable options.
///
/// Facts are extracted per certificate, validation and cross-sign detection
/// run over the whole sequence, and paths are built from the combined
/// results. The same `options.at_time` and input always yield the same
/// record.
pub fn analyze_chain_with_options(
    certs: &[ParsedCertificate<'_>],
    options: &AnalyzeOptions,
) -> ChainAnalysis {
    let now_ts = options.now();

    if certs.is_empty() {
        tracing::warn!("analysis requested for an empty certificate chain");
    }

    let certificates: Vec<_> = certs
        .iter()
        .enumerate()
        .map(|(i, cert)| extract_fact(i, cert, now_ts))
        .collect();
    let (is_valid, errors) = validate_chain(certs, now_ts);
    let cross_signing = detect_cross_signing(certs);
    let chain_paths = build_paths(&certificates, is_valid, &cross_signing);

    tracing::debug!(
        certificates = certificates.len(),
        errors = errors.len(),
        cross_signed_subjects = cross_signing.len(),
        paths = chain_paths.len(),
        at = now_ts,
        "chain analyzed"
    );

    ChainAnalysis {
        certificates,
        is_valid,
        errors,
        cross_signing,
        chain_paths,
        analyzed_at: now_ts,
    }
}

/// Convenience function: load a PEM bundle (or a single DER certificate),
/// parse it and analyze it.
pub fn analyze_pem_chain(
    input: &[u8],
    options: &AnalyzeOptions,
) -> Result<ChainAnalysis, CertviewError> {
    let chain_der = crate::parser::load_chain(input)?;
    let parsed = crate::parser::parse_chain(&chain_der)?;
    Ok(analyze_chain_with_options(&parsed, options))
}

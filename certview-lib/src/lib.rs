//! certview-lib: Library for analyzing X.509 certificate chains.
//!
//! Given an ordered certificate chain (leaf first), produces a structured
//! analysis: per-certificate facts, chain validity, detection of
//! cross-signed certificates (same subject and key, different issuers) and
//! candidate validation paths. Also loads chains from PEM or DER bytes and
//! renders analyses as text or JSON.

pub mod analyze;
mod display;
mod extract;
mod fields;
mod fingerprint;
pub mod oid;
mod parser;
mod util;

pub use analyze::{
    analyze_chain, analyze_chain_with_options, analyze_pem_chain, build_paths,
    detect_cross_signing, validate_chain, AnalyzeOptions, ChainCertificate, ParsedCertificate,
    PRIMARY_CHAIN,
};
pub use display::{display_text, summary_line, to_json};
pub use extract::{extension_name, ext_key_usage_name, extract_fact};
pub use fields::{
    CertificateFact, ChainAnalysis, ChainPath, CrossSignedCert, CrossSigning, DateTime,
    ExtensionFact,
};
pub use fingerprint::sha256_fingerprint;
pub use parser::{load_chain, load_der, parse_chain, parse_pem_chain};
pub use util::is_pem;

/// Errors returned by certview-lib.
///
/// Only loading and rendering fail; the analysis engine itself always
/// produces a record.
#[derive(Debug, thiserror::Error)]
pub enum CertviewError {
    #[error("Failed to parse certificate: {0}")]
    ParseError(String),

    #[error("Invalid PEM format: {0}")]
    PemError(String),

    #[error("Invalid DER format: {0}")]
    DerError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

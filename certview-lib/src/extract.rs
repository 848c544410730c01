//! Certificate fact extraction.
//!
//! Turns one parsed certificate into an immutable [`CertificateFact`].
//! Extraction is total: anything that cannot be decoded degrades to a
//! fallback label, an empty list or a zero key size.

use crate::analyze::helpers::{dn_oneline, extract_san_dns_names, format_serial};
use crate::analyze::ParsedCertificate;
use crate::fields::{CertificateFact, DateTime, ExtensionFact};
use crate::fingerprint::sha256_fingerprint;
use crate::oid;
use x509_parser::prelude::*;

/// Key Usage bits in canonical order (RFC 5280 Section 4.2.1.3).
const KEY_USAGE_NAMES: [(&str, fn(&KeyUsage) -> bool); 9] = [
    ("Digital Signature", KeyUsage::digital_signature),
    ("Content Commitment", KeyUsage::non_repudiation),
    ("Key Encipherment", KeyUsage::key_encipherment),
    ("Data Encipherment", KeyUsage::data_encipherment),
    ("Key Agreement", KeyUsage::key_agreement),
    ("Certificate Sign", KeyUsage::key_cert_sign),
    ("CRL Sign", KeyUsage::crl_sign),
    ("Encipher Only", KeyUsage::encipher_only),
    ("Decipher Only", KeyUsage::decipher_only),
];

/// Extended Key Usage purposes with a display name.
const EXT_KEY_USAGE_NAMES: [(&str, &str); 6] = [
    (oid::EKU_SERVER_AUTH, "Server Authentication"),
    (oid::EKU_CLIENT_AUTH, "Client Authentication"),
    (oid::EKU_CODE_SIGNING, "Code Signing"),
    (oid::EKU_EMAIL_PROTECTION, "Email Protection"),
    (oid::EKU_TIME_STAMPING, "Time Stamping"),
    (oid::EKU_OCSP_SIGNING, "OCSP Signing"),
];

/// Extensions with a display name; everything else is "Unknown Extension".
const EXTENSION_NAMES: [(&str, &str); 9] = [
    (oid::EXT_SUBJECT_KEY_ID, "Subject Key Identifier"),
    (oid::EXT_KEY_USAGE, "Key Usage"),
    (oid::EXT_SUBJECT_ALT_NAME, "Subject Alternative Name"),
    (oid::EXT_BASIC_CONSTRAINTS, "Basic Constraints"),
    (oid::EXT_CRL_DISTRIBUTION_POINTS, "CRL Distribution Points"),
    (oid::EXT_CERTIFICATE_POLICIES, "Certificate Policies"),
    (oid::EXT_AUTHORITY_KEY_ID, "Authority Key Identifier"),
    (oid::EXT_EXTENDED_KEY_USAGE, "Extended Key Usage"),
    (oid::EXT_AUTHORITY_INFO_ACCESS, "Authority Information Access"),
];

pub(crate) const UNKNOWN_EXTENSION: &str = "Unknown Extension";

/// Extract the facts of the certificate at `index`, evaluated at `now_ts`.
pub fn extract_fact(index: usize, cert: &ParsedCertificate<'_>, now_ts: i64) -> CertificateFact {
    let x509 = &cert.x509;
    let spki = x509.public_key();
    let not_before = x509.validity().not_before.timestamp();
    let not_after = x509.validity().not_after.timestamp();

    CertificateFact {
        index,
        subject: dn_oneline(x509.subject()),
        issuer: dn_oneline(x509.issuer()),
        serial: format_serial(x509.raw_serial()),
        not_before: DateTime::from_timestamp(not_before),
        not_after: DateTime::from_timestamp(not_after),
        is_expired: now_ts > not_after,
        is_ca: is_ca(x509),
        key_usage: key_usage_names(x509),
        ext_key_usage: ext_key_usage_names(x509),
        dns_names: extract_san_dns_names(x509),
        signature_algorithm: signature_algorithm_name(&x509.signature_algorithm),
        public_key_algorithm: public_key_algorithm_name(spki),
        public_key_size: public_key_size(spki),
        extensions: x509.extensions().iter().map(extension_fact).collect(),
        fingerprint: sha256_fingerprint(cert.der),
        public_key_der: spki.raw.to_vec(),
    }
}

fn is_ca(x509: &X509Certificate<'_>) -> bool {
    x509.basic_constraints()
        .ok()
        .flatten()
        .map(|bc| bc.value.ca)
        .unwrap_or(false)
}

fn key_usage_names(x509: &X509Certificate<'_>) -> Vec<String> {
    match x509.key_usage() {
        Ok(Some(ku)) => KEY_USAGE_NAMES
            .iter()
            .filter(|(_, is_set)| is_set(ku.value))
            .map(|(name, _)| name.to_string())
            .collect(),
        _ => Vec::new(),
    }
}

/// Read the EKU extension's OIDs directly so certificate order is kept.
fn ext_key_usage_names(x509: &X509Certificate<'_>) -> Vec<String> {
    let Some(ext) = x509
        .extensions()
        .iter()
        .find(|e| e.oid.to_id_string() == oid::EXT_EXTENDED_KEY_USAGE)
    else {
        return Vec::new();
    };
    let Ok((_, parsed)) = x509_parser::der_parser::parse_der(ext.value) else {
        return Vec::new();
    };
    let Ok(items) = parsed.as_sequence() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| item.as_oid().ok())
        .map(|usage| ext_key_usage_name(&usage.to_id_string()))
        .collect()
}

/// Map an EKU OID to its display name, or `"Unknown (<oid>)"`.
pub fn ext_key_usage_name(oid_str: &str) -> String {
    EXT_KEY_USAGE_NAMES
        .iter()
        .find(|(known, _)| *known == oid_str)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| format!("Unknown ({})", oid_str))
}

/// Map an extension OID to its display name, or "Unknown Extension".
pub fn extension_name(oid_str: &str) -> &'static str {
    EXTENSION_NAMES
        .iter()
        .find(|(known, _)| *known == oid_str)
        .map(|(_, name)| *name)
        .unwrap_or(UNKNOWN_EXTENSION)
}

fn extension_fact(ext: &X509Extension<'_>) -> ExtensionFact {
    let oid = ext.oid.to_id_string();
    ExtensionFact {
        name: extension_name(&oid).to_string(),
        oid,
        critical: ext.critical,
        value: hex::encode(ext.value),
    }
}

fn signature_algorithm_name(algo: &AlgorithmIdentifier<'_>) -> String {
    match algo.algorithm.to_id_string().as_str() {
        oid::SHA1_WITH_RSA => "sha1WithRSAEncryption".into(),
        oid::SHA256_WITH_RSA => "sha256WithRSAEncryption".into(),
        oid::SHA384_WITH_RSA => "sha384WithRSAEncryption".into(),
        oid::SHA512_WITH_RSA => "sha512WithRSAEncryption".into(),
        oid::RSASSA_PSS => "rsassaPss".into(),
        oid::ECDSA_WITH_SHA256 => "ecdsa-with-SHA256".into(),
        oid::ECDSA_WITH_SHA384 => "ecdsa-with-SHA384".into(),
        oid::ECDSA_WITH_SHA512 => "ecdsa-with-SHA512".into(),
        oid::ED25519 => "Ed25519".into(),
        oid::ED448 => "Ed448".into(),
        other => other.to_string(),
    }
}

fn public_key_algorithm_name(spki: &SubjectPublicKeyInfo<'_>) -> String {
    match spki.algorithm.algorithm.to_id_string().as_str() {
        oid::RSA_ENCRYPTION => "RSA".into(),
        oid::EC_PUBLIC_KEY => "EC".into(),
        oid::ED25519 => "Ed25519".into(),
        oid::ED448 => "Ed448".into(),
        other => other.to_string(),
    }
}

/// Key size in bits: the key's byte length times eight.
///
/// Only RSA keys expose a byte length (of the modulus); every other key
/// type reports 0.
fn public_key_size(spki: &SubjectPublicKeyInfo<'_>) -> u32 {
    match spki.parsed() {
        Ok(x509_parser::public_key::PublicKey::RSA(rsa)) => rsa_modulus_bits(rsa.modulus),
        _ => 0,
    }
}

/// Modulus length in whole bytes, times eight. The DER integer may carry a
/// leading zero byte for sign; it is not part of the modulus.
fn rsa_modulus_bits(modulus: &[u8]) -> u32 {
    let significant = modulus.iter().skip_while(|b| **b == 0).count();
    u32::try_from(significant * 8).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extension_names() {
        assert_eq!(extension_name("2.5.29.19"), "Basic Constraints");
        assert_eq!(
            extension_name("1.3.6.1.5.5.7.1.1"),
            "Authority Information Access"
        );
    }

    #[test]
    fn unlisted_extensions_are_unknown() {
        // Name Constraints is valid PKIX but not in the display table.
        assert_eq!(extension_name("2.5.29.30"), UNKNOWN_EXTENSION);
        assert_eq!(extension_name("1.3.6.1.4.1.11129.2.4.2"), UNKNOWN_EXTENSION);
    }

    #[test]
    fn known_ext_key_usage_names() {
        assert_eq!(
            ext_key_usage_name(oid::EKU_SERVER_AUTH),
            "Server Authentication"
        );
        assert_eq!(ext_key_usage_name(oid::EKU_OCSP_SIGNING), "OCSP Signing");
    }

    #[test]
    fn unknown_ext_key_usage_keeps_oid() {
        assert_eq!(ext_key_usage_name("2.5.29.37.0"), "Unknown (2.5.29.37.0)");
    }

    #[test]
    fn rsa_size_ignores_sign_byte() {
        let mut modulus = vec![0x00, 0xc5];
        modulus.extend(std::iter::repeat(0x11).take(255));
        assert_eq!(rsa_modulus_bits(&modulus), 2048);
        assert_eq!(rsa_modulus_bits(&[0x00]), 0);
        assert_eq!(rsa_modulus_bits(&[]), 0);
    }

    #[test]
    fn key_usage_table_is_in_bit_order() {
        let names: Vec<&str> = KEY_USAGE_NAMES.iter().map(|(n, _)| *n).collect();
        assert_eq!(names.first(), Some(&"Digital Signature"));
        assert_eq!(names.get(5), Some(&"Certificate Sign"));
        assert_eq!(names.last(), Some(&"Decipher Only"));
    }
}

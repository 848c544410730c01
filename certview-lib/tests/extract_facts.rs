#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::indexing_slicing
)]
//! Per-certificate fact extraction over generated certificates.

mod common;

use certview_lib::*;
use common::*;

fn facts(ders: &[Vec<u8>]) -> Vec<CertificateFact> {
    let parsed = parse_chain(ders).unwrap();
    analyze_chain_with_options(&parsed, &AnalyzeOptions::at(NOW)).certificates
}

#[test]
fn leaf_facts() {
    let ca = root("Example Root");
    let server = leaf("example.com", &ca);
    let der = server.der();
    let fact = &facts(&[der.clone(), ca.der()])[0];

    assert_eq!(fact.index, 0);
    assert_eq!(fact.subject, "CN = example.com");
    assert_eq!(fact.issuer, "CN = Example Root");
    assert!(!fact.is_ca);
    assert!(!fact.is_expired);
    assert_eq!(fact.key_usage, vec!["Digital Signature", "Key Encipherment"]);
    assert_eq!(fact.dns_names, vec!["example.com", "www.example.com"]);
    assert_eq!(fact.signature_algorithm, "ecdsa-with-SHA256");
    assert_eq!(fact.public_key_algorithm, "EC");
    // EC keys expose no byte length.
    assert_eq!(fact.public_key_size, 0);
    assert_eq!(fact.fingerprint, sha256_fingerprint(&der));
    assert_eq!(fact.not_before.iso8601, "2020-01-01T00:00:00Z");
    assert_eq!(fact.not_after.iso8601, "2040-01-01T00:00:00Z");
}

#[test]
fn ext_key_usage_keeps_certificate_order() {
    let ca = root("Example Root");
    let server = leaf("example.com", &ca);
    let fact = &facts(&[server.der()])[0];
    // The fixture lists clientAuth before serverAuth.
    assert_eq!(
        fact.ext_key_usage,
        vec!["Client Authentication", "Server Authentication"]
    );
}

#[test]
fn root_facts() {
    let ca = root("Example Root");
    let fact = &facts(&[ca.der()])[0];
    assert!(fact.is_ca);
    assert_eq!(fact.subject, fact.issuer);
    assert_eq!(fact.key_usage, vec!["Certificate Sign", "CRL Sign"]);
    assert!(fact.ext_key_usage.is_empty());
    assert!(fact.dns_names.is_empty());
}

#[test]
fn extensions_are_named_with_hex_values() {
    let ca = root("Example Root");
    let server = leaf("example.com", &ca);
    let fact = &facts(&[server.der()])[0];

    let names: Vec<&str> = fact.extensions.iter().map(|e| e.name.as_str()).collect();
    for expected in [
        "Subject Alternative Name",
        "Key Usage",
        "Extended Key Usage",
    ] {
        assert!(names.contains(&expected), "{} missing from {:?}", expected, names);
    }

    let ku = fact
        .extensions
        .iter()
        .find(|e| e.oid == "2.5.29.15")
        .unwrap();
    assert!(!ku.value.is_empty());
    assert!(ku.value.chars().all(|c| c.is_ascii_hexdigit()));

    let bc = facts(&[ca.der()])[0]
        .extensions
        .iter()
        .find(|e| e.oid == "2.5.29.19")
        .cloned()
        .unwrap();
    assert_eq!(bc.name, "Basic Constraints");
}

#[test]
fn name_lookups() {
    assert_eq!(extension_name("2.5.29.17"), "Subject Alternative Name");
    assert_eq!(extension_name("1.2.3.4"), "Unknown Extension");
    assert_eq!(ext_key_usage_name("1.3.6.1.5.5.7.3.1"), "Server Authentication");
    assert_eq!(ext_key_usage_name("2.5.29.37.0"), "Unknown (2.5.29.37.0)");
}

#[test]
fn unlisted_extension_and_usage_fall_back() {
    let cert = leaf_with_private_extensions("private.example");
    let fact = &facts(&[cert.der()])[0];

    assert_eq!(
        fact.ext_key_usage,
        vec![
            "Server Authentication",
            "Unknown (1.3.6.1.4.1.55555.2)",
        ]
    );

    let private = fact
        .extensions
        .iter()
        .find(|e| e.oid == "1.3.6.1.4.1.55555.1")
        .unwrap();
    assert_eq!(private.name, "Unknown Extension");
    assert!(!private.critical);
    assert_eq!(private.value, "0500");
}

#[test]
fn expired_fact_is_flagged() {
    let old = expired_self_signed("old.example");
    let fact = &facts(&[old.der()])[0];
    assert!(fact.is_expired);
    assert_eq!(fact.not_after.iso8601, "2021-01-01T00:00:00Z");
}

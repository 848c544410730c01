//! Certificate fixtures generated with rcgen.
//!
//! Every fixture is valid from 2020-01-01 to 2040-01-01 unless stated
//! otherwise; tests pin the analysis clock to [`NOW`].

#![allow(dead_code)]

use rcgen::{
    date_time_ymd, BasicConstraints, BmpString, Certificate, CertificateParams, CustomExtension,
    DistinguishedName, DnType, DnValue, ExtendedKeyUsagePurpose, IsCa, KeyPair, KeyUsagePurpose,
};

/// 2023-11-14T22:13:20Z.
pub const NOW: i64 = 1_700_000_000;

/// A generated certificate and the key that owns it.
pub struct Issued {
    pub cert: Certificate,
    pub key: KeyPair,
}

impl Issued {
    pub fn der(&self) -> Vec<u8> {
        self.cert.der().to_vec()
    }
}

fn params(common_name: &str, sans: &[&str]) -> CertificateParams {
    let sans: Vec<String> = sans.iter().map(|s| s.to_string()).collect();
    let mut params = CertificateParams::new(sans).unwrap();
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, common_name);
    params.distinguished_name = dn;
    params.not_before = date_time_ymd(2020, 1, 1);
    params.not_after = date_time_ymd(2040, 1, 1);
    params
}

fn ca_params(common_name: &str) -> CertificateParams {
    let mut params = params(common_name, &[]);
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.key_usages = vec![KeyUsagePurpose::KeyCertSign, KeyUsagePurpose::CrlSign];
    params
}

fn leaf_params(common_name: &str) -> CertificateParams {
    let mut params = params(common_name, &[common_name, &format!("www.{}", common_name)]);
    params.key_usages = vec![
        KeyUsagePurpose::DigitalSignature,
        KeyUsagePurpose::KeyEncipherment,
    ];
    params.extended_key_usages = vec![
        ExtendedKeyUsagePurpose::ClientAuth,
        ExtendedKeyUsagePurpose::ServerAuth,
    ];
    params
}

/// A fresh ECDSA P-256 key pair.
pub fn new_key() -> KeyPair {
    KeyPair::generate_for(&rcgen::PKCS_ECDSA_P256_SHA256).unwrap()
}

/// A self-signed root CA.
pub fn root(common_name: &str) -> Issued {
    let key = new_key();
    let cert = ca_params(common_name).self_signed(&key).unwrap();
    Issued { cert, key }
}

/// A self-signed root CA whose common name is a BMPString.
pub fn bmp_root(common_name: &str) -> Issued {
    let key = new_key();
    let mut params = ca_params(common_name);
    let mut dn = DistinguishedName::new();
    dn.push(
        DnType::CommonName,
        DnValue::BmpString(BmpString::try_from(common_name).unwrap()),
    );
    params.distinguished_name = dn;
    let cert = params.self_signed(&key).unwrap();
    Issued { cert, key }
}

/// An intermediate CA signed by `issuer`.
pub fn intermediate(common_name: &str, issuer: &Issued) -> Issued {
    let key = new_key();
    let cert = intermediate_with_key(common_name, &key, issuer);
    Issued { cert, key }
}

/// An intermediate CA certificate for an existing key. Calling this twice
/// with different issuers produces a cross-signed pair.
pub fn intermediate_with_key(common_name: &str, key: &KeyPair, issuer: &Issued) -> Certificate {
    ca_params(common_name)
        .signed_by(key, &issuer.cert, &issuer.key)
        .unwrap()
}

/// A server leaf certificate for `host` signed by `issuer`.
pub fn leaf(host: &str, issuer: &Issued) -> Issued {
    let key = new_key();
    let cert = leaf_params(host)
        .signed_by(&key, &issuer.cert, &issuer.key)
        .unwrap();
    Issued { cert, key }
}

/// A self-signed leaf carrying a private-arc extension and an EKU
/// purpose outside the named set.
pub fn leaf_with_private_extensions(host: &str) -> Issued {
    let key = new_key();
    let mut params = leaf_params(host);
    params.extended_key_usages = vec![
        ExtendedKeyUsagePurpose::ServerAuth,
        ExtendedKeyUsagePurpose::Other(PRIVATE_EKU.to_vec()),
    ];
    params.custom_extensions = vec![CustomExtension::from_oid_content(
        PRIVATE_EXTENSION,
        vec![0x05, 0x00],
    )];
    let cert = params.self_signed(&key).unwrap();
    Issued { cert, key }
}

/// Private-enterprise arc used by [`leaf_with_private_extensions`].
pub const PRIVATE_EXTENSION: &[u64] = &[1, 3, 6, 1, 4, 1, 55555, 1];
pub const PRIVATE_EKU: &[u64] = &[1, 3, 6, 1, 4, 1, 55555, 2];

/// A self-signed leaf that expired in 2021.
pub fn expired_self_signed(host: &str) -> Issued {
    let key = new_key();
    let mut params = leaf_params(host);
    params.not_before = date_time_ymd(2019, 1, 1);
    params.not_after = date_time_ymd(2021, 1, 1);
    let cert = params.self_signed(&key).unwrap();
    Issued { cert, key }
}

/// Concatenate the PEM encodings of `certs` in order.
pub fn pem_bundle(certs: &[&Certificate]) -> String {
    certs.iter().map(|c| c.pem()).collect()
}

//! Shared encoding utilities.

use crate::oid;

/// Format bytes as colon-separated uppercase hex (e.g., "AB:CD:EF").
pub fn hex_colon_upper(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(":")
}

/// Return `true` if the input looks like a PEM certificate bundle.
pub fn is_pem(input: &[u8]) -> bool {
    const MARKER: &[u8] = b"-----BEGIN CERTIFICATE-----";
    input.windows(MARKER.len()).any(|w| w == MARKER)
}

/// Map a distinguished-name attribute OID to its OpenSSL short name.
///
/// Unknown attribute types are returned as the dotted OID.
pub fn oid_short_name(oid_str: &str) -> String {
    match oid_str {
        oid::COMMON_NAME => "CN".into(),
        oid::SURNAME => "SN".into(),
        oid::SERIAL_NUMBER => "serialNumber".into(),
        oid::COUNTRY => "C".into(),
        oid::LOCALITY => "L".into(),
        oid::STATE_OR_PROVINCE => "ST".into(),
        oid::STREET_ADDRESS => "street".into(),
        oid::ORGANIZATION => "O".into(),
        oid::ORGANIZATIONAL_UNIT => "OU".into(),
        oid::TITLE => "title".into(),
        oid::POSTAL_CODE => "postalCode".into(),
        oid::GIVEN_NAME => "GN".into(),
        oid::EMAIL_ADDRESS => "emailAddress".into(),
        oid::DOMAIN_COMPONENT => "DC".into(),
        other => other.to_string(),
    }
}

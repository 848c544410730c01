//! Small helper functions shared by the extractor and the chain checks.

use crate::util;
use x509_parser::der_parser::asn1_rs::{Any, Tag};
use x509_parser::prelude::*;

/// Format a distinguished name as a one-line string matching OpenSSL's
/// default format, e.g. "C = US, O = Org, CN = example.com".
///
/// Values containing commas, equals signs, or backslashes are escaped
/// so that two different names never render to the same string. Values
/// that are not a decodable string render as `#` followed by the hex of
/// their DER encoding (RFC 4514), which keeps distinct values distinct.
pub(crate) fn dn_oneline(name: &X509Name<'_>) -> String {
    let mut result = String::new();
    for rdn in name.iter() {
        for attr in rdn.iter() {
            if !result.is_empty() {
                result.push_str(", ");
            }
            result.push_str(&util::oid_short_name(&attr.attr_type().to_id_string()));
            result.push_str(" = ");
            match attr_value_string(attr.attr_value()) {
                Some(text) => push_escaped(&mut result, &text),
                None => {
                    result.push('#');
                    result.push_str(&hex::encode(encode_der(attr.attr_value())));
                }
            }
        }
    }
    result
}

/// Decode a directory string value to text.
fn attr_value_string(value: &Any<'_>) -> Option<String> {
    match value.tag() {
        Tag::NumericString
        | Tag::PrintableString
        | Tag::Utf8String
        | Tag::Ia5String
        | Tag::VisibleString
        | Tag::T61String => std::str::from_utf8(value.data).ok().map(str::to_string),
        Tag::BmpString => decode_bmp(value.data),
        Tag::UniversalString => decode_universal(value.data),
        _ => None,
    }
}

/// UCS-2 / UTF-16 big-endian.
fn decode_bmp(data: &[u8]) -> Option<String> {
    if data.len() % 2 != 0 {
        return None;
    }
    let units = data
        .chunks_exact(2)
        .map(|pair| match pair {
            [hi, lo] => u16::from_be_bytes([*hi, *lo]),
            _ => 0,
        });
    char::decode_utf16(units).collect::<Result<String, _>>().ok()
}

/// UCS-4 / UTF-32 big-endian.
fn decode_universal(data: &[u8]) -> Option<String> {
    if data.len() % 4 != 0 {
        return None;
    }
    data.chunks_exact(4)
        .map(|quad| match quad {
            [a, b, c, d] => char::from_u32(u32::from_be_bytes([*a, *b, *c, *d])),
            _ => None,
        })
        .collect()
}

/// Re-encode a parsed value as DER: identifier octets, definite length,
/// contents.
fn encode_der(value: &Any<'_>) -> Vec<u8> {
    let header = &value.header;
    let mut out = Vec::with_capacity(value.data.len() + 8);

    let class_bits = (header.class() as u8) << 6;
    let constructed_bit = if header.is_constructed() { 0x20 } else { 0 };
    let tag = header.tag().0;
    if tag < 31 {
        out.push(class_bits | constructed_bit | tag as u8);
    } else {
        out.push(class_bits | constructed_bit | 0x1f);
        let mut groups = Vec::new();
        let mut rest = tag;
        loop {
            groups.push((rest & 0x7f) as u8);
            rest >>= 7;
            if rest == 0 {
                break;
            }
        }
        let last = groups.len() - 1;
        for (i, group) in groups.iter().rev().enumerate() {
            out.push(if i == last { *group } else { group | 0x80 });
        }
    }

    let len = value.data.len();
    if len < 0x80 {
        out.push(len as u8);
    } else {
        let bytes = len.to_be_bytes();
        let skip = bytes.iter().take_while(|b| **b == 0).count();
        let significant = bytes.get(skip..).unwrap_or(&[]);
        out.push(0x80 | significant.len() as u8);
        out.extend_from_slice(significant);
    }

    out.extend_from_slice(value.data);
    out
}

fn push_escaped(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            ',' => out.push_str("\\,"),
            '=' => out.push_str("\\="),
            _ => out.push(ch),
        }
    }
}

/// Format a serial number as a colon-separated uppercase hex string,
/// stripping leading zero bytes but keeping at least one byte.
pub(crate) fn format_serial(raw: &[u8]) -> String {
    let stripped = match raw.iter().position(|&b| b != 0) {
        Some(pos) => raw.get(pos..).unwrap_or(raw),
        None => raw.get(raw.len().saturating_sub(1)..).unwrap_or(raw),
    };
    util::hex_colon_upper(stripped)
}

/// Extract DNS names from the Subject Alternative Name extension.
pub(crate) fn extract_san_dns_names(cert: &X509Certificate<'_>) -> Vec<String> {
    let mut names = Vec::new();
    if let Ok(Some(san)) = cert.subject_alternative_name() {
        for gn in &san.value.general_names {
            if let GeneralName::DNSName(name) = gn {
                names.push(name.to_string());
            }
        }
    }
    names
}

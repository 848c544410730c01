//! Loading certificate chains from PEM and DER bytes.
//!
//! The analysis engine consumes already-parsed certificates; everything
//! that can fail on malformed bytes lives here.

use crate::analyze::ParsedCertificate;
use crate::util;
use crate::CertviewError;
use x509_parser::prelude::*;

/// Parse a PEM-encoded bundle containing one or more certificates into
/// individual DER-encoded certificates, in file order.
///
/// Blocks with other labels (keys, CRLs) are skipped.
pub fn parse_pem_chain(input: &[u8]) -> Result<Vec<Vec<u8>>, CertviewError> {
    let mut certs = Vec::new();

    for pem_result in Pem::iter_from_buffer(input) {
        match pem_result {
            Ok(pem) => {
                if pem.label == "CERTIFICATE" || pem.label == "TRUSTED CERTIFICATE" {
                    certs.push(pem.contents);
                }
            }
            Err(e) => {
                // If we already have some certs, stop at first error (trailing garbage)
                if !certs.is_empty() {
                    break;
                }
                return Err(CertviewError::PemError(format!("failed to parse PEM: {}", e)));
            }
        }
    }

    if certs.is_empty() {
        return Err(CertviewError::PemError(
            "no certificates found in PEM input".into(),
        ));
    }

    Ok(certs)
}

/// Load a chain from PEM or DER (auto-detected).
///
/// PEM input may carry a whole chain; DER input is a single certificate.
pub fn load_chain(input: &[u8]) -> Result<Vec<Vec<u8>>, CertviewError> {
    if input.is_empty() {
        return Err(CertviewError::ParseError("empty input".into()));
    }

    if util::is_pem(input) {
        parse_pem_chain(input)
    } else {
        load_der(input)
    }
}

/// Load a single DER certificate, dropping any trailing bytes.
pub fn load_der(input: &[u8]) -> Result<Vec<Vec<u8>>, CertviewError> {
    let (remaining, _) =
        X509Certificate::from_der(input).map_err(|e| CertviewError::DerError(format!("{}", e)))?;
    let cert_len = input.len() - remaining.len();
    let cert_der = input.get(..cert_len).unwrap_or(input);
    Ok(vec![cert_der.to_vec()])
}

/// Parse every DER certificate of a chain, preserving order.
pub fn parse_chain(chain_der: &[Vec<u8>]) -> Result<Vec<ParsedCertificate<'_>>, CertviewError> {
    chain_der
        .iter()
        .enumerate()
        .map(|(i, der)| {
            ParsedCertificate::from_der(der).map_err(|e| {
                CertviewError::ParseError(format!("failed to parse certificate {}: {}", i, e))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(load_chain(b""), Err(CertviewError::ParseError(_))));
    }

    #[test]
    fn pem_without_certificates_is_rejected() {
        let input = b"-----BEGIN CERTIFICATE-----\n!!!!\n-----END CERTIFICATE-----\n";
        assert!(matches!(
            parse_pem_chain(input),
            Err(CertviewError::PemError(_))
        ));
    }

    #[test]
    fn garbage_der_is_rejected() {
        assert!(matches!(
            load_chain(&[0x30, 0x03, 0x02, 0x01]),
            Err(CertviewError::DerError(_))
        ));
    }

    #[test]
    fn parse_chain_names_failing_index() {
        let err = parse_chain(&[vec![0x00, 0x01]]).err().map(|e| e.to_string());
        assert!(err.is_some_and(|e| e.contains("certificate 0")));
    }
}

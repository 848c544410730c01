//! Chain validation: temporal validity and signature linkage.
//!
//! Failures are collected as human-readable strings; no check stops the
//! others from running.

use super::ChainCertificate;

/// Validate the chain at `now_ts`, returning `(is_valid, errors)`.
///
/// The input is read leaf first: certificate `i` must be signed by
/// certificate `i + 1`. The last certificate's self-signature is not checked.
pub fn validate_chain<C: ChainCertificate>(certs: &[C], now_ts: i64) -> (bool, Vec<String>) {
    if certs.is_empty() {
        return (false, vec!["No certificates provided".to_string()]);
    }

    let mut errors = Vec::new();
    check_time_validity(certs, now_ts, &mut errors);
    check_signatures(certs, &mut errors);

    (errors.is_empty(), errors)
}

/// Check validity dates for every certificate.
pub(crate) fn check_time_validity<C: ChainCertificate>(
    certs: &[C],
    now_ts: i64,
    errors: &mut Vec<String>,
) {
    for (i, cert) in certs.iter().enumerate() {
        if now_ts < cert.not_before() {
            errors.push(format!("Certificate {} not yet valid", i));
        }
        if now_ts > cert.not_after() {
            errors.push(format!("Certificate {} has expired", i));
        }
    }
}

/// Verify signatures along the chain (each cert signed by the next).
pub(crate) fn check_signatures<C: ChainCertificate>(certs: &[C], errors: &mut Vec<String>) {
    for (i, (child, parent)) in certs.iter().zip(certs.iter().skip(1)).enumerate() {
        if let Err(reason) = child.verified_by(parent) {
            errors.push(format!(
                "Certificate {} signature validation failed: {}",
                i, reason
            ));
        }
    }
}

//! Cross-signing detection.
//!
//! Two certificates are cross-signed when they name the same subject, carry
//! byte-identical SubjectPublicKeyInfo, and were issued by different
//! authorities. Groups are keyed by subject string; key equality is part of
//! pair qualification, not of the key.

use super::ChainCertificate;
use crate::fields::{CrossSignedCert, CrossSigning};
use std::collections::BTreeMap;

/// Precomputed identity strings for one input certificate.
struct Candidate<'c, C> {
    cert: &'c C,
    subject: String,
    issuer: String,
}

/// Group the certificates of `certs` that are cross-signed variants of each
/// other, keyed by subject name.
///
/// Self-issued certificates never start a group but may be added to one as
/// an alternate. Subjects with fewer than two members are dropped.
pub fn detect_cross_signing<C: ChainCertificate>(certs: &[C]) -> CrossSigning {
    let candidates: Vec<Candidate<'_, C>> = certs
        .iter()
        .map(|cert| Candidate {
            cert,
            subject: cert.subject_name(),
            issuer: cert.issuer_name(),
        })
        .collect();

    let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();

    for (i, source) in candidates.iter().enumerate() {
        if source.subject == source.issuer {
            continue;
        }

        for (j, other) in candidates.iter().enumerate() {
            if i == j || !are_cross_signed(source, other) {
                continue;
            }

            tracing::debug!(
                subject = %source.subject,
                issuer = %source.issuer,
                alternate_issuer = %other.issuer,
                "cross-signed pair ({}, {})",
                i,
                j
            );

            let members = groups
                .entry(source.subject.clone())
                .or_insert_with(|| vec![i]);
            if !members.contains(&j) {
                members.push(j);
            }
        }
    }

    groups
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(subject, members)| {
            let records = members
                .into_iter()
                .filter_map(|idx| candidates.get(idx).map(|c| cross_signed_record(idx, c)))
                .collect();
            (subject, records)
        })
        .collect()
}

fn are_cross_signed<C: ChainCertificate>(a: &Candidate<'_, C>, b: &Candidate<'_, C>) -> bool {
    a.subject == b.subject
        && a.issuer != b.issuer
        && a.cert.public_key_der() == b.cert.public_key_der()
}

fn cross_signed_record<C: ChainCertificate>(index: usize, c: &Candidate<'_, C>) -> CrossSignedCert {
    CrossSignedCert {
        index,
        subject: c.subject.clone(),
        issuer: c.issuer.clone(),
        serial: c.cert.serial(),
        public_key_der: c.cert.public_key_der().to_vec(),
    }
}

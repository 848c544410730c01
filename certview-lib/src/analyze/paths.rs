//! Candidate validation path assembly.

use crate::fields::{CertificateFact, ChainPath, CrossSigning};

/// Description of the single path emitted when no cross-signing exists.
pub const PRIMARY_CHAIN: &str = "Primary Certificate Chain";

/// Build candidate leaf-to-root paths from extracted facts.
///
/// Without cross-signing the whole input is one path whose completeness is
/// the chain's validity. Otherwise every alternate of every group yields a
/// path of the end entity, the matching cross-signed certificate (when
/// present in the input) and the CA that issued it (when present).
/// Groups are visited in subject order.
pub fn build_paths(
    facts: &[CertificateFact],
    is_valid: bool,
    cross_signing: &CrossSigning,
) -> Vec<ChainPath> {
    let end_entity = match facts.first() {
        Some(leaf) if !cross_signing.is_empty() => leaf,
        _ => {
            return vec![ChainPath {
                path: facts.to_vec(),
                is_complete: is_valid,
                description: PRIMARY_CHAIN.to_string(),
            }]
        }
    };

    let mut paths = Vec::new();
    for (subject, alternates) in cross_signing {
        for (i, alternate) in alternates.iter().enumerate() {
            let mut path = vec![end_entity.clone()];

            if let Some(cross_signed) = facts
                .iter()
                .find(|f| f.subject == *subject && f.issuer == alternate.issuer)
            {
                path.push(cross_signed.clone());
            }

            if let Some(issuing_ca) = facts
                .iter()
                .find(|f| f.subject == alternate.issuer && f.is_ca)
            {
                path.push(issuing_ca.clone());
            }

            paths.push(ChainPath {
                is_complete: path.len() > 1,
                path,
                description: format!("Chain Path {} via {}", i + 1, alternate.issuer),
            });
        }
    }
    paths
}

//! Human-readable and JSON formatting of chain analyses.

use crate::fields::{CertificateFact, ChainAnalysis, ChainPath, CrossSignedCert};
use crate::CertviewError;

/// Format a chain analysis as a human-readable text report.
pub fn display_text(analysis: &ChainAnalysis, title: &str) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n", title));
    out.push_str(&format!(
        "Chain: {} ({} certificate{})\n",
        if analysis.is_valid { "VALID" } else { "INVALID" },
        analysis.certificates.len(),
        if analysis.certificates.len() == 1 { "" } else { "s" }
    ));

    if !analysis.errors.is_empty() {
        out.push_str("Errors:\n");
        for error in &analysis.errors {
            out.push_str(&format!("  - {}\n", error));
        }
    }

    for fact in &analysis.certificates {
        format_certificate(&mut out, fact);
    }

    if analysis.has_cross_signing() {
        out.push_str("Cross-Signing:\n");
        for (subject, alternates) in &analysis.cross_signing {
            out.push_str(&format!("  {}\n", subject));
            for alt in alternates {
                format_alternate(&mut out, alt);
            }
        }
    }

    out.push_str("Chain Paths:\n");
    for path in &analysis.chain_paths {
        format_path(&mut out, path);
    }

    out
}

fn format_certificate(out: &mut String, fact: &CertificateFact) {
    out.push_str(&format!("Certificate {}:\n", fact.index));
    out.push_str(&format!("  Subject: {}\n", fact.subject));
    out.push_str(&format!("  Issuer: {}\n", fact.issuer));
    out.push_str(&format!("  Serial: {}\n", fact.serial));
    out.push_str("  Validity:\n");
    out.push_str(&format!("    Not Before: {}\n", fact.not_before));
    out.push_str(&format!(
        "    Not After:  {}{}\n",
        fact.not_after,
        if fact.is_expired { " (expired)" } else { "" }
    ));
    out.push_str(&format!("  CA: {}\n", if fact.is_ca { "yes" } else { "no" }));
    out.push_str(&format!("  Signature Algorithm: {}\n", fact.signature_algorithm));
    out.push_str(&format!("  Public Key: {}", fact.public_key_algorithm));
    if fact.public_key_size > 0 {
        out.push_str(&format!(" ({} bit)", fact.public_key_size));
    }
    out.push('\n');

    if !fact.key_usage.is_empty() {
        out.push_str(&format!("  Key Usage: {}\n", fact.key_usage.join(", ")));
    }
    if !fact.ext_key_usage.is_empty() {
        out.push_str(&format!(
            "  Extended Key Usage: {}\n",
            fact.ext_key_usage.join(", ")
        ));
    }
    if !fact.dns_names.is_empty() {
        out.push_str(&format!("  DNS Names: {}\n", fact.dns_names.join(", ")));
    }

    if !fact.extensions.is_empty() {
        out.push_str("  Extensions:\n");
        for ext in &fact.extensions {
            let critical_str = if ext.critical { " [critical]" } else { "" };
            out.push_str(&format!("    {} ({}){}:", ext.name, ext.oid, critical_str));
            if ext.value.len() <= 40 {
                out.push_str(&format!(" {}\n", ext.value));
            } else {
                out.push_str(&format!(" {}...\n", ext.value.get(..40).unwrap_or("")));
            }
        }
    }

    out.push_str(&format!("  Fingerprint (SHA-256): {}\n", fact.fingerprint));
}

fn format_alternate(out: &mut String, alt: &CrossSignedCert) {
    out.push_str(&format!(
        "    [{}] issued by {} (serial {})\n",
        alt.index, alt.issuer, alt.serial
    ));
}

fn format_path(out: &mut String, path: &ChainPath) {
    out.push_str(&format!(
        "  {} [{}]\n",
        path.description,
        if path.is_complete { "complete" } else { "incomplete" }
    ));
    for fact in &path.path {
        out.push_str(&format!("    -> {}\n", fact.subject));
    }
}

/// One-line verdict: `OK` or `FAIL, <errors>`.
pub fn summary_line(analysis: &ChainAnalysis) -> String {
    if analysis.is_valid {
        "OK".to_string()
    } else {
        format!("FAIL, {}", analysis.errors.join("; "))
    }
}

/// Serialize a chain analysis to a pretty-printed JSON string.
pub fn to_json(analysis: &ChainAnalysis) -> Result<String, CertviewError> {
    serde_json::to_string_pretty(analysis).map_err(CertviewError::Json)
}

//! certview: Command-line tool for analyzing X.509 certificate chains.

mod fetch;

use anyhow::{Context, Result};
use certview_lib::{AnalyzeOptions, ChainAnalysis};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "certview",
    about = "Analyze X.509 certificate chains: validity, cross-signing and paths",
    long_about = "certview reads an ordered certificate chain (leaf first) in PEM or DER\n\
                  format and reports per-certificate facts, chain validity, cross-signed\n\
                  certificates and the candidate validation paths they create.\n\n\
                  Input format (PEM vs DER) is auto-detected unless --pem or --der\n\
                  is specified. All commands read from stdin when no file is given,\n\
                  or fetch the chain a server presents with --connect host[:port].",
    after_help = "EXAMPLES:\n\
                  \n  certview analyze chain.pem\
                  \n  certview analyze --json chain.pem\
                  \n  certview validate chain.pem\
                  \n  certview validate --recurse certs/\
                  \n  certview cross-signs chain.pem\
                  \n  certview analyze --connect example.com\
                  \n  cat chain.pem | certview analyze"
)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a full chain analysis report
    #[command(after_help = "EXAMPLES:\n\
                      \n  certview analyze chain.pem\
                      \n  certview analyze --json chain.pem\
                      \n  certview analyze --title \"example.com\" chain.pem\
                      \n  certview analyze --attime 1700000000 chain.pem\
                      \n  certview analyze --connect example.com:8443")]
    Analyze {
        #[command(flatten)]
        input: InputArgs,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
        /// Report title (default: the input file or host name)
        #[arg(long)]
        title: Option<String>,
        /// Evaluate validity at this Unix timestamp instead of now
        #[arg(long)]
        attime: Option<i64>,
    },
    /// Validate chains (exit code 0 = all valid, 2 = any invalid)
    #[command(after_help = "EXAMPLES:\n\
                      \n  certview validate chain.pem\
                      \n  certview validate certs/\
                      \n  certview validate --recurse --failures-only certs/\
                      \n  certview validate --connect example.com")]
    Validate {
        // A directory argument validates every chain file inside it.
        #[command(flatten)]
        input: InputArgs,
        /// Evaluate validity at this Unix timestamp instead of now
        #[arg(long)]
        attime: Option<i64>,
        /// Only print failures (directory mode)
        #[arg(long)]
        failures_only: bool,
        /// Recurse into subdirectories (directory mode)
        #[arg(short, long)]
        recurse: bool,
    },
    /// List cross-signed certificates found in a chain
    CrossSigns {
        #[command(flatten)]
        input: InputArgs,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
        /// Evaluate validity at this Unix timestamp instead of now
        #[arg(long)]
        attime: Option<i64>,
    },
}

/// Where a chain comes from: a file, stdin, or a live TLS endpoint.
#[derive(Args)]
struct InputArgs {
    /// Chain file (PEM bundle or single DER). Reads from stdin if omitted.
    file: Option<PathBuf>,
    /// Fetch the chain presented by a TLS server (port defaults to 443)
    #[arg(long, value_name = "HOST[:PORT]", conflicts_with = "file")]
    connect: Option<String>,
    /// Force DER input parsing (default: auto-detect)
    #[arg(long, conflicts_with_all = ["pem", "connect"])]
    der: bool,
    /// Force PEM input parsing (default: auto-detect)
    #[arg(long, conflicts_with = "connect")]
    pem: bool,
}

impl InputArgs {
    /// Read and split the chain into DER certificates.
    fn load(&self) -> Result<Vec<Vec<u8>>> {
        if let Some(target) = &self.connect {
            return fetch::fetch_chain(target);
        }
        let input = read_input(self.file.as_ref())?;
        load_input(&input, self.der, self.pem)
    }

    fn label(&self) -> String {
        match &self.connect {
            Some(target) => target.clone(),
            None => input_label(self.file.as_ref()),
        }
    }

    fn title(&self) -> String {
        match &self.connect {
            Some(target) => format!("Domain: {}", target),
            None => default_title(self.file.as_ref()),
        }
    }
}

/// Maximum file size for certificate inputs (10 MiB).
const MAX_INPUT_BYTES: u64 = 10 * 1024 * 1024;

fn init_logging(verbose: bool) {
    let default = if verbose { Level::DEBUG } else { Level::WARN };
    let env_filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_input(file: Option<&PathBuf>) -> Result<Vec<u8>> {
    match file {
        Some(path) => {
            let meta = std::fs::metadata(path)
                .with_context(|| format!("Failed to stat file: {}", path.display()))?;
            if meta.len() > MAX_INPUT_BYTES {
                anyhow::bail!(
                    "File too large ({} bytes, max {} bytes): {}",
                    meta.len(),
                    MAX_INPUT_BYTES,
                    path.display()
                );
            }
            std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
        }
        None => read_capped(std::io::stdin()),
    }
}

/// Read a stream, rejecting it once it exceeds [`MAX_INPUT_BYTES`].
fn read_capped<R: Read>(reader: R) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader
        .take(MAX_INPUT_BYTES + 1)
        .read_to_end(&mut buf)
        .context("Failed to read from stdin")?;
    if buf.len() as u64 > MAX_INPUT_BYTES {
        anyhow::bail!("Input too large (max {} bytes): stdin", MAX_INPUT_BYTES);
    }
    Ok(buf)
}

/// Split input into DER certificates, honouring `--der` / `--pem`.
fn load_input(input: &[u8], der: bool, pem: bool) -> Result<Vec<Vec<u8>>> {
    let chain = if der {
        certview_lib::load_der(input)?
    } else if pem {
        certview_lib::parse_pem_chain(input)?
    } else {
        certview_lib::load_chain(input)?
    };
    tracing::info!("Found {} certificate(s)", chain.len());
    Ok(chain)
}

fn analyze_der_chain(chain: &[Vec<u8>], options: &AnalyzeOptions) -> Result<ChainAnalysis> {
    let parsed = certview_lib::parse_chain(chain)?;
    Ok(certview_lib::analyze_chain_with_options(&parsed, options))
}

fn input_label(file: Option<&PathBuf>) -> String {
    file.map_or("stdin".to_string(), |f| f.display().to_string())
}

fn default_title(file: Option<&PathBuf>) -> String {
    match file {
        Some(path) => format!("File: {}", path.display()),
        None => "stdin".to_string(),
    }
}

/// Text listing of the cross-signing groups alone.
fn format_cross_signs(analysis: &ChainAnalysis) -> String {
    if !analysis.has_cross_signing() {
        return "No cross-signed certificates found\n".to_string();
    }
    let mut out = String::new();
    for (subject, alternates) in &analysis.cross_signing {
        out.push_str(&format!("{}\n", subject));
        for alt in alternates {
            out.push_str(&format!(
                "  [{}] issued by {} (serial {})\n",
                alt.index, alt.issuer, alt.serial
            ));
        }
    }
    out
}

/// Check if a path has a certificate file extension (.pem, .der, .crt, .cer).
fn is_cert_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some(ext) if ext.eq_ignore_ascii_case("pem") || ext.eq_ignore_ascii_case("der")
            || ext.eq_ignore_ascii_case("crt") || ext.eq_ignore_ascii_case("cer")
    )
}

/// Find all certificate files in a directory, sorted by path.
fn find_cert_files(dir: &Path, recurse: bool) -> Vec<PathBuf> {
    let walker = if recurse {
        walkdir::WalkDir::new(dir)
    } else {
        walkdir::WalkDir::new(dir).max_depth(1)
    };
    let mut files: Vec<PathBuf> = walker
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_cert_file(e.path()))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// A single result from batch processing.
struct BatchResult {
    path: String,
    pass: bool,
    detail: String,
}

impl BatchResult {
    fn from_analysis(path: String, result: Result<ChainAnalysis>) -> Self {
        match result {
            Ok(analysis) => BatchResult {
                path,
                pass: analysis.is_valid,
                detail: certview_lib::summary_line(&analysis),
            },
            Err(e) => BatchResult {
                path,
                pass: false,
                detail: format!("FAIL ({:#})", e),
            },
        }
    }
}

/// Analyze chain files in parallel, printing `filename: result`.
///
/// Returns the number of failures.
fn run_batch(
    files: &[PathBuf],
    input: &InputArgs,
    failures_only: bool,
    options: &AnalyzeOptions,
) -> usize {
    let results: Vec<BatchResult> = files
        .par_iter()
        .map(|f| {
            let label = f.display().to_string();
            let result = read_input(Some(f))
                .and_then(|data| load_input(&data, input.der, input.pem))
                .and_then(|chain| analyze_der_chain(&chain, options));
            BatchResult::from_analysis(label, result)
        })
        .collect();

    let mut failures = 0;
    for r in &results {
        if !r.pass {
            failures += 1;
        }
        if failures_only && r.pass {
            continue;
        }
        if r.pass {
            println!("{}: {}", r.path, r.detail);
        } else {
            eprintln!("{}: {}", r.path, r.detail);
        }
    }
    failures
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Analyze {
            input,
            json,
            title,
            attime,
        } => {
            let chain = input.load()?;
            let options = AnalyzeOptions { at_time: *attime };
            let analysis = analyze_der_chain(&chain, &options)?;

            if *json {
                println!("{}", certview_lib::to_json(&analysis)?);
            } else {
                let title = title.clone().unwrap_or_else(|| input.title());
                print!("{}", certview_lib::display_text(&analysis, &title));
            }
        }
        Commands::Validate {
            input,
            attime,
            failures_only,
            recurse,
        } => {
            let options = AnalyzeOptions { at_time: *attime };

            // Directory mode: every file is an independent chain
            if let Some(path) = &input.file {
                if path.is_dir() {
                    let files = find_cert_files(path, *recurse);
                    if files.is_empty() {
                        anyhow::bail!(
                            "No certificate files (.pem, .der, .crt, .cer) found in {}",
                            path.display()
                        );
                    }
                    tracing::info!("Validating {} file(s) in {}", files.len(), path.display());
                    if run_batch(&files, input, *failures_only, &options) > 0 {
                        std::process::exit(2);
                    }
                    return Ok(());
                }
            }

            let chain = input.load()?;
            let analysis = analyze_der_chain(&chain, &options)?;
            let label = input.label();
            let line = certview_lib::summary_line(&analysis);
            if analysis.is_valid {
                println!("{}: {}", label, line);
            } else {
                eprintln!("{}: {}", label, line);
                std::process::exit(2);
            }
        }
        Commands::CrossSigns {
            input,
            json,
            attime,
        } => {
            let chain = input.load()?;
            let options = AnalyzeOptions { at_time: *attime };
            let analysis = analyze_der_chain(&chain, &options)?;

            if *json {
                println!("{}", serde_json::to_string_pretty(&analysis.cross_signing)?);
            } else {
                print!("{}", format_cross_signs(&analysis));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use certview_lib::{CrossSignedCert, CrossSigning};

    fn empty_analysis() -> ChainAnalysis {
        certview_lib::analyze_chain_with_options(&[], &AnalyzeOptions::at(0))
    }

    // ---- Input handling ----

    #[test]
    fn cert_file_extensions() {
        assert!(is_cert_file(Path::new("chain.pem")));
        assert!(is_cert_file(Path::new("root.DER")));
        assert!(is_cert_file(Path::new("a/b/leaf.crt")));
        assert!(is_cert_file(Path::new("leaf.cer")));
        assert!(!is_cert_file(Path::new("key.key")));
        assert!(!is_cert_file(Path::new("README")));
    }

    #[test]
    fn labels_and_titles() {
        let path = PathBuf::from("certs/chain.pem");
        assert_eq!(input_label(Some(&path)), "certs/chain.pem");
        assert_eq!(input_label(None), "stdin");
        assert_eq!(default_title(Some(&path)), "File: certs/chain.pem");
        assert_eq!(default_title(None), "stdin");
    }

    #[test]
    fn missing_file_is_an_error() {
        let path = PathBuf::from("/nonexistent/certview/chain.pem");
        let err = read_input(Some(&path)).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to stat file"));
    }

    #[test]
    fn forced_der_rejects_pem_text() {
        let pem = b"-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n";
        assert!(load_input(pem, true, false).is_err());
    }

    #[test]
    fn stdin_within_limit_is_read_whole() {
        let data = read_capped(std::io::Cursor::new(b"chain bytes".to_vec())).unwrap();
        assert_eq!(data, b"chain bytes");

        let exact = read_capped(std::io::repeat(b'A').take(MAX_INPUT_BYTES)).unwrap();
        assert_eq!(exact.len() as u64, MAX_INPUT_BYTES);
    }

    #[test]
    fn oversized_stdin_is_rejected() {
        let err = read_capped(std::io::repeat(b'A').take(MAX_INPUT_BYTES + 5)).unwrap_err();
        assert!(err.to_string().starts_with("Input too large"));
    }

    #[test]
    fn connect_labels_and_titles() {
        let input = InputArgs {
            file: None,
            connect: Some("example.com:8443".into()),
            der: false,
            pem: false,
        };
        assert_eq!(input.label(), "example.com:8443");
        assert_eq!(input.title(), "Domain: example.com:8443");
    }

    #[test]
    fn every_command_takes_the_same_inputs() {
        for cmd in ["analyze", "validate", "cross-signs"] {
            assert!(Cli::try_parse_from(["certview", cmd, "--pem", "x.pem"]).is_ok());
            assert!(Cli::try_parse_from(["certview", cmd, "--der", "x.der"]).is_ok());
            assert!(Cli::try_parse_from(["certview", cmd, "--connect", "example.com"]).is_ok());
            assert!(Cli::try_parse_from(["certview", cmd, "--connect", "h", "x.pem"]).is_err());
            assert!(Cli::try_parse_from(["certview", cmd, "--der", "--pem"]).is_err());
        }
        let cli = Cli::try_parse_from(["certview", "cross-signs", "--attime", "5"]).unwrap();
        match cli.command {
            Commands::CrossSigns { attime, .. } => assert_eq!(attime, Some(5)),
            _ => panic!("expected cross-signs"),
        }
    }

    #[test]
    fn find_cert_files_in_missing_dir_is_empty() {
        assert!(find_cert_files(Path::new("/nonexistent/certview"), true).is_empty());
    }

    // ---- Output formatting ----

    #[test]
    fn cross_signs_without_groups() {
        assert_eq!(
            format_cross_signs(&empty_analysis()),
            "No cross-signed certificates found\n"
        );
    }

    #[test]
    fn cross_signs_listing() {
        let mut analysis = empty_analysis();
        let mut groups = CrossSigning::new();
        groups.insert(
            "CN = Int".to_string(),
            vec![
                CrossSignedCert {
                    index: 1,
                    subject: "CN = Int".into(),
                    issuer: "CN = Root A".into(),
                    serial: "01".into(),
                    public_key_der: Vec::new(),
                },
                CrossSignedCert {
                    index: 3,
                    subject: "CN = Int".into(),
                    issuer: "CN = Root B".into(),
                    serial: "02".into(),
                    public_key_der: Vec::new(),
                },
            ],
        );
        analysis.cross_signing = groups;
        assert_eq!(
            format_cross_signs(&analysis),
            "CN = Int\n  [1] issued by CN = Root A (serial 01)\n  [3] issued by CN = Root B (serial 02)\n"
        );
    }

    #[test]
    fn batch_result_from_error() {
        let r = BatchResult::from_analysis("x.pem".into(), Err(anyhow::anyhow!("bad input")));
        assert!(!r.pass);
        assert_eq!(r.detail, "FAIL (bad input)");
    }

    #[test]
    fn batch_result_from_invalid_chain() {
        let r = BatchResult::from_analysis("x.pem".into(), Ok(empty_analysis()));
        assert!(!r.pass);
        assert_eq!(r.detail, "FAIL, No certificates provided");
    }
}

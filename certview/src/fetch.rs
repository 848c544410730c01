//! Fetching the certificate chain a live TLS endpoint presents.
//!
//! The handshake does not verify the peer: the chain is wanted for
//! analysis, not trusted.

use anyhow::{anyhow, bail, Context, Result};
use openssl::ssl::{SslConnector, SslMethod, SslVerifyMode};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_PORT: u16 = 443;

/// Split `host[:port]` into its parts, defaulting the port to 443.
///
/// IPv6 literals must be bracketed when a port is given (`[::1]:8443`).
pub fn parse_host_port(target: &str) -> Result<(String, u16)> {
    let (host, port) = if let Some(rest) = target.strip_prefix('[') {
        let (host, after) = rest
            .split_once(']')
            .ok_or_else(|| anyhow!("invalid host:port format: missing ']' in {}", target))?;
        match after.strip_prefix(':') {
            Some(port) => (host, Some(port)),
            None if after.is_empty() => (host, None),
            None => bail!("invalid host:port format: {}", target),
        }
    } else if let Some((host, port)) = target.rsplit_once(':') {
        if host.contains(':') {
            bail!("invalid host:port format: too many colons in {}", target);
        }
        (host, Some(port))
    } else {
        (target, None)
    };

    if host.is_empty() {
        bail!("empty hostname");
    }
    let port = match port {
        Some(p) => p
            .parse::<u16>()
            .with_context(|| format!("invalid port: '{}'", p))?,
        None => DEFAULT_PORT,
    };
    Ok((host.to_string(), port))
}

/// Connect to `target` and return the peer's chain as DER, leaf first.
pub fn fetch_chain(target: &str) -> Result<Vec<Vec<u8>>> {
    let (host, port) = parse_host_port(target)?;
    let address = if host.contains(':') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    };

    let socket_addr = (host.as_str(), port)
        .to_socket_addrs()
        .with_context(|| format!("failed to resolve {}", address))?
        .next()
        .ok_or_else(|| anyhow!("no addresses found for {}", address))?;

    let stream = TcpStream::connect_timeout(&socket_addr, CONNECTION_TIMEOUT)
        .with_context(|| format!("failed to connect to {}", address))?;
    stream.set_read_timeout(Some(CONNECTION_TIMEOUT))?;
    stream.set_write_timeout(Some(CONNECTION_TIMEOUT))?;

    let mut builder = SslConnector::builder(SslMethod::tls())?;
    builder.set_verify(SslVerifyMode::NONE);
    let connector = builder.build();

    let ssl_stream = connector
        .connect(&host, stream)
        .map_err(|e| anyhow!("failed to connect to {}: {}", address, e))?;

    let chain = match ssl_stream.ssl().peer_cert_chain() {
        Some(stack) => stack
            .iter()
            .map(|cert| cert.to_der())
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };
    if chain.is_empty() {
        bail!("no certificates received from {}", address);
    }

    tracing::info!("Received {} certificate(s) from {}", chain.len(), address);
    Ok(chain)
}

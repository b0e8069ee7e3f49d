//! Client identity extraction for rate limiting.

use axum::http::HeaderMap;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

/// Identity shared by every client that carries no address header.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Where the rate limiter takes the client identity from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentitySource {
    /// `X-Forwarded-For`, then `X-Real-IP`, then [`UNKNOWN_CLIENT`].
    ///
    /// Both headers are client-controlled unless an edge proxy overwrites
    /// them, so this is only trustworthy behind such a proxy.
    #[default]
    Forwarded,
    /// TCP peer address of the connection, then [`UNKNOWN_CLIENT`].
    Peer,
}

impl FromStr for IdentitySource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "forwarded" => Ok(Self::Forwarded),
            "peer" => Ok(Self::Peer),
            other => Err(format!(
                "expected 'forwarded' or 'peer', got '{other}'"
            )),
        }
    }
}

impl fmt::Display for IdentitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forwarded => f.write_str("forwarded"),
            Self::Peer => f.write_str("peer"),
        }
    }
}

/// Reads the first hop of `X-Forwarded-For`, falling back to `X-Real-IP`.
///
/// Values are trimmed; empty values count as missing.
pub fn forwarded_client(headers: &HeaderMap) -> Option<String> {
    let first_forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    first_forwarded.or_else(real_ip).map(str::to_string)
}

/// Resolves the rate-limiter key for a request.
///
/// Unidentifiable clients all map to [`UNKNOWN_CLIENT`] and therefore share
/// one counter.
pub fn resolve_identity(
    source: IdentitySource,
    forwarded: Option<&str>,
    peer: Option<SocketAddr>,
) -> String {
    match source {
        IdentitySource::Forwarded => forwarded.map(str::to_string),
        IdentitySource::Peer => peer.map(|addr| addr.ip().to_string()),
    }
    .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

//! Client identification utilities
//!
//! Resolves the identity used to key per-client rate limits.

use http::HeaderMap;
use std::net::IpAddr;

/// Identity shared by every request whose origin cannot be determined.
///
/// All such clients share one counter. Deployments behind a proxy that strips
/// `X-Forwarded-For` should plug in a stronger [`ClientIdentityResolver`].
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Strategy for deriving a client identity from a request
pub trait ClientIdentityResolver: Send + Sync {
    /// Never fails; falls back to [`UNKNOWN_CLIENT`] when nothing is derivable.
    fn resolve(&self, headers: &HeaderMap, peer: Option<IpAddr>) -> String;
}

/// Proxy-forwarded address, then the connection address, then [`UNKNOWN_CLIENT`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardedForResolver;

impl ClientIdentityResolver for ForwardedForResolver {
    fn resolve(&self, headers: &HeaderMap, peer: Option<IpAddr>) -> String {
        extract_client_ip(headers, peer)
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
    }
}

/// Extract client IP address from headers
///
/// Checks X-Forwarded-For header first (for reverse proxy setups),
/// then falls back to direct connection IP.
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|xff| xff.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok());

    forwarded.or(direct_ip)
}

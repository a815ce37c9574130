//! Client IP extraction
//!
//! `X-Forwarded-For` is only read when proxies are trusted, and then only the
//! entry appended by the outermost trusted proxy is used. Everything to its
//! left was supplied by the client and is ignored.

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

const UNKNOWN: &str = "unknown";

/// Client IP for a request, or `"unknown"`.
///
/// With `trusted_proxy_count` N > 0 the client is `ips[len - N]` of the
/// forwarded chain. A chain shorter than N did not pass through every proxy
/// and is ignored. With N = 0 forwarding headers are ignored and the socket
/// address is used.
pub fn extract_client_ip(
    headers: &HeaderMap,
    socket_addr: Option<&SocketAddr>,
    trusted_proxy_count: usize,
) -> String {
    if trusted_proxy_count > 0 {
        if let Some(ip) = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| from_forwarded_for(v, trusted_proxy_count))
        {
            return ip;
        }
    }

    socket_addr
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn from_forwarded_for(header_value: &str, trusted_proxy_count: usize) -> Option<String> {
    let ips: Vec<&str> = header_value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let index = ips.len().checked_sub(trusted_proxy_count)?;
    let candidate = ips.get(index)?;
    candidate
        .parse::<IpAddr>()
        .ok()
        .map(|ip| ip.to_string())
}

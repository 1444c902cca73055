//! Client IP extraction for per-client quotas.

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use axum::http::HeaderMap;
use tracing::debug;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Returns the identifier the quota is tracked under.
///
/// Uses the socket peer address unless `behind_proxy` is set, in which case the
/// first `X-Forwarded-For` entry (then `X-Real-IP`) wins. Forwarding headers are
/// client-controlled, so they are only trusted behind a reverse proxy that
/// overwrites them, and only if they hold a valid IP address.
///
/// The result is always a canonical IP address string, so it can never collide
/// with the usage counter key in the quotas keyspace.
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
///
/// let peer: SocketAddr = "10.0.0.1:5000".parse().unwrap();
/// assert_eq!(client_ip(&headers, peer, true), "203.0.113.7");
/// assert_eq!(client_ip(&headers, peer, false), "10.0.0.1");
/// ```
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr, behind_proxy: bool) -> String {
    if behind_proxy && let Some(ip) = forwarded_ip(headers) {
        return ip.to_string();
    }

    peer.ip().to_string()
}

fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let from_header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|v| IpAddr::from_str(v.trim()).ok())
    };

    let ip = from_header(X_FORWARDED_FOR).or_else(|| from_header(X_REAL_IP));
    if ip.is_none()
        && (headers.contains_key(X_FORWARDED_FOR) || headers.contains_key(X_REAL_IP))
    {
        debug!("Ignoring forwarding headers without a valid IP address");
    }
    ip
}

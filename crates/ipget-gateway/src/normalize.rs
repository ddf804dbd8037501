//! # Gateway URL Normalization
//!
//! Users hand us anything from `localhost:5001` to a full
//! `https://dweb.link` URL. Scheme guessing is a total function over a
//! closed set of recognized local-host aliases: those get `http`,
//! everything else without an explicit scheme gets `https`.

use url::Url;

use crate::error::GatewayError;

/// Host names that get a plaintext `http` scheme when none is given.
const LOCAL_ALIASES: [&str; 2] = ["localhost", "127.0.0.1"];

/// Normalize a user-supplied gateway string into a base URL.
///
/// Guarantees a trailing slash on the path so endpoint joins append
/// instead of replacing the last path segment.
///
/// # Errors
///
/// [`GatewayError::BadGatewayUrl`] when the string (after scheme
/// defaulting) is not a valid URL.
pub fn normalize_gateway(gateway: &str) -> Result<Url, GatewayError> {
    let with_scheme = if gateway.contains("://") {
        gateway.to_string()
    } else {
        let host = gateway.split(':').next().unwrap_or(gateway);
        let scheme = if LOCAL_ALIASES.contains(&host) {
            "http"
        } else {
            "https"
        };
        format!("{scheme}://{gateway}")
    };
    let mut url = Url::parse(&with_scheme).map_err(|e| GatewayError::BadGatewayUrl {
        url: gateway.to_string(),
        reason: e.to_string(),
    })?;
    if !url.path().ends_with('/') {
        url.set_path(&format!("{}/", url.path()));
    }
    Ok(url)
}

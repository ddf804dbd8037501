//! # Error Types

use thiserror::Error;

/// Errors arising from gateway interactions.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The configured gateway is not a usable URL.
    #[error("invalid gateway url {url:?}: {reason}")]
    BadGatewayUrl { url: String, reason: String },

    /// The request itself failed (connect, TLS, body read).
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with an error status.
    #[error("gateway returned {status} for {url}")]
    Status { status: u16, url: String },

    /// The resolve response body is not the JSON shape the API documents.
    #[error("unexpected response from resolve: {0}")]
    UnexpectedResolveShape(String),

    /// The resolve response names something other than an `/ipfs/` path.
    #[error("expected {requested} to resolve to an /ipfs/ path but found {resolved}")]
    NotAnIpfsPath { requested: String, resolved: String },
}

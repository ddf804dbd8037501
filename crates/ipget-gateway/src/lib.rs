//! # ipget-gateway — Untrusted Gateway Transport
//!
//! The two HTTP interactions the pipeline needs: "export a CAR for this
//! address" and "resolve this path to an address". The gateway is not
//! trusted for correctness — everything it returns is verified upstream
//! against content addresses — so this crate's only jobs are shaping the
//! requests, policing status codes, and parsing the resolve body.
//!
//! Neither call retries; the first transport error is fatal to the
//! extraction that issued it.

mod client;
mod error;
mod normalize;

pub use client::{ExportProtocol, GatewayClient};
pub use error::GatewayError;
pub use normalize::normalize_gateway;

//! # Error Types
//!
//! The top-level error for one `ipget` invocation. Every lower layer's
//! error converts in via `#[from]`; all of them abort the extraction, none
//! are retried or downgraded.

use ipget_car::CarError;
use ipget_core::CidError;
use ipget_gateway::GatewayError;
use ipget_unixfs::ExportError;
use thiserror::Error;

/// Top-level error for the fetch-verify-extract pipeline.
#[derive(Error, Debug)]
pub enum GetError {
    /// The requested address could not be parsed or verified.
    #[error(transparent)]
    Cid(#[from] CidError),

    /// The gateway's container stream was malformed.
    #[error(transparent)]
    Car(#[from] CarError),

    /// Block verification or DAG decoding failed during the walk.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// A gateway interaction failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Materialization I/O failed.
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
}

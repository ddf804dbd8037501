//! # Error Types

use ipget_core::error::VarintError;
use ipget_core::CidError;
use thiserror::Error;

/// Errors arising while reading a CAR container.
#[derive(Error, Debug)]
pub enum CarError {
    /// The header is not the dag-cbor shape a CARv1 carries.
    #[error("invalid car header: {0}")]
    InvalidHeader(String),

    /// The header declares a version this reader does not speak.
    #[error("unsupported car version {0}")]
    UnsupportedVersion(u64),

    /// The header names no roots.
    #[error("car header declares no roots")]
    EmptyRoots,

    /// The stream ended inside a length prefix, CID, or block payload.
    #[error("truncated car stream: {0}")]
    Truncated(String),

    /// A CID embedded in the stream could not be decoded.
    #[error(transparent)]
    Cid(#[from] CidError),
}

impl From<VarintError> for CarError {
    fn from(err: VarintError) -> Self {
        CarError::Truncated(err.to_string())
    }
}

//! # Error Types
//!
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations. Identifier parsing fails loudly with the offending
//! input in the message; unknown hash functions carry their numeric code
//! so a caller can tell *which* function the table is missing.

use thiserror::Error;

/// Errors arising from content-identifier parsing and verification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CidError {
    /// The input is not a structurally valid CID encoding.
    #[error("malformed cid: {0}")]
    Malformed(String),

    /// The multihash code is absent from the supported table.
    ///
    /// The table is a closed set; an unknown code means the block can
    /// never be verified, so this is a hard error.
    #[error("unsupported hash function 0x{0:x}")]
    UnsupportedHashFunction(u64),

    /// A varint inside the identifier could not be decoded.
    #[error("malformed cid varint: {0}")]
    Varint(#[from] VarintError),
}

/// Errors decoding an unsigned LEB128 varint.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarintError {
    /// The buffer ended before the final varint byte.
    #[error("truncated varint")]
    Truncated,

    /// The encoded value does not fit in a u64.
    #[error("varint overflows u64")]
    Overflow,
}

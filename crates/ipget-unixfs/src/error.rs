//! # Error Types
//!
//! One enum covers the whole decode-and-walk surface. Every variant is
//! fatal to the extraction that hit it: there is no partial-trust mode and
//! no skipping of nodes the closed codec set cannot represent.

use ipget_core::{Cid, CidError};
use thiserror::Error;

/// Errors arising while decoding blocks or walking the DAG.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The CID names a codec outside the supported table.
    #[error("unsupported codec 0x{0:x}")]
    UnsupportedCodec(u64),

    /// The UnixFS node type is recognized but not materializable here.
    #[error("unsupported unixfs node type: {0}")]
    UnsupportedNodeType(&'static str),

    /// The block is not a structurally valid dag-pb node.
    #[error("invalid dag-pb node: {0}")]
    InvalidDagPb(String),

    /// The dag-pb Data field is not a valid UnixFS envelope.
    #[error("invalid unixfs data: {0}")]
    InvalidUnixFs(String),

    /// A directory link carries a name that cannot be used as a single
    /// path segment. The container is untrusted, and a name like `..` or
    /// `a/b` would let it place entries outside the extraction root.
    #[error("unsafe link name {0:?} in directory node")]
    UnsafeLinkName(String),

    /// The walk requested a block the source cannot supply.
    #[error("block not found for {0}")]
    BlockNotFound(Cid),

    /// The block's bytes do not hash to its address. The gateway returned
    /// bad data; the whole extraction aborts.
    #[error("bad block: hash does not match cid {0}")]
    BlockDigestMismatch(Cid),

    /// A CID embedded in a link or address failed to parse or verify.
    #[error(transparent)]
    Cid(#[from] CidError),
}

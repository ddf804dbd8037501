//! # UnixFS Envelope
//!
//! The `Data` payload of a UnixFS dag-pb node is itself a small protobuf
//! message: a node type, optional inline content, the total file size, and
//! per-chunk block sizes. The type set is closed — a value outside it is a
//! decode error, and the exporter separately rejects the types it cannot
//! materialize as files or directories.

use crate::error::ExportError;
use crate::pb::{read_packed_varints, PbReader, PbValue};

/// UnixFS node types, mirroring the envelope's `DataType` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnixFsType {
    Raw,
    Directory,
    File,
    Metadata,
    Symlink,
    HamtShard,
}

impl UnixFsType {
    fn from_wire(value: u64) -> Result<Self, ExportError> {
        match value {
            0 => Ok(Self::Raw),
            1 => Ok(Self::Directory),
            2 => Ok(Self::File),
            3 => Ok(Self::Metadata),
            4 => Ok(Self::Symlink),
            5 => Ok(Self::HamtShard),
            other => Err(ExportError::InvalidUnixFs(format!(
                "unknown node type {other}"
            ))),
        }
    }

    /// Human-readable name, used in unsupported-type errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Directory => "directory",
            Self::File => "file",
            Self::Metadata => "metadata",
            Self::Symlink => "symlink",
            Self::HamtShard => "hamt-sharded directory",
        }
    }
}

/// A decoded UnixFS envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnixFsData {
    /// The node type.
    pub kind: UnixFsType,
    /// Inline content bytes (leaf chunks and small files).
    pub data: Vec<u8>,
    /// Total size of the file this node roots, when recorded.
    pub filesize: Option<u64>,
    /// Per-link chunk sizes for multi-block files.
    pub blocksizes: Vec<u64>,
}

impl UnixFsData {
    /// Decode the envelope from a dag-pb node's `Data` field.
    ///
    /// The type field is required. `blocksizes` accepts both the packed
    /// and the field-per-value encodings of proto2.
    pub fn decode(buf: &[u8]) -> Result<Self, ExportError> {
        let invalid = |e: &dyn std::fmt::Display| ExportError::InvalidUnixFs(e.to_string());
        let mut reader = PbReader::new(buf);
        let mut kind = None;
        let mut data = Vec::new();
        let mut filesize = None;
        let mut blocksizes = Vec::new();
        while let Some((field, value)) = reader.next_field().map_err(|e| invalid(&e))? {
            match (field, value) {
                (1, PbValue::Varint(value)) => kind = Some(UnixFsType::from_wire(value)?),
                (2, PbValue::Bytes(bytes)) => data = bytes.to_vec(),
                (3, PbValue::Varint(size)) => filesize = Some(size),
                (4, PbValue::Varint(size)) => blocksizes.push(size),
                (4, PbValue::Bytes(packed)) => {
                    blocksizes.extend(read_packed_varints(packed).map_err(|e| invalid(&e))?)
                }
                (1 | 2 | 3, _) => {
                    return Err(ExportError::InvalidUnixFs(
                        "wrong wire type for envelope field".into(),
                    ))
                }
                _ => {}
            }
        }
        let kind = kind
            .ok_or_else(|| ExportError::InvalidUnixFs("missing required type field".into()))?;
        Ok(Self {
            kind,
            data,
            filesize,
            blocksizes,
        })
    }
}

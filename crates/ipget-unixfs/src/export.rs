//! # Tree Export — DAG Walk as an Entry Stream
//!
//! [`export`] turns a DAG rooted at a CID into a pull-based iterator of
//! path-labeled entries: each directory before its descendants, children
//! in manifest link order, file content resolved lazily chunk by chunk.
//!
//! The sequence is finite, non-restartable, and consumed exactly once.
//! The first error fuses the iterator — a walk that has seen a bad block
//! has nothing trustworthy left to say.

use bytes::Bytes;
use ipget_core::{Cid, DAG_PB, RAW};

use crate::data::{UnixFsData, UnixFsType};
use crate::dagpb::PbNode;
use crate::error::ExportError;

/// The one-method block-access capability the walk runs against.
///
/// Implementations must return bytes that already passed digest
/// verification against `cid`; the walk decodes whatever it is given.
pub trait BlockSource {
    /// Fetch the verified bytes for `cid`.
    fn get(&self, cid: &Cid) -> Result<Bytes, ExportError>;
}

/// What an entry materializes as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A UnixFS directory.
    Directory,
    /// A UnixFS file (possibly chunked across blocks).
    File,
    /// A bare raw-codec leaf at the root.
    RawLeaf,
}

/// One file-system entry produced by the walk.
///
/// `path` is always relative and slash-joined; its first segment is the
/// root label (the root CID string). Only the materializer rewrites that
/// segment — the exporter never does.
pub struct Entry<'a> {
    /// Relative path, first segment = root label.
    pub path: String,
    /// Directory, file, or raw leaf.
    pub kind: EntryKind,
    /// Lazy content chunks; present iff the entry is not a directory.
    pub content: Option<FileContent<'a>>,
}

/// Lazy file content: an iterator of verified chunk bytes in file order.
///
/// Chunks are pulled through the [`BlockSource`] only as the consumer
/// drains them, so writing entry *n* to disk overlaps naturally with the
/// walk not yet having decoded entry *n + 1*.
pub struct FileContent<'a> {
    source: &'a dyn BlockSource,
    // Pending pieces, stored reversed so the next piece pops off the end.
    pending: Vec<Piece>,
}

enum Piece {
    Inline(Bytes),
    Block(Cid),
}

impl<'a> FileContent<'a> {
    fn from_pieces(source: &'a dyn BlockSource, pieces: Vec<Piece>) -> Self {
        let mut pending = pieces;
        pending.reverse();
        Self { source, pending }
    }

    fn inline(source: &'a dyn BlockSource, bytes: Bytes) -> Self {
        Self::from_pieces(source, vec![Piece::Inline(bytes)])
    }

    /// Content of a dag-pb file node: inline data when the node has no
    /// links, otherwise its chunk links in order.
    fn for_file_node(source: &'a dyn BlockSource, node: &PbNode, envelope: UnixFsData) -> Self {
        if node.links.is_empty() {
            return Self::inline(source, Bytes::from(envelope.data));
        }
        let pieces = node
            .links
            .iter()
            .map(|link| Piece::Block(link.cid.clone()))
            .collect();
        Self::from_pieces(source, pieces)
    }

    /// Drain the remaining chunks into one buffer. Test-friendly; the
    /// materializer streams chunk by chunk instead.
    pub fn read_to_vec(&mut self) -> Result<Vec<u8>, ExportError> {
        let mut out = Vec::new();
        for chunk in self {
            out.extend_from_slice(&chunk?);
        }
        Ok(out)
    }
}

impl Iterator for FileContent<'_> {
    type Item = Result<Bytes, ExportError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let piece = self.pending.pop()?;
            match piece {
                Piece::Inline(bytes) => return Some(Ok(bytes)),
                Piece::Block(cid) => match self.resolve(&cid) {
                    Ok(Some(bytes)) => return Some(Ok(bytes)),
                    // An intermediate chunk node: its links were pushed,
                    // keep pulling.
                    Ok(None) => {}
                    Err(err) => {
                        self.pending.clear();
                        return Some(Err(err));
                    }
                },
            }
        }
    }
}

impl FileContent<'_> {
    /// Resolve one chunk CID: raw leaves and inline file nodes yield bytes
    /// directly; an intermediate chunk node expands into its links.
    fn resolve(&mut self, cid: &Cid) -> Result<Option<Bytes>, ExportError> {
        let bytes = self.source.get(cid)?;
        match cid.codec() {
            RAW => Ok(Some(bytes)),
            DAG_PB => {
                let node = PbNode::decode(&bytes)?;
                let envelope = decode_envelope(&node)?;
                match envelope.kind {
                    UnixFsType::File | UnixFsType::Raw => {
                        if node.links.is_empty() {
                            return Ok(Some(Bytes::from(envelope.data)));
                        }
                        for link in node.links.iter().rev() {
                            self.pending.push(Piece::Block(link.cid.clone()));
                        }
                        Ok(None)
                    }
                    other => Err(ExportError::UnsupportedNodeType(other.as_str())),
                }
            }
            other => Err(ExportError::UnsupportedCodec(other)),
        }
    }
}

/// Walk the DAG rooted at `root`, yielding entries in canonical order.
///
/// The root label (first path segment of every entry) is the root CID
/// string. A raw-codec root yields exactly one [`EntryKind::RawLeaf`]
/// entry; a directory root yields itself first, then its descendants.
pub fn export<'a>(root: &Cid, source: &'a dyn BlockSource) -> Exporter<'a> {
    Exporter {
        source,
        stack: vec![(root.clone(), root.to_string())],
        failed: false,
    }
}

/// The lazy DAG walk. See [`export`].
pub struct Exporter<'a> {
    source: &'a dyn BlockSource,
    // Depth-first worklist; children pushed reversed so the first link is
    // visited first.
    stack: Vec<(Cid, String)>,
    failed: bool,
}

impl<'a> Exporter<'a> {
    fn step(&mut self, cid: Cid, path: String) -> Result<Entry<'a>, ExportError> {
        let bytes = self.source.get(&cid)?;
        match cid.codec() {
            RAW => Ok(Entry {
                path,
                kind: EntryKind::RawLeaf,
                content: Some(FileContent::inline(self.source, bytes)),
            }),
            DAG_PB => {
                let node = PbNode::decode(&bytes)?;
                let envelope = decode_envelope(&node)?;
                match envelope.kind {
                    UnixFsType::Directory => {
                        for link in node.links.iter().rev() {
                            check_link_name(&link.name)?;
                            self.stack
                                .push((link.cid.clone(), format!("{path}/{}", link.name)));
                        }
                        Ok(Entry {
                            path,
                            kind: EntryKind::Directory,
                            content: None,
                        })
                    }
                    UnixFsType::File | UnixFsType::Raw => Ok(Entry {
                        path,
                        kind: EntryKind::File,
                        content: Some(FileContent::for_file_node(self.source, &node, envelope)),
                    }),
                    other => Err(ExportError::UnsupportedNodeType(other.as_str())),
                }
            }
            other => Err(ExportError::UnsupportedCodec(other)),
        }
    }
}

impl<'a> Iterator for Exporter<'a> {
    type Item = Result<Entry<'a>, ExportError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let (cid, path) = self.stack.pop()?;
        match self.step(cid, path) {
            Ok(entry) => Some(Ok(entry)),
            Err(err) => {
                self.failed = true;
                self.stack.clear();
                Some(Err(err))
            }
        }
    }
}

/// Directory link names become on-disk path segments verbatim, and the
/// container supplying them is untrusted. Anything that is not exactly one
/// plain segment is rejected before the walk descends into it.
fn check_link_name(name: &str) -> Result<(), ExportError> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0')
    {
        return Err(ExportError::UnsafeLinkName(name.to_string()));
    }
    Ok(())
}

fn decode_envelope(node: &PbNode) -> Result<UnixFsData, ExportError> {
    let data = node
        .data
        .as_ref()
        .ok_or_else(|| ExportError::InvalidUnixFs("dag-pb node without unixfs envelope".into()))?;
    UnixFsData::decode(data)
}

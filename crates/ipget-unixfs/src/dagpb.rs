//! # dag-pb — MerkleDAG Protobuf Nodes
//!
//! A dag-pb block is a `PBNode`: an optional `Data` payload (field 1) and
//! repeated `PBLink`s (field 2), each link carrying a binary CID, a name,
//! and a cumulative target size. Link order is preserved exactly as it
//! appears on the wire; for UnixFS directories that order is the canonical
//! child order and nothing downstream re-sorts it.

use bytes::Bytes;
use ipget_core::Cid;

use crate::error::ExportError;
use crate::pb::{PbReader, PbValue};

/// A reference from a dag-pb node to a child block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PbLink {
    /// Address of the child block.
    pub cid: Cid,
    /// Link name; the child's path segment in a directory node, empty for
    /// file chunks.
    pub name: String,
    /// Cumulative size of the target subtree, when the encoder recorded it.
    pub tsize: Option<u64>,
}

/// A decoded dag-pb node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PbNode {
    /// Child links in wire order.
    pub links: Vec<PbLink>,
    /// The opaque payload; for UnixFS blocks this is the envelope decoded
    /// by [`crate::UnixFsData`].
    pub data: Option<Bytes>,
}

impl PbNode {
    /// Decode a dag-pb block.
    ///
    /// Unknown fields are skipped; a structurally broken message or an
    /// undecodable link CID is [`ExportError::InvalidDagPb`].
    pub fn decode(buf: &[u8]) -> Result<Self, ExportError> {
        let invalid = |what: &str| ExportError::InvalidDagPb(what.to_string());
        let mut reader = PbReader::new(buf);
        let mut links = Vec::new();
        let mut data = None;
        while let Some((field, value)) = reader
            .next_field()
            .map_err(|e| ExportError::InvalidDagPb(e.to_string()))?
        {
            match (field, value) {
                (1, PbValue::Bytes(bytes)) => data = Some(Bytes::copy_from_slice(bytes)),
                (2, PbValue::Bytes(bytes)) => links.push(PbLink::decode(bytes)?),
                (1 | 2, _) => return Err(invalid("wrong wire type for node field")),
                // Unknown fields are tolerated.
                _ => {}
            }
        }
        Ok(Self { links, data })
    }
}

impl PbLink {
    fn decode(buf: &[u8]) -> Result<Self, ExportError> {
        let invalid = |what: &str| ExportError::InvalidDagPb(what.to_string());
        let mut reader = PbReader::new(buf);
        let mut cid = None;
        let mut name = String::new();
        let mut tsize = None;
        while let Some((field, value)) = reader
            .next_field()
            .map_err(|e| ExportError::InvalidDagPb(e.to_string()))?
        {
            match (field, value) {
                (1, PbValue::Bytes(bytes)) => {
                    cid = Some(
                        Cid::from_bytes(bytes)
                            .map_err(|e| ExportError::InvalidDagPb(format!("link hash: {e}")))?,
                    );
                }
                (2, PbValue::Bytes(bytes)) => {
                    name = String::from_utf8(bytes.to_vec())
                        .map_err(|_| invalid("non-utf8 link name"))?;
                }
                (3, PbValue::Varint(size)) => tsize = Some(size),
                (1..=3, _) => return Err(invalid("wrong wire type for link field")),
                _ => {}
            }
        }
        let cid = cid.ok_or_else(|| invalid("link missing hash"))?;
        Ok(Self { cid, name, tsize })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pb::test_encode::{dag_pb, field_bytes};
    use ipget_core::{Multihash, RAW};

    fn leaf_cid(data: &[u8]) -> Cid {
        Cid::new_v1(RAW, Multihash::sha2_256(data))
    }

    #[test]
    fn decodes_links_in_wire_order() {
        let child_b = leaf_cid(b"b");
        let child_a = leaf_cid(b"a");
        // Deliberately not name-sorted: wire order must be preserved.
        let buf = dag_pb(Some(b"payload"), &[(&child_b, "beta", 9), (&child_a, "alpha", 3)]);
        let node = PbNode::decode(&buf).unwrap();
        assert_eq!(node.data, Some(Bytes::from_static(b"payload")));
        assert_eq!(
            node.links,
            vec![
                PbLink {
                    cid: child_b,
                    name: "beta".into(),
                    tsize: Some(9)
                },
                PbLink {
                    cid: child_a,
                    name: "alpha".into(),
                    tsize: Some(3)
                },
            ]
        );
    }

    #[test]
    fn decodes_node_without_links_or_data() {
        let node = PbNode::decode(&[]).unwrap();
        assert!(node.links.is_empty());
        assert!(node.data.is_none());
    }

    #[test]
    fn rejects_link_without_hash() {
        let mut link = Vec::new();
        field_bytes(2, b"orphan", &mut link);
        let mut buf = Vec::new();
        field_bytes(2, &link, &mut buf);
        assert!(matches!(
            PbNode::decode(&buf),
            Err(ExportError::InvalidDagPb(_))
        ));
    }

    #[test]
    fn rejects_undecodable_link_cid() {
        let mut link = Vec::new();
        field_bytes(1, b"\x01\x55", &mut link); // truncated binary cid
        let mut buf = Vec::new();
        field_bytes(2, &link, &mut buf);
        assert!(matches!(
            PbNode::decode(&buf),
            Err(ExportError::InvalidDagPb(_))
        ));
    }
}

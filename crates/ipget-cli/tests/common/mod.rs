//! Builders for test fixtures: UnixFS dag-pb blocks and CARv1 containers
//! with real (verifiable) CIDs.

use ipget_core::{varint, Cid, Multihash, DAG_PB, RAW};

fn field_varint(field: u64, value: u64, out: &mut Vec<u8>) {
    varint::write_u64(field << 3, out);
    varint::write_u64(value, out);
}

fn field_bytes(field: u64, value: &[u8], out: &mut Vec<u8>) {
    varint::write_u64(field << 3 | 2, out);
    varint::write_u64(value.len() as u64, out);
    out.extend_from_slice(value);
}

/// A raw-codec leaf block.
pub fn raw_block(data: &[u8]) -> (Cid, Vec<u8>) {
    let cid = Cid::new_v1(RAW, Multihash::sha2_256(data));
    (cid, data.to_vec())
}

fn dag_pb_block(bytes: Vec<u8>) -> (Cid, Vec<u8>) {
    let cid = Cid::new_v1(DAG_PB, Multihash::sha2_256(&bytes));
    (cid, bytes)
}

fn unixfs_envelope(kind: u64, data: &[u8], blocksizes: &[u64]) -> Vec<u8> {
    let mut out = Vec::new();
    field_varint(1, kind, &mut out);
    if !data.is_empty() {
        field_bytes(2, data, &mut out);
    }
    for &size in blocksizes {
        field_varint(4, size, &mut out);
    }
    out
}

fn dag_pb(data: &[u8], links: &[(&Cid, &str, u64)]) -> Vec<u8> {
    let mut out = Vec::new();
    for (cid, name, tsize) in links {
        let mut link = Vec::new();
        field_bytes(1, &cid.to_bytes(), &mut link);
        field_bytes(2, name.as_bytes(), &mut link);
        field_varint(3, *tsize, &mut link);
        field_bytes(2, &link, &mut out);
    }
    field_bytes(1, data, &mut out);
    out
}

/// A UnixFS directory block over `(cid, name)` children.
pub fn dir_block(links: &[(&Cid, &str)]) -> (Cid, Vec<u8>) {
    let envelope = unixfs_envelope(1, &[], &[]);
    let links: Vec<_> = links.iter().map(|(cid, name)| (*cid, *name, 0)).collect();
    dag_pb_block(dag_pb(&envelope, &links))
}

/// A UnixFS file block with inline content.
pub fn file_block(content: &[u8]) -> (Cid, Vec<u8>) {
    dag_pb_block(dag_pb(&unixfs_envelope(2, content, &[]), &[]))
}

/// A UnixFS file block whose content lives in linked chunk blocks.
pub fn chunked_file_block(chunks: &[(&Cid, u64)]) -> (Cid, Vec<u8>) {
    let sizes: Vec<u64> = chunks.iter().map(|(_, size)| *size).collect();
    let envelope = unixfs_envelope(2, &[], &sizes);
    let links: Vec<_> = chunks.iter().map(|(cid, size)| (*cid, "", *size)).collect();
    dag_pb_block(dag_pb(&envelope, &links))
}

/// Assemble a CARv1 byte stream for one root and its blocks.
pub fn car_bytes(root: &Cid, blocks: &[(Cid, Vec<u8>)]) -> Vec<u8> {
    // Header: dag-cbor {roots: [tag42(0x00 || cid)], version: 1}.
    let mut header = vec![0xa2, 0x65];
    header.extend_from_slice(b"roots");
    header.push(0x81);
    header.extend_from_slice(&[0xd8, 0x2a, 0x58]);
    let cid_bytes = root.to_bytes();
    header.push(cid_bytes.len() as u8 + 1);
    header.push(0x00);
    header.extend_from_slice(&cid_bytes);
    header.push(0x67);
    header.extend_from_slice(b"version");
    header.push(0x01);

    let mut out = Vec::new();
    varint::write_u64(header.len() as u64, &mut out);
    out.extend_from_slice(&header);
    for (cid, data) in blocks {
        let cid_bytes = cid.to_bytes();
        varint::write_u64((cid_bytes.len() + data.len()) as u64, &mut out);
        out.extend_from_slice(&cid_bytes);
        out.extend_from_slice(data);
    }
    out
}

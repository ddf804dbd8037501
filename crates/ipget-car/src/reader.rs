//! # CAR Section Reading
//!
//! After the header, a CARv1 stream is a run of sections, each
//! `varint(len) || CID || block bytes` with `len` covering the CID and the
//! bytes together. [`CarDecoder`] yields those sections lazily in stream
//! order; [`CarReader`] drains them into a CID-keyed index that serves as
//! the raw (unverified) block-access capability for the DAG walk.

use std::collections::HashMap;

use bytes::Bytes;
use ipget_core::{varint, Cid};

use crate::error::CarError;
use crate::header::CarHeader;

/// A lazy iterator over the `(Cid, Bytes)` sections of a CAR stream.
///
/// The header is decoded eagerly by [`CarDecoder::new`]; sections are
/// decoded one `next()` at a time. The first error is terminal.
pub struct CarDecoder {
    buf: Bytes,
    pos: usize,
    header: CarHeader,
}

impl CarDecoder {
    /// Decode the header and position the iterator at the first section.
    pub fn new(buf: Bytes) -> Result<Self, CarError> {
        let (header_len, used) = varint::read_u64(&buf)?;
        let header_len = usize::try_from(header_len)
            .map_err(|_| CarError::InvalidHeader("header length overflows usize".into()))?;
        if header_len == 0 {
            return Err(CarError::InvalidHeader("zero-length header".into()));
        }
        let end = used
            .checked_add(header_len)
            .filter(|end| *end <= buf.len())
            .ok_or_else(|| CarError::Truncated("header shorter than its length prefix".into()))?;
        let header = CarHeader::decode(&buf[used..end])?;
        Ok(Self {
            buf,
            pos: end,
            header,
        })
    }

    /// The decoded header.
    pub fn header(&self) -> &CarHeader {
        &self.header
    }

    fn next_section(&mut self) -> Result<Option<(Cid, Bytes)>, CarError> {
        if self.pos >= self.buf.len() {
            return Ok(None);
        }
        let (section_len, used) = varint::read_u64(&self.buf[self.pos..])?;
        let section_len = usize::try_from(section_len)
            .map_err(|_| CarError::Truncated("section length overflows usize".into()))?;
        let start = self.pos + used;
        let end = start
            .checked_add(section_len)
            .filter(|end| *end <= self.buf.len())
            .ok_or_else(|| CarError::Truncated("section shorter than its length prefix".into()))?;
        let (cid, cid_len) = Cid::read_from(&self.buf[start..end])?;
        let block = self.buf.slice(start + cid_len..end);
        self.pos = end;
        Ok(Some((cid, block)))
    }
}

impl Iterator for CarDecoder {
    type Item = Result<(Cid, Bytes), CarError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_section() {
            Ok(section) => section.map(Ok),
            Err(err) => {
                // Fuse: a broken stream cannot be re-synchronized.
                self.pos = self.buf.len();
                Some(Err(err))
            }
        }
    }
}

/// An in-memory CAR index: all sections keyed by CID, plus the header
/// roots.
///
/// `get` is the `rawGet` capability the verifying block source decorates.
/// The index holds bytes exactly as they appeared on the wire; nothing is
/// verified at insertion time.
pub struct CarReader {
    roots: Vec<Cid>,
    blocks: HashMap<Cid, Bytes>,
}

impl CarReader {
    /// Index a complete CAR byte buffer.
    ///
    /// When the stream carries multiple sections for the same CID, the
    /// first occurrence wins; under content addressing a well-formed
    /// duplicate is byte-identical anyway.
    pub fn from_bytes(buf: impl Into<Bytes>) -> Result<Self, CarError> {
        let mut decoder = CarDecoder::new(buf.into())?;
        let roots = decoder.header().roots().to_vec();
        let mut blocks = HashMap::new();
        for section in &mut decoder {
            let (cid, block) = section?;
            blocks.entry(cid).or_insert(block);
        }
        Ok(Self { roots, blocks })
    }

    /// The root CIDs declared by the header.
    pub fn roots(&self) -> &[Cid] {
        &self.roots
    }

    /// Fetch a block's (unverified) bytes by CID.
    pub fn get(&self, cid: &Cid) -> Option<Bytes> {
        self.blocks.get(cid).cloned()
    }

    /// Number of distinct blocks in the index.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True when the container carried no sections.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::test_encode::encode_header;
    use ipget_core::{Multihash, RAW};

    fn leaf(data: &[u8]) -> (Cid, Vec<u8>) {
        (Cid::new_v1(RAW, Multihash::sha2_256(data)), data.to_vec())
    }

    fn car_bytes(roots: &[Cid], blocks: &[(Cid, Vec<u8>)]) -> Vec<u8> {
        let header = encode_header(1, roots);
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

    #[test]
    fn decoder_yields_sections_in_stream_order() {
        let (cid_a, data_a) = leaf(b"first block");
        let (cid_b, data_b) = leaf(b"second block");
        let car = car_bytes(
            &[cid_a.clone()],
            &[(cid_a.clone(), data_a.clone()), (cid_b.clone(), data_b.clone())],
        );
        let decoder = CarDecoder::new(Bytes::from(car)).unwrap();
        let sections: Vec<_> = decoder.map(Result::unwrap).collect();
        assert_eq!(
            sections,
            vec![
                (cid_a, Bytes::from(data_a)),
                (cid_b, Bytes::from(data_b)),
            ]
        );
    }

    #[test]
    fn reader_indexes_blocks_and_roots() {
        let (cid_a, data_a) = leaf(b"indexed");
        let (cid_b, data_b) = leaf(b"also indexed");
        let car = car_bytes(
            &[cid_a.clone()],
            &[(cid_a.clone(), data_a.clone()), (cid_b.clone(), data_b.clone())],
        );
        let reader = CarReader::from_bytes(car).unwrap();
        assert_eq!(reader.roots(), &[cid_a.clone()]);
        assert_eq!(reader.len(), 2);
        assert_eq!(reader.get(&cid_a), Some(Bytes::from(data_a)));
        assert_eq!(reader.get(&cid_b), Some(Bytes::from(data_b)));
        let (absent, _) = leaf(b"never stored");
        assert_eq!(reader.get(&absent), None);
    }

    #[test]
    fn first_duplicate_section_wins() {
        let (cid, data) = leaf(b"duplicated");
        let car = car_bytes(
            &[cid.clone()],
            &[(cid.clone(), data.clone()), (cid.clone(), b"impostor".to_vec())],
        );
        let reader = CarReader::from_bytes(car).unwrap();
        assert_eq!(reader.len(), 1);
        assert_eq!(reader.get(&cid), Some(Bytes::from(data)));
    }

    #[test]
    fn truncated_section_is_an_error() {
        let (cid, data) = leaf(b"cut short");
        let car = car_bytes(&[cid.clone()], &[(cid, data)]);
        let cut = Bytes::from(car.clone()).slice(..car.len() - 4);
        let mut decoder = CarDecoder::new(cut).unwrap();
        assert!(matches!(decoder.next(), Some(Err(CarError::Truncated(_)))));
        assert!(decoder.next().is_none(), "decoder fuses after an error");
    }

    #[test]
    fn header_only_car_is_empty() {
        let (cid, _) = leaf(b"root only");
        let car = car_bytes(&[cid], &[]);
        let reader = CarReader::from_bytes(car).unwrap();
        assert!(reader.is_empty());
    }
}

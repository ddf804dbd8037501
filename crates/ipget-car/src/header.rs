//! # CAR Header — dag-cbor Subset Decoding
//!
//! A CARv1 header is a dag-cbor map `{version: 1, roots: [CID...]}` where
//! each root is CBOR tag 42 around the identity-multibase binary CID
//! (`0x00` prefix byte, then the CID bytes).
//!
//! Only the subset of CBOR a conforming header can contain is decoded
//! here: definite-length unsigned integers, byte and text strings, arrays,
//! maps, and tags. Anything else in the header is malformed.

use ipget_core::Cid;

use crate::error::CarError;

const CID_TAG: u64 = 42;
const IDENTITY_MULTIBASE_PREFIX: u8 = 0x00;

/// The decoded CAR header: format version and declared root CIDs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarHeader {
    version: u64,
    roots: Vec<Cid>,
}

impl CarHeader {
    /// Decode a header block.
    ///
    /// # Errors
    ///
    /// [`CarError::InvalidHeader`] for structurally malformed CBOR or a
    /// header missing its fields, [`CarError::UnsupportedVersion`] for any
    /// version other than 1, [`CarError::EmptyRoots`] when the root list
    /// is empty.
    pub fn decode(buf: &[u8]) -> Result<Self, CarError> {
        let (item, used) = read_item(buf)?;
        if used != buf.len() {
            return Err(CarError::InvalidHeader(
                "trailing bytes after header map".into(),
            ));
        }
        let Cbor::Map(pairs) = item else {
            return Err(CarError::InvalidHeader("header is not a map".into()));
        };

        let mut version = None;
        let mut roots = None;
        for (key, value) in pairs {
            let Cbor::Text(key) = key else {
                return Err(CarError::InvalidHeader("non-text header key".into()));
            };
            match (key.as_str(), value) {
                ("version", Cbor::Int(v)) => version = Some(v),
                ("version", _) => {
                    return Err(CarError::InvalidHeader("version is not an integer".into()))
                }
                ("roots", Cbor::Array(items)) => {
                    let mut cids = Vec::with_capacity(items.len());
                    for item in items {
                        cids.push(decode_root(item)?);
                    }
                    roots = Some(cids);
                }
                ("roots", _) => {
                    return Err(CarError::InvalidHeader("roots is not an array".into()))
                }
                // Unknown keys are tolerated, matching reference readers.
                _ => {}
            }
        }

        let version =
            version.ok_or_else(|| CarError::InvalidHeader("missing version field".into()))?;
        if version != 1 {
            return Err(CarError::UnsupportedVersion(version));
        }
        let roots = roots.ok_or_else(|| CarError::InvalidHeader("missing roots field".into()))?;
        if roots.is_empty() {
            return Err(CarError::EmptyRoots);
        }
        Ok(Self { version, roots })
    }

    /// The declared format version (always 1 once decoded).
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The root CIDs the container was exported for.
    pub fn roots(&self) -> &[Cid] {
        &self.roots
    }
}

fn decode_root(item: Cbor) -> Result<Cid, CarError> {
    let Cbor::Tag(tag, inner) = item else {
        return Err(CarError::InvalidHeader("root is not a tagged value".into()));
    };
    if tag != CID_TAG {
        return Err(CarError::InvalidHeader(format!(
            "root carries tag {tag}, expected {CID_TAG}"
        )));
    }
    let Cbor::Bytes(bytes) = *inner else {
        return Err(CarError::InvalidHeader("root tag is not a byte string".into()));
    };
    match bytes.split_first() {
        Some((&IDENTITY_MULTIBASE_PREFIX, cid_bytes)) => Ok(Cid::from_bytes(cid_bytes)?),
        _ => Err(CarError::InvalidHeader(
            "root cid missing identity multibase prefix".into(),
        )),
    }
}

enum Cbor {
    Int(u64),
    Bytes(Vec<u8>),
    Text(String),
    Array(Vec<Cbor>),
    Map(Vec<(Cbor, Cbor)>),
    Tag(u64, Box<Cbor>),
}

fn read_item(buf: &[u8]) -> Result<(Cbor, usize), CarError> {
    let (&initial, rest) = buf
        .split_first()
        .ok_or_else(|| CarError::InvalidHeader("unexpected end of header".into()))?;
    let major = initial >> 5;
    let (arg, mut pos) = read_argument(initial & 0x1f, rest)?;
    pos += 1;
    match major {
        0 => Ok((Cbor::Int(arg), pos)),
        2 | 3 => {
            let len = arg as usize;
            let end = pos
                .checked_add(len)
                .filter(|end| *end <= buf.len())
                .ok_or_else(|| CarError::InvalidHeader("truncated string".into()))?;
            let body = buf[pos..end].to_vec();
            let item = if major == 2 {
                Cbor::Bytes(body)
            } else {
                let text = String::from_utf8(body)
                    .map_err(|_| CarError::InvalidHeader("non-utf8 text string".into()))?;
                Cbor::Text(text)
            };
            Ok((item, end))
        }
        4 => {
            let mut items = Vec::new();
            for _ in 0..arg {
                let (item, used) = read_item(&buf[pos..])?;
                items.push(item);
                pos += used;
            }
            Ok((Cbor::Array(items), pos))
        }
        5 => {
            let mut pairs = Vec::new();
            for _ in 0..arg {
                let (key, used) = read_item(&buf[pos..])?;
                pos += used;
                let (value, used) = read_item(&buf[pos..])?;
                pos += used;
                pairs.push((key, value));
            }
            Ok((Cbor::Map(pairs), pos))
        }
        6 => {
            let (inner, used) = read_item(&buf[pos..])?;
            Ok((Cbor::Tag(arg, Box::new(inner)), pos + used))
        }
        other => Err(CarError::InvalidHeader(format!(
            "unexpected cbor major type {other} in header"
        ))),
    }
}

/// Decode the argument that follows an initial byte, returning the value
/// and how many additional bytes it occupied.
fn read_argument(additional: u8, rest: &[u8]) -> Result<(u64, usize), CarError> {
    let width = match additional {
        0..=23 => return Ok((u64::from(additional), 0)),
        24 => 1,
        25 => 2,
        26 => 4,
        27 => 8,
        _ => {
            return Err(CarError::InvalidHeader(
                "indefinite-length item in header".into(),
            ))
        }
    };
    if rest.len() < width {
        return Err(CarError::InvalidHeader("truncated cbor argument".into()));
    }
    let mut value: u64 = 0;
    for &byte in &rest[..width] {
        value = value << 8 | u64::from(byte);
    }
    Ok((value, width))
}


#[cfg(test)]
mod tests {
    use super::test_encode::encode_header;
    use super::*;
    use ipget_core::{Multihash, DAG_PB};

    fn test_cid(data: &[u8]) -> Cid {
        Cid::new_v1(DAG_PB, Multihash::sha2_256(data))
    }

    fn cbor_text(s: &str, out: &mut Vec<u8>) {
        out.push(0x60 | s.len() as u8);
        out.extend_from_slice(s.as_bytes());
    }

    #[test]
    fn decodes_roots_and_version() {
        let roots = [test_cid(b"a"), test_cid(b"b")];
        let header = CarHeader::decode(&encode_header(1, &roots)).unwrap();
        assert_eq!(header.version(), 1);
        assert_eq!(header.roots(), &roots);
    }

    #[test]
    fn rejects_other_versions() {
        let err = CarHeader::decode(&encode_header(2, &[test_cid(b"a")])).unwrap_err();
        assert!(matches!(err, CarError::UnsupportedVersion(2)));
    }

    #[test]
    fn rejects_empty_roots() {
        let err = CarHeader::decode(&encode_header(1, &[])).unwrap_err();
        assert!(matches!(err, CarError::EmptyRoots));
    }

    #[test]
    fn rejects_missing_fields() {
        // map(1) with only a version entry
        let mut buf = vec![0xa1];
        cbor_text("version", &mut buf);
        buf.push(0x01);
        assert!(matches!(
            CarHeader::decode(&buf),
            Err(CarError::InvalidHeader(_))
        ));
    }

    #[test]
    fn rejects_untagged_roots() {
        let mut buf = vec![0xa2];
        cbor_text("roots", &mut buf);
        buf.push(0x81); // array(1)
        buf.push(0x41); // bytes(1) -- missing tag 42
        buf.push(0x00);
        cbor_text("version", &mut buf);
        buf.push(0x01);
        assert!(matches!(
            CarHeader::decode(&buf),
            Err(CarError::InvalidHeader(_))
        ));
    }

    #[test]
    fn rejects_truncated_header() {
        let buf = encode_header(1, &[test_cid(b"a")]);
        assert!(CarHeader::decode(&buf[..buf.len() - 3]).is_err());
    }
}

//! # CID — Self-Describing Content Identifiers
//!
//! A CID names a block of bytes by the digest of those bytes, together
//! with the codec the bytes should be decoded with and the hash function
//! that produced the digest. Two CIDs are equal iff every field matches
//! byte-for-byte; a CID is an opaque key and never carries the payload.
//!
//! Supported forms:
//!
//! - **CIDv0** text: a bare base58btc multihash (`Qm...`), implicitly
//!   dag-pb + SHA-2-256.
//! - **CIDv1** text: multibase prefix `b` followed by lowercase unpadded
//!   RFC 4648 base32 of the binary form.
//! - **Binary** (as embedded in CAR sections and dag-pb links): either the
//!   34-byte v0 multihash or `varint version || varint codec || multihash`.

use std::fmt;
use std::str::FromStr;

use base32::Alphabet;
use base58::{FromBase58, ToBase58};

use crate::error::CidError;
use crate::multihash::{Multihash, SHA2_256};
use crate::varint;

/// Multicodec tag for raw byte leaves.
pub const RAW: u64 = 0x55;
/// Multicodec tag for dag-pb (MerkleDAG protobuf) nodes.
pub const DAG_PB: u64 = 0x70;

const V0_DIGEST_LEN: usize = 32;
const MULTIBASE_BASE32: char = 'b';
const BASE32_ALPHABET: Alphabet = Alphabet::Rfc4648 { padding: false };

/// A content identifier: version, codec tag, and multihash.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cid {
    version: u8,
    codec: u64,
    multihash: Multihash,
}

impl Cid {
    /// Construct a CIDv0. Only SHA-2-256 with a 32-byte digest is legal in
    /// version 0; the codec is implicitly dag-pb.
    pub fn new_v0(multihash: Multihash) -> Result<Self, CidError> {
        if multihash.code() != SHA2_256 || multihash.digest().len() != V0_DIGEST_LEN {
            return Err(CidError::Malformed(
                "cid v0 requires a 32-byte sha2-256 multihash".into(),
            ));
        }
        Ok(Self {
            version: 0,
            codec: DAG_PB,
            multihash,
        })
    }

    /// Construct a CIDv1 with an explicit codec tag.
    pub fn new_v1(codec: u64, multihash: Multihash) -> Self {
        Self {
            version: 1,
            codec,
            multihash,
        }
    }

    /// The CID version (0 or 1).
    pub fn version(&self) -> u8 {
        self.version
    }

    /// The multicodec tag naming the codec the block decodes with.
    pub fn codec(&self) -> u64 {
        self.codec
    }

    /// The embedded multihash.
    pub fn multihash(&self) -> &Multihash {
        &self.multihash
    }

    /// Decode a binary CID from the front of `buf`, returning it together
    /// with the number of bytes consumed. CAR sections and dag-pb link
    /// hashes store CIDs with no length delimiter, so the caller needs the
    /// consumed count to find the payload that follows.
    pub fn read_from(buf: &[u8]) -> Result<(Self, usize), CidError> {
        // A leading 0x12 can only be the sha2-256 code of a v0 multihash:
        // there is no CID version 18.
        if buf.first() == Some(&0x12) {
            if buf.len() < 2 + V0_DIGEST_LEN || buf[1] != V0_DIGEST_LEN as u8 {
                return Err(CidError::Malformed("truncated cid v0 multihash".into()));
            }
            let digest = buf[2..2 + V0_DIGEST_LEN].to_vec();
            let cid = Self::new_v0(Multihash::new(SHA2_256, digest))?;
            return Ok((cid, 2 + V0_DIGEST_LEN));
        }
        let (version, n) = varint::read_u64(buf)?;
        if version != 1 {
            return Err(CidError::Malformed(format!(
                "unsupported cid version {version}"
            )));
        }
        let (codec, m) = varint::read_u64(&buf[n..])?;
        let (multihash, used) = Multihash::read_from(&buf[n + m..])?;
        Ok((Self::new_v1(codec, multihash), n + m + used))
    }

    /// Decode a binary CID that must occupy the whole buffer.
    pub fn from_bytes(buf: &[u8]) -> Result<Self, CidError> {
        let (cid, used) = Self::read_from(buf)?;
        if used != buf.len() {
            return Err(CidError::Malformed(format!(
                "{} trailing bytes after cid",
                buf.len() - used
            )));
        }
        Ok(cid)
    }

    /// The binary encoding of this CID.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        if self.version == 0 {
            self.multihash.write_to(&mut out);
        } else {
            varint::write_u64(u64::from(self.version), &mut out);
            varint::write_u64(self.codec, &mut out);
            self.multihash.write_to(&mut out);
        }
        out
    }
}

impl FromStr for Cid {
    type Err = CidError;

    /// Parse a CID text form.
    ///
    /// # Errors
    ///
    /// [`CidError::Malformed`] for anything that is not a valid CIDv0 or
    /// base32 CIDv1 string: wrong multibase prefix, characters outside the
    /// base alphabet, truncated multihash, or a non-v1 version varint.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == 46 && s.starts_with("Qm") {
            let bytes = s
                .from_base58()
                .map_err(|_| CidError::Malformed(format!("invalid base58 in {s:?}")))?;
            let cid = Self::from_bytes(&bytes)?;
            if cid.version != 0 {
                return Err(CidError::Malformed(format!(
                    "expected a v0 multihash in {s:?}"
                )));
            }
            return Ok(cid);
        }
        match s.chars().next() {
            Some(MULTIBASE_BASE32) => {
                let body = &s[1..];
                if body.is_empty() || body.chars().any(|c| c.is_ascii_uppercase()) {
                    return Err(CidError::Malformed(format!("invalid base32 cid {s:?}")));
                }
                let bytes = base32::decode(BASE32_ALPHABET, &body.to_ascii_uppercase())
                    .ok_or_else(|| CidError::Malformed(format!("invalid base32 in {s:?}")))?;
                let cid = Self::from_bytes(&bytes)?;
                if cid.version == 0 {
                    return Err(CidError::Malformed(format!(
                        "v0 multihash under multibase prefix in {s:?}"
                    )));
                }
                Ok(cid)
            }
            Some(prefix) => Err(CidError::Malformed(format!(
                "unsupported multibase prefix {prefix:?} in {s:?}"
            ))),
            None => Err(CidError::Malformed("empty cid".into())),
        }
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version == 0 {
            f.write_str(&self.to_bytes().to_base58())
        } else {
            let body = base32::encode(BASE32_ALPHABET, &self.to_bytes()).to_ascii_lowercase();
            write!(f, "{MULTIBASE_BASE32}{body}")
        }
    }
}

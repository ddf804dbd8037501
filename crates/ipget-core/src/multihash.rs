//! # Multihash — Self-Describing Digests
//!
//! A multihash pairs a hash-function code with the digest that function
//! produced, so a digest can be re-verified without out-of-band knowledge
//! of how it was computed.
//!
//! ## Security Invariant
//!
//! The dispatch table is a closed, explicitly enumerated set (SHA-2-256
//! and SHA-2-512). A code outside the table is
//! [`CidError::UnsupportedHashFunction`] — verification never degrades to
//! "assume it matches".

use sha2::{Digest, Sha256, Sha512};

use crate::cid::Cid;
use crate::error::CidError;
use crate::varint;

/// Multicodec code for SHA-2-256.
pub const SHA2_256: u64 = 0x12;
/// Multicodec code for SHA-2-512.
pub const SHA2_512: u64 = 0x13;

/// A hash-function code plus the digest it produced.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Multihash {
    code: u64,
    digest: Vec<u8>,
}

impl Multihash {
    /// Wrap an already-computed digest with its function code.
    ///
    /// The code is not checked here; an unsupported code surfaces later,
    /// when something tries to re-verify through [`digest_of`].
    pub fn new(code: u64, digest: Vec<u8>) -> Self {
        Self { code, digest }
    }

    /// Compute the SHA-2-256 multihash of `data`.
    pub fn sha2_256(data: &[u8]) -> Self {
        Self {
            code: SHA2_256,
            digest: Sha256::digest(data).to_vec(),
        }
    }

    /// The hash-function code.
    pub fn code(&self) -> u64 {
        self.code
    }

    /// The raw digest bytes.
    pub fn digest(&self) -> &[u8] {
        &self.digest
    }

    /// Decode a binary multihash (`varint code || varint size || digest`)
    /// from the front of `buf`, returning it with the byte count consumed.
    pub fn read_from(buf: &[u8]) -> Result<(Self, usize), CidError> {
        let (code, n) = varint::read_u64(buf)?;
        let (size, m) = varint::read_u64(&buf[n..])?;
        let start = n + m;
        let size = usize::try_from(size)
            .map_err(|_| CidError::Malformed("multihash digest length overflows usize".into()))?;
        let end = start
            .checked_add(size)
            .filter(|end| *end <= buf.len())
            .ok_or_else(|| CidError::Malformed("truncated multihash digest".into()))?;
        Ok((Self::new(code, buf[start..end].to_vec()), end))
    }

    /// Append the binary encoding to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        varint::write_u64(self.code, out);
        varint::write_u64(self.digest.len() as u64, out);
        out.extend_from_slice(&self.digest);
    }
}

/// Compute the digest of `data` with the hash function named by `code`.
///
/// # Errors
///
/// [`CidError::UnsupportedHashFunction`] when `code` is outside the
/// supported table.
pub fn digest_of(code: u64, data: &[u8]) -> Result<Vec<u8>, CidError> {
    match code {
        SHA2_256 => Ok(Sha256::digest(data).to_vec()),
        SHA2_512 => Ok(Sha512::digest(data).to_vec()),
        other => Err(CidError::UnsupportedHashFunction(other)),
    }
}

/// Check a block's bytes against the digest embedded in its address.
///
/// Returns `Ok(true)` iff the recomputed digest equals the embedded digest
/// byte-for-byte. This is an integrity check, not a secrecy boundary, so
/// the comparison need not be constant-time. The input is never mutated.
pub fn verify(cid: &Cid, bytes: &[u8]) -> Result<bool, CidError> {
    let mh = cid.multihash();
    let computed = digest_of(mh.code(), bytes)?;
    Ok(computed == mh.digest())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cid::RAW;

    fn raw_cid(data: &[u8]) -> Cid {
        Cid::new_v1(RAW, Multihash::sha2_256(data))
    }

    #[test]
    fn verify_accepts_matching_bytes() {
        let data = b"hello verified world";
        assert!(verify(&raw_cid(data), data).unwrap());
    }

    #[test]
    fn verify_rejects_any_single_bit_flip() {
        let data = b"short block".to_vec();
        let cid = raw_cid(&data);
        for byte in 0..data.len() {
            for bit in 0..8 {
                let mut mutated = data.clone();
                mutated[byte] ^= 1 << bit;
                assert!(!verify(&cid, &mutated).unwrap(), "byte {byte} bit {bit}");
            }
        }
    }

    #[test]
    fn verify_supports_sha2_512() {
        let data = b"wider digest";
        let mh = Multihash::new(SHA2_512, digest_of(SHA2_512, data).unwrap());
        let cid = Cid::new_v1(RAW, mh);
        assert!(verify(&cid, data).unwrap());
        assert!(!verify(&cid, b"other bytes").unwrap());
    }

    #[test]
    fn unknown_hash_function_is_a_hard_error() {
        let mh = Multihash::new(0x99, vec![0u8; 32]);
        let cid = Cid::new_v1(RAW, mh);
        assert_eq!(
            verify(&cid, b"anything"),
            Err(CidError::UnsupportedHashFunction(0x99))
        );
    }

    #[test]
    fn multihash_binary_roundtrip() {
        let mh = Multihash::sha2_256(b"roundtrip");
        let mut buf = Vec::new();
        mh.write_to(&mut buf);
        buf.extend_from_slice(b"tail");
        let (decoded, used) = Multihash::read_from(&buf).unwrap();
        assert_eq!(decoded, mh);
        assert_eq!(used, buf.len() - 4);
    }

    #[test]
    fn truncated_digest_rejected() {
        let mut buf = Vec::new();
        varint::write_u64(SHA2_256, &mut buf);
        varint::write_u64(32, &mut buf);
        buf.extend_from_slice(&[0u8; 16]);
        assert!(matches!(
            Multihash::read_from(&buf),
            Err(CidError::Malformed(_))
        ));
    }
}

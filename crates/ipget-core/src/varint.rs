//! # Unsigned LEB128 Varints
//!
//! The multiformats family encodes all tags and lengths as unsigned
//! LEB128 varints. Both the CID codec and the CAR container reader decode
//! through this module.

use crate::error::VarintError;

/// Decode an unsigned varint from the front of `buf`.
///
/// Returns the value and the number of bytes consumed.
///
/// # Errors
///
/// [`VarintError::Truncated`] if the buffer ends mid-varint,
/// [`VarintError::Overflow`] if the value exceeds 64 bits.
pub fn read_u64(buf: &[u8]) -> Result<(u64, usize), VarintError> {
    let mut value: u64 = 0;
    for (i, &byte) in buf.iter().enumerate() {
        if i >= 10 || (i == 9 && byte > 0x01) {
            return Err(VarintError::Overflow);
        }
        value |= u64::from(byte & 0x7f) << (i * 7);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(VarintError::Truncated)
}

/// Append the unsigned varint encoding of `value` to `out`.
pub fn write_u64(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(value: u64) {
        let mut buf = Vec::new();
        write_u64(value, &mut buf);
        assert_eq!(read_u64(&buf), Ok((value, buf.len())));
    }

    #[test]
    fn roundtrips() {
        for value in [0, 1, 127, 128, 255, 300, 0x55, 0x70, u64::MAX] {
            roundtrip(value);
        }
    }

    #[test]
    fn consumed_length_stops_at_terminator() {
        let mut buf = Vec::new();
        write_u64(300, &mut buf);
        buf.extend_from_slice(b"trailing");
        let (value, used) = read_u64(&buf).unwrap();
        assert_eq!(value, 300);
        assert_eq!(used, 2);
    }

    #[test]
    fn truncated_input_rejected() {
        assert_eq!(read_u64(&[0x80]), Err(VarintError::Truncated));
        assert_eq!(read_u64(&[]), Err(VarintError::Truncated));
    }

    #[test]
    fn overlong_input_rejected() {
        let buf = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x7f];
        assert_eq!(read_u64(&buf), Err(VarintError::Overflow));
    }
}

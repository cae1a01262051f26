use std::mem::size_of;
use std::str;

use crate::packet::MalformedPacket;

/// Types that can be parsed out of a raw datagram.
pub trait FromBytes: Sized {
    /// The error produced when the bytes do not describe a `Self`.
    type Error;

    /// Tries to produce a `Self` from `bytes`.
    fn from_bytes<T: AsRef<[u8]>>(bytes: T) -> Result<Self, Self::Error>;
}

/// Types that can be serialized onto the wire.
pub trait IntoBytes {
    /// Consumes `self`, producing its wire representation.
    fn into_bytes(self) -> Vec<u8>;
}

pub(crate) struct Bytes<T>(pub(crate) T);

impl Bytes<u16> {
    pub fn new(val: u16) -> Self {
        Self(val)
    }

    pub fn into_inner(self) -> u16 {
        self.0
    }
}

impl FromBytes for Bytes<u16> {
    type Error = MalformedPacket;

    fn from_bytes<T: AsRef<[u8]>>(bytes: T) -> Result<Self, MalformedPacket> {
        let bytes = bytes.as_ref();

        if bytes.len() != size_of::<u16>() {
            return Err(MalformedPacket::BadLength(bytes.len()));
        }

        let mut bs = [0u8; size_of::<u16>()];
        bs.copy_from_slice(bytes);

        Ok(Self(u16::from_be_bytes(bs)))
    }
}

impl IntoBytes for Bytes<u16> {
    fn into_bytes(self) -> Vec<u8> {
        self.0.to_be_bytes().to_vec()
    }
}

impl IntoBytes for Bytes<&str> {
    fn into_bytes(self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.0.len() + 1);
        bytes.extend_from_slice(self.0.as_bytes());
        bytes.push(0);
        bytes
    }
}

/// Splits a 2-byte big-endian field off the front of `bytes`.
pub(crate) fn take_u16(bytes: &[u8]) -> Result<(u16, &[u8]), MalformedPacket> {
    if bytes.len() < size_of::<u16>() {
        return Err(MalformedPacket::TooShort {
            needed: size_of::<u16>(),
            got: bytes.len(),
        });
    }

    let (field, rest) = bytes.split_at(size_of::<u16>());
    let val = Bytes::<u16>::from_bytes(field)?.into_inner();
    Ok((val, rest))
}

/// Splits a NUL-terminated string off the front of `bytes`. The terminator
/// is consumed but not included in the returned slice.
pub(crate) fn take_cstr(bytes: &[u8]) -> Result<(&[u8], &[u8]), MalformedPacket> {
    let nul = bytes
        .iter()
        .position(|b| *b == 0)
        .ok_or(MalformedPacket::MissingTerminator)?;

    Ok((&bytes[..nul], &bytes[nul + 1..]))
}

pub(crate) fn take_str(bytes: &[u8]) -> Result<(&str, &[u8]), MalformedPacket> {
    let (s, rest) = take_cstr(bytes)?;
    let s = str::from_utf8(s).map_err(|_| MalformedPacket::InvalidText)?;
    Ok((s, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u16_is_big_endian() {
        assert_eq!(Bytes::new(0x0102).into_bytes(), vec![0x01, 0x02]);
        assert_eq!(Bytes::<u16>::from_bytes([0xff, 0x00]).unwrap().into_inner(), 0xff00);
        assert!(Bytes::<u16>::from_bytes([0x01]).is_err());
    }

    #[test]
    fn test_take_cstr_stops_at_first_nul() {
        let (s, rest) = take_str(b"hi.txt\0octet\0").unwrap();
        assert_eq!(s, "hi.txt");
        assert_eq!(rest, b"octet\0");

        let (s, rest) = take_str(rest).unwrap();
        assert_eq!(s, "octet");
        assert!(rest.is_empty());
    }

    #[test]
    fn test_take_cstr_without_terminator() {
        assert_eq!(take_cstr(b"no terminator"), Err(MalformedPacket::MissingTerminator));
        assert_eq!(take_cstr(b""), Err(MalformedPacket::MissingTerminator));
    }

    #[test]
    fn test_take_str_rejects_invalid_utf8() {
        assert_eq!(take_str(&[0xff, 0xfe, 0x00]), Err(MalformedPacket::InvalidText));
    }
}

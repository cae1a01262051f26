use std::mem::size_of;

use super::{Block, MalformedPacket};
use crate::bytes::{take_u16, FromBytes, IntoBytes};

/// Acknowledges a `Data` block, or with block 0, a write request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Ack {
    /// The acknowledged block.
    pub block: Block,
}

impl FromBytes for Ack {
    type Error = MalformedPacket;

    fn from_bytes<T: AsRef<[u8]>>(bytes: T) -> Result<Self, MalformedPacket> {
        let bytes = bytes.as_ref();

        if bytes.len() != size_of::<u16>() {
            return Err(MalformedPacket::BadLength(bytes.len()));
        }

        let (block, _) = take_u16(bytes)?;

        Ok(Self {
            block: Block(block),
        })
    }
}

impl IntoBytes for Ack {
    fn into_bytes(self) -> Vec<u8> {
        self.block.into_bytes()
    }
}

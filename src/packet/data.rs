use super::{Block, MalformedPacket, MAX_PAYLOAD_SIZE};
use crate::bytes::{take_u16, FromBytes, IntoBytes};

/// One block of file contents. A payload shorter than
/// [`MAX_PAYLOAD_SIZE`] marks the end of the transfer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Data {
    /// The block number, starting at 1.
    pub block: Block,

    /// Up to 512 bytes of file contents.
    pub data: Vec<u8>,
}

impl Data {
    /// Creates a new `Data` packet body.
    pub fn new<T: AsRef<[u8]>>(block: Block, data: T) -> Self {
        Self {
            block,
            data: data.as_ref().to_vec(),
        }
    }

    /// Whether this is the final block of a transfer.
    pub fn is_last(&self) -> bool {
        self.data.len() < MAX_PAYLOAD_SIZE
    }
}

impl FromBytes for Data {
    type Error = MalformedPacket;

    fn from_bytes<T: AsRef<[u8]>>(bytes: T) -> Result<Self, MalformedPacket> {
        let (block, data) = take_u16(bytes.as_ref())?;

        if data.len() > MAX_PAYLOAD_SIZE {
            return Err(MalformedPacket::PayloadTooLarge(data.len()));
        }

        Ok(Self {
            block: Block(block),
            data: data.to_vec(),
        })
    }
}

impl IntoBytes for Data {
    fn into_bytes(self) -> Vec<u8> {
        let mut bytes = self.block.into_bytes();
        bytes.extend_from_slice(&self.data);
        bytes
    }
}

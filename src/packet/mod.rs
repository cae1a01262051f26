//! Types that represent TFTP packets and their wire format.
//!
//! Every packet starts with a 2-byte big-endian [`Opcode`]. The remainder is
//! parsed by a bounded decoder: a short buffer, an unknown opcode or a
//! missing NUL terminator produces a [`MalformedPacket`], never a panic.

use std::fmt;

use thiserror::Error;

use crate::bytes::{take_u16, Bytes, FromBytes, IntoBytes};

mod ack;
mod data;
mod error;
mod mode;
mod opcode;
mod rq;

pub use ack::Ack;
pub use data::Data;
pub use error::{ErrorCode, ErrorPacket};
pub use mode::Mode;
pub use opcode::Opcode;
pub use rq::Rq;

/// The largest payload a single `Data` packet may carry.
pub const MAX_PAYLOAD_SIZE: usize = 512;

/// The largest datagram the protocol produces: opcode, block and payload.
pub const MAX_PACKET_SIZE: usize = 4 + MAX_PAYLOAD_SIZE;

/// Why a datagram could not be decoded into a [`Packet`].
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum MalformedPacket {
    /// The buffer ended before a fixed-size field.
    #[error("packet too short: needed {needed} bytes, got {got}")]
    TooShort {
        /// Bytes required by the field.
        needed: usize,
        /// Bytes available.
        got: usize,
    },

    /// The opcode is not one of the five RFC 1350 opcodes.
    #[error("unknown opcode {0}")]
    UnknownOpcode(u16),

    /// A string field had no NUL terminator.
    #[error("string field is missing its NUL terminator")]
    MissingTerminator,

    /// A filename or mode was not valid UTF-8.
    #[error("string field is not valid text")]
    InvalidText,

    /// The request named a mode other than netascii, octet or mail.
    #[error("unknown transfer mode {0:?}")]
    UnknownMode(String),

    /// The error code is outside 0..=7.
    #[error("unknown error code {0}")]
    UnknownErrorCode(u16),

    /// A `Data` packet carried more than 512 bytes.
    #[error("payload of {0} bytes exceeds the block size")]
    PayloadTooLarge(usize),

    /// The packet body had the wrong length for its opcode.
    #[error("unexpected body length {0}")]
    BadLength(usize),
}

/// A block number. Wraps around after 65535.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Block(pub u16);

impl Block {
    /// Creates a new `Block`.
    pub fn new(val: u16) -> Self {
        Self(val)
    }

    /// The block that follows this one.
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// The block that precedes this one.
    pub fn prev(self) -> Self {
        Self(self.0.wrapping_sub(1))
    }
}

impl IntoBytes for Block {
    fn into_bytes(self) -> Vec<u8> {
        Bytes::new(self.0).into_bytes()
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A TFTP packet.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Packet {
    /// Read request.
    Rrq(Rq),

    /// Write request.
    Wrq(Rq),

    /// A block of file contents.
    Data(Data),

    /// Acknowledgement of a block.
    Ack(Ack),

    /// The peer is giving up on the transfer.
    Error(ErrorPacket),
}

impl Packet {
    /// Creates a read request.
    pub fn rrq<T: AsRef<str>>(filename: T, mode: Mode) -> Self {
        Packet::Rrq(Rq::new(filename, mode))
    }

    /// Creates a write request.
    pub fn wrq<T: AsRef<str>>(filename: T, mode: Mode) -> Self {
        Packet::Wrq(Rq::new(filename, mode))
    }

    /// Creates a data packet.
    pub fn data<T: AsRef<[u8]>>(block: Block, data: T) -> Self {
        Packet::Data(Data::new(block, data))
    }

    /// Creates an acknowledgement packet.
    pub fn ack(block: Block) -> Self {
        Packet::Ack(Ack { block })
    }

    /// Creates an error packet.
    pub fn error<S: Into<String>>(code: ErrorCode, message: S) -> Self {
        Packet::Error(ErrorPacket::new(code, message))
    }

    /// The opcode this packet is sent with.
    pub fn opcode(&self) -> Opcode {
        match self {
            Packet::Rrq(_) => Opcode::Rrq,
            Packet::Wrq(_) => Opcode::Wrq,
            Packet::Data(_) => Opcode::Data,
            Packet::Ack(_) => Opcode::Ack,
            Packet::Error(_) => Opcode::Error,
        }
    }
}

impl FromBytes for Packet {
    type Error = MalformedPacket;

    fn from_bytes<T: AsRef<[u8]>>(bytes: T) -> Result<Self, MalformedPacket> {
        let (opcode, body) = take_u16(bytes.as_ref())?;

        Ok(match Opcode::from_u16(opcode)? {
            Opcode::Rrq => Packet::Rrq(Rq::from_bytes(body)?),
            Opcode::Wrq => Packet::Wrq(Rq::from_bytes(body)?),
            Opcode::Data => Packet::Data(Data::from_bytes(body)?),
            Opcode::Ack => Packet::Ack(Ack::from_bytes(body)?),
            Opcode::Error => Packet::Error(ErrorPacket::from_bytes(body)?),
        })
    }
}

impl IntoBytes for Packet {
    fn into_bytes(self) -> Vec<u8> {
        let mut bytes = self.opcode().into_bytes();
        let mut body = match self {
            Packet::Rrq(rq) | Packet::Wrq(rq) => rq.into_bytes(),
            Packet::Data(data) => data.into_bytes(),
            Packet::Ack(ack) => ack.into_bytes(),
            Packet::Error(error) => error.into_bytes(),
        };
        bytes.append(&mut body);
        bytes
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Packet::Rrq(rq) | Packet::Wrq(rq) => {
                write!(f, "{} {:?} ({})", self.opcode(), rq.filename, rq.mode)
            }
            Packet::Data(data) => write!(f, "DATA {} ({} bytes)", data.block, data.data.len()),
            Packet::Ack(ack) => write!(f, "ACK {}", ack.block),
            Packet::Error(error) => write!(f, "ERROR {}", error),
        }
    }
}

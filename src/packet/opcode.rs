//! Describes the opcodes defined by RFC 1350.

use std::fmt;

use super::MalformedPacket;
use crate::bytes::{Bytes, FromBytes, IntoBytes};

/// An integer identifier for the type of TFTP packet.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Opcode {
    /// Read request.
    Rrq = 1,

    /// Write request.
    Wrq = 2,

    /// Data.
    Data = 3,

    /// Acknowledges successful receipt of a `Data` packet.
    Ack = 4,

    /// A courtesy packet to indicate the peer has experienced an error
    /// and will not complete the transmission.
    Error = 5,
}

impl Opcode {
    /// Tries to produce an `Opcode` from a `u16`.
    pub fn from_u16(val: u16) -> Result<Self, MalformedPacket> {
        Ok(match val {
            1 => Opcode::Rrq,
            2 => Opcode::Wrq,
            3 => Opcode::Data,
            4 => Opcode::Ack,
            5 => Opcode::Error,
            _ => return Err(MalformedPacket::UnknownOpcode(val)),
        })
    }
}

impl IntoBytes for Opcode {
    fn into_bytes(self) -> Vec<u8> {
        Bytes::new(self as u16).into_bytes()
    }
}

impl FromBytes for Opcode {
    type Error = MalformedPacket;

    fn from_bytes<T: AsRef<[u8]>>(bytes: T) -> Result<Self, MalformedPacket> {
        let bytes = Bytes::from_bytes(bytes)?;
        Opcode::from_u16(bytes.into_inner())
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Opcode::Rrq => "RRQ",
            Opcode::Wrq => "WRQ",
            Opcode::Data => "DATA",
            Opcode::Ack => "ACK",
            Opcode::Error => "ERROR",
        };

        write!(f, "{}", s)
    }
}

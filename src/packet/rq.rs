//! The body shared by read and write requests.

use std::str::FromStr;

use super::{MalformedPacket, Mode};
use crate::bytes::{take_str, Bytes, FromBytes, IntoBytes};

/// A filename and a transfer mode, as carried by RRQ and WRQ packets.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Rq {
    /// The requested file, relative to the server's root.
    pub filename: String,

    /// The requested transfer mode.
    pub mode: Mode,
}

impl Rq {
    /// Creates a new request body.
    pub fn new<T: AsRef<str>>(filename: T, mode: Mode) -> Self {
        Self {
            filename: filename.as_ref().to_string(),
            mode,
        }
    }
}

impl FromBytes for Rq {
    type Error = MalformedPacket;

    fn from_bytes<T: AsRef<[u8]>>(bytes: T) -> Result<Self, MalformedPacket> {
        let (filename, rest) = take_str(bytes.as_ref())?;
        let (mode, _) = take_str(rest)?;
        let mode = Mode::from_str(mode)?;

        Ok(Self {
            filename: filename.to_string(),
            mode,
        })
    }
}

impl IntoBytes for Rq {
    fn into_bytes(self) -> Vec<u8> {
        let mut bytes = Bytes(self.filename.as_str()).into_bytes();
        bytes.append(&mut Bytes(self.mode.as_str()).into_bytes());
        bytes
    }
}

use std::fmt;
use std::io;

use super::MalformedPacket;
use crate::bytes::{take_cstr, take_u16, Bytes, FromBytes, IntoBytes};

/// `ErrorCode` represents the error conditions that can be reached during
/// a regular TFTP operation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorCode {
    /// Not defined, see error message (if any).
    NotDefined = 0,

    /// File not found.
    FileNotFound = 1,

    /// Access violation.
    AccessViolation = 2,

    /// Disk full or allocation exceeded.
    DiskFull = 3,

    /// Illegal TFTP operation.
    IllegalOperation = 4,

    /// Unknown transfer ID.
    UnknownTid = 5,

    /// File already exists.
    FileAlreadyExists = 6,

    /// No such user.
    NoSuchUser = 7,
}

impl ErrorCode {
    /// Tries to produce an `ErrorCode` from a `u16`.
    pub fn from_u16(val: u16) -> Result<Self, MalformedPacket> {
        Ok(match val {
            0 => ErrorCode::NotDefined,
            1 => ErrorCode::FileNotFound,
            2 => ErrorCode::AccessViolation,
            3 => ErrorCode::DiskFull,
            4 => ErrorCode::IllegalOperation,
            5 => ErrorCode::UnknownTid,
            6 => ErrorCode::FileAlreadyExists,
            7 => ErrorCode::NoSuchUser,
            _ => return Err(MalformedPacket::UnknownErrorCode(val)),
        })
    }

    /// The RFC 1350 description of this code.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::NotDefined => "Not defined",
            ErrorCode::FileNotFound => "File not found",
            ErrorCode::AccessViolation => "Access violation",
            ErrorCode::DiskFull => "Disk full or allocation exceeded",
            ErrorCode::IllegalOperation => "Illegal TFTP operation",
            ErrorCode::UnknownTid => "Unknown transfer ID",
            ErrorCode::FileAlreadyExists => "File already exists",
            ErrorCode::NoSuchUser => "No such user",
        }
    }
}

impl From<io::ErrorKind> for ErrorCode {
    fn from(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            io::ErrorKind::PermissionDenied => ErrorCode::AccessViolation,
            io::ErrorKind::AlreadyExists => ErrorCode::FileAlreadyExists,
            _ => ErrorCode::NotDefined,
        }
    }
}

/// An `Error` packet is a courtesy packet that is sent prior to terminating
/// the TFTP connection due to an unrecoverable error. It is never
/// acknowledged or retransmitted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ErrorPacket {
    /// An integer code that describes the error.
    pub code: ErrorCode,

    /// A human readable description of the error.
    pub message: String,
}

impl ErrorPacket {
    /// Creates a new `ErrorPacket`.
    pub fn new<S: Into<String>>(code: ErrorCode, message: S) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Recovers what it can from an error packet body that failed to
    /// decode. Unknown codes become `NotDefined` and a missing terminator
    /// ends the message at the end of the datagram.
    pub fn salvage(body: &[u8]) -> Self {
        let (code, rest) = match take_u16(body) {
            Ok((code, rest)) => (ErrorCode::from_u16(code).ok(), rest),
            Err(_) => (None, &[][..]),
        };
        let code = code.unwrap_or(ErrorCode::NotDefined);
        let message = rest.split(|&b| b == 0).next().unwrap_or_default();

        Self::new(code, String::from_utf8_lossy(message))
    }
}

impl FromBytes for ErrorPacket {
    type Error = MalformedPacket;

    fn from_bytes<T: AsRef<[u8]>>(bytes: T) -> Result<Self, MalformedPacket> {
        let (code, rest) = take_u16(bytes.as_ref())?;
        let code = ErrorCode::from_u16(code)?;

        // Peers are not held to UTF-8 here.
        let (message, _) = take_cstr(rest)?;
        let message = String::from_utf8_lossy(message).into_owned();

        Ok(Self { code, message })
    }
}

impl IntoBytes for ErrorPacket {
    fn into_bytes(self) -> Vec<u8> {
        let mut bytes = Bytes::new(self.code as u16).into_bytes();
        bytes.append(&mut Bytes(self.message.as_str()).into_bytes());
        bytes
    }
}

impl fmt::Display for ErrorPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.code as u16, self.code.as_str(), self.message)
    }
}

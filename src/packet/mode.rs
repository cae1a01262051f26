//! Describes the modes of operation for TFTP.
//!
//! The server moves file bytes unmodified in both `NetAscii` and `Octet`
//! mode. `Mail` is obsolete and is refused when a transfer starts.

use std::fmt;
use std::str::FromStr;

use super::MalformedPacket;

/// The modes of operation for TFTP.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    /// Obsolete.
    Mail,

    /// 8-bit ASCII.
    NetAscii,

    /// 8-bit binary.
    Octet,
}

impl Mode {
    /// The wire name of this mode.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Mail => "mail",
            Mode::NetAscii => "netascii",
            Mode::Octet => "octet",
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Octet
    }
}

impl FromStr for Mode {
    type Err = MalformedPacket;

    fn from_str(s: &str) -> Result<Self, MalformedPacket> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "mail" => Mode::Mail,
            "netascii" => Mode::NetAscii,
            "octet" => Mode::Octet,
            _ => return Err(MalformedPacket::UnknownMode(s.to_string())),
        })
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_conversions() {
        assert_eq!(Mode::from_str("mail").unwrap(), Mode::Mail);
        assert_eq!(Mode::from_str("netascii").unwrap(), Mode::NetAscii);
        assert_eq!(Mode::from_str("octet").unwrap(), Mode::Octet);
        assert_eq!(Mode::from_str("NeTasCiI").unwrap(), Mode::NetAscii);
        assert_eq!(Mode::from_str("OCTET").unwrap(), Mode::Octet);
        assert_eq!(
            Mode::from_str("binary"),
            Err(MalformedPacket::UnknownMode("binary".to_string()))
        );
        assert_eq!(Mode::default().to_string(), "octet");
    }
}

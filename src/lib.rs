//! The `tftpd` crate provides a Trivial File Transfer Protocol (RFC 1350)
//! server:
//!
//! * The protocol (types that represent TFTP packets and their wire format).
//! * A transfer engine that sends or receives one file over one peer
//!   channel, with acknowledgements, retransmission and end-of-file
//!   detection.
//! * A dispatcher that accepts requests on a well-known port and hands each
//!   one to its own thread and its own UDP socket.
//!
//! For more information, please see [THE TFTP PROTOCOL (REVISION 2)](
//! https://tools.ietf.org/html/rfc1350).
//!
//! ## Try it out
//!
//! In one terminal window, start up the server:
//!
//! ```console
//! $ cargo run -- --port 6655 --read-dir ./files --write-dir ./uploads
//! INFO tftpd: Serving Trivial File Transfer Protocol (TFTP) @ 0.0.0.0:6655
//! ```
//!
//! Then point any TFTP client at it:
//!
//! ```console
//! $ tftp 127.0.0.1 6655 -m binary -c get report.txt
//! ```

#![deny(missing_docs)]

use std::time::Duration;

/// POD struct representing the configuration of the retransmission of packets
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
pub struct RetransmissionConfig {
    /// How long should we wait for a reply before retransmitting the last packet?
    timeout: Duration,

    /// How many times should a packet be transmitted before giving up?
    ///
    /// Note that this counts *transmissions*, not retransmissions: with
    /// `max_attempts` of 1 the packet is sent once and never repeated.
    max_attempts: usize,
}

impl RetransmissionConfig {
    /// Creates a new config. `max_attempts` is raised to at least 1.
    pub fn new(timeout: Duration, max_attempts: usize) -> Self {
        Self {
            timeout,
            max_attempts: max_attempts.max(1),
        }
    }

    /// How long to wait for each reply.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// How many times a packet is sent before the transfer is abandoned.
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }
}

impl Default for RetransmissionConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), 5)
    }
}

mod bytes;
pub mod channel;
pub mod config;
pub mod error;
pub mod fs;
pub mod packet;
pub mod retransmit;
mod server;
pub mod session;

pub use bytes::{FromBytes, IntoBytes};
pub use config::Config;
pub use error::TransferError;
pub use server::{Handler, Operation, Request, Server};
pub use session::{Session, State, Summary};

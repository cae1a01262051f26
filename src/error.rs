//! Why a transfer ends early, and what the peer is told about it.

use std::io;

use thiserror::Error;

use crate::packet::{Block, ErrorCode, ErrorPacket, MalformedPacket, Mode, Packet};
use crate::retransmit::Expect;

/// A terminal failure of a single transfer session.
///
/// None of these are retried: the client must start a fresh request.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The requested file does not exist under the read root.
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// The filename escapes its root, or the filesystem refused access.
    #[error("access violation: {0}")]
    AccessViolation(String),

    /// The request asked for a mode this server does not serve.
    #[error("unsupported transfer mode: {0}")]
    UnsupportedMode(Mode),

    /// A local read, write or socket failure.
    #[error("I/O failure: {0}")]
    Io(#[from] io::Error),

    /// The peer replied with the wrong opcode or block number.
    #[error("expected {expected}, received {received}")]
    ProtocolViolation {
        /// The reply that was being waited for.
        expected: Expect,
        /// What arrived instead.
        received: Packet,
    },

    /// The peer replied with something that is not a TFTP packet.
    #[error("malformed reply: {0}")]
    Malformed(#[from] MalformedPacket),

    /// The peer stopped answering.
    #[error("no reply for block {block} after {attempts} attempts")]
    RetryExhausted {
        /// The block that went unanswered.
        block: Block,
        /// How many times it was sent.
        attempts: usize,
    },

    /// The peer sent an error packet and abandoned the transfer.
    #[error("peer aborted the transfer: {0}")]
    Peer(ErrorPacket),
}

impl TransferError {
    /// The error packet reporting this failure to the peer, if one is owed.
    ///
    /// An error packet from the peer is never answered with another.
    pub fn to_packet(&self) -> Option<Packet> {
        let (code, message) = match self {
            TransferError::FileNotFound(_) => {
                (ErrorCode::FileNotFound, ErrorCode::FileNotFound.as_str().to_string())
            }
            TransferError::AccessViolation(_) => (
                ErrorCode::AccessViolation,
                ErrorCode::AccessViolation.as_str().to_string(),
            ),
            TransferError::UnsupportedMode(_) | TransferError::Malformed(_) => (
                ErrorCode::IllegalOperation,
                ErrorCode::IllegalOperation.as_str().to_string(),
            ),
            TransferError::Io(err) => (err.kind().into(), err.to_string()),
            TransferError::ProtocolViolation { .. } => (
                ErrorCode::NotDefined,
                "Unexpected packet or block number".to_string(),
            ),
            TransferError::RetryExhausted { block, .. } => (
                ErrorCode::NotDefined,
                format!("Max retries reached for block {}", block.0),
            ),
            TransferError::Peer(_) => return None,
        };

        Some(Packet::error(code, message))
    }
}

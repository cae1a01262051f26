//! Lock-step send-and-wait with bounded retransmission.
//!
//! Each exchange sends one packet and waits for the single reply that lets
//! the transfer advance. Silence is answered by retransmitting the identical
//! bytes until [`RetransmissionConfig::max_attempts`] is exhausted.
//!
//! Replies are sorted as follows:
//!
//! * the expected block: accepted.
//! * the *previous* block, once there is one: a duplicate, discarded
//!   without advancing. On the opening exchange nothing precedes the
//!   expected block, so block 0 there is a mismatch. A duplicate DATA
//!   means our last ACK was lost, so it is retransmitted at once. A
//!   duplicate ACK never triggers a retransmission; answering those leads
//!   to every later block being sent twice.
//! * an ERROR packet: the peer gave up, and so do we. This holds even when
//!   the error packet itself is malformed.
//! * anything else: a protocol violation, fatal to the transfer.
//!
//! Discarding a duplicate does not restart the timeout.

use std::fmt;
use std::time::Instant;

use tracing::{debug, trace};

use crate::bytes::{FromBytes, IntoBytes};
use crate::channel::Channel;
use crate::error::TransferError;
use crate::packet::{Block, Data, ErrorPacket, Opcode, Packet};
use crate::RetransmissionConfig;

/// The reply an exchange is waiting for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Expect {
    /// An acknowledgement of this block.
    Ack(Block),

    /// A data packet carrying this block.
    Data(Block),
}

enum Verdict {
    Accept,
    Duplicate { resend: bool },
    Unexpected,
}

impl Expect {
    /// The block number being waited for.
    pub fn block(self) -> Block {
        match self {
            Expect::Ack(block) | Expect::Data(block) => block,
        }
    }

    fn classify(self, packet: &Packet, previous: Option<Block>) -> Verdict {
        match (self, packet) {
            (Expect::Ack(want), Packet::Ack(ack)) if ack.block == want => Verdict::Accept,
            (Expect::Ack(_), Packet::Ack(ack)) if Some(ack.block) == previous => {
                Verdict::Duplicate { resend: false }
            }
            (Expect::Data(want), Packet::Data(data)) if data.block == want => Verdict::Accept,
            (Expect::Data(_), Packet::Data(data)) if Some(data.block) == previous => {
                Verdict::Duplicate { resend: true }
            }
            _ => Verdict::Unexpected,
        }
    }
}

impl fmt::Display for Expect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expect::Ack(block) => write!(f, "ACK {}", block),
            Expect::Data(block) => write!(f, "DATA {}", block),
        }
    }
}

/// Sends `outgoing` and waits for the reply described by `expect`,
/// retransmitting on silence. Returns the accepted reply.
///
/// `previous` is the block completed before this one, whose repeats are
/// tolerated. It is `None` on the opening exchange of a transfer.
pub fn send_and_await<C: Channel>(
    channel: &C,
    outgoing: &[u8],
    expect: Expect,
    previous: Option<Block>,
    config: &RetransmissionConfig,
) -> Result<Packet, TransferError> {
    for attempt in 1..=config.max_attempts() {
        channel.send(outgoing)?;
        let deadline = Instant::now() + config.timeout();

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let bytes = match channel.recv_timeout(remaining)? {
                Some(bytes) => bytes,
                None => break,
            };

            let packet = match Packet::from_bytes(&bytes) {
                Ok(Packet::Error(error)) => return Err(TransferError::Peer(error)),
                Ok(packet) => packet,
                Err(_) if bytes.starts_with(&Opcode::Error.into_bytes()) => {
                    return Err(TransferError::Peer(ErrorPacket::salvage(&bytes[2..])));
                }
                Err(err) => return Err(err.into()),
            };

            match expect.classify(&packet, previous) {
                Verdict::Accept => {
                    trace!(%packet, "received");
                    return Ok(packet);
                }
                Verdict::Duplicate { resend } => {
                    debug!(%packet, %expect, "discarding duplicate");
                    if resend {
                        channel.send(outgoing)?;
                    }
                }
                Verdict::Unexpected => {
                    return Err(TransferError::ProtocolViolation {
                        expected: expect,
                        received: packet,
                    })
                }
            }
        }

        debug!(attempt, %expect, "timed out waiting for reply");
    }

    Err(TransferError::RetryExhausted {
        block: expect.block(),
        attempts: config.max_attempts(),
    })
}

/// Sends a data block and waits for its acknowledgement. `acked` is the
/// last block already acknowledged, `None` before the first.
pub fn await_ack<C: Channel>(
    channel: &C,
    data: Data,
    acked: Option<Block>,
    config: &RetransmissionConfig,
) -> Result<(), TransferError> {
    let expect = Expect::Ack(data.block);
    let outgoing = Packet::Data(data).into_bytes();

    send_and_await(channel, &outgoing, expect, acked, config).map(|_| ())
}

/// Acknowledges the last block received and waits for the one after it.
/// `received` is `None` before the first block, which is answered with
/// ACK 0.
pub fn await_data<C: Channel>(
    channel: &C,
    received: Option<Block>,
    config: &RetransmissionConfig,
) -> Result<Data, TransferError> {
    let acked = received.unwrap_or_default();
    let expect = Expect::Data(acked.next());
    let outgoing = Packet::ack(acked).into_bytes();

    match send_and_await(channel, &outgoing, expect, received, config)? {
        Packet::Data(data) => Ok(data),
        received => Err(TransferError::ProtocolViolation {
            expected: expect,
            received,
        }),
    }
}

//! One transfer between the server and one client.
//!
//! A `Session` owns its channel for its whole life and moves exactly one
//! file in one direction:
//!
//! * [`Session::send_file`] serves a read request: DATA out, ACK in.
//! * [`Session::receive_file`] serves a write request: ACK out, DATA in.
//!
//! Blocks are exchanged strictly in lock-step; block N+1 is never sent or
//! accepted before block N is acknowledged. A DATA payload shorter than
//! 512 bytes is the only end-of-file signal, so a file whose length is a
//! multiple of 512 ends with an empty block.
//!
//! Any failure is terminal: the peer is sent a best-effort ERROR packet and
//! the session moves to [`State::Failed`]. A failed write leaves the
//! partially written file in place.

use std::fmt;
use std::io::{self, Read, Write};

use tracing::{debug, trace};

use crate::bytes::{FromBytes, IntoBytes};
use crate::channel::Channel;
use crate::error::TransferError;
use crate::packet::{Block, Data, Packet, MAX_PAYLOAD_SIZE};
use crate::retransmit;
use crate::RetransmissionConfig;

/// Where a session is in its transfer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum State {
    /// Nothing has been exchanged yet.
    Idle,

    /// Reading the next block from the file.
    Sending,

    /// A block is out; waiting for its acknowledgement.
    AwaitingAck,

    /// An acknowledgement is out; waiting for the next block.
    AwaitingData,

    /// Writing a received block to the file.
    Writing,

    /// The transfer completed.
    Done,

    /// The transfer was abandoned.
    Failed,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What a completed transfer moved.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Summary {
    /// DATA blocks exchanged, including a trailing empty one.
    pub blocks: u32,

    /// File bytes moved.
    pub bytes: u64,
}

/// A single transfer over a channel to one peer.
pub struct Session<C> {
    channel: C,
    retransmission: RetransmissionConfig,
    state: State,
}

impl<C: Channel> Session<C> {
    /// Creates a new session over `channel`.
    pub fn new(channel: C, retransmission: RetransmissionConfig) -> Self {
        Self {
            channel,
            retransmission,
            state: State::Idle,
        }
    }

    /// The session's current state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Sends the contents of `reader` to the peer, starting at block 1.
    pub fn send_file<R: Read>(&mut self, reader: R) -> Result<Summary, TransferError> {
        let result = self.send_blocks(reader);
        self.finish(result)
    }

    /// Receives a file from the peer into `writer`, starting with ACK 0.
    pub fn receive_file<W: Write>(&mut self, writer: W) -> Result<Summary, TransferError> {
        let result = self.receive_blocks(writer);
        self.finish(result)
    }

    /// Abandons the transfer: tells the peer why, if it is owed an
    /// explanation, and moves to `Failed`.
    pub fn abort(&mut self, err: TransferError) -> TransferError {
        self.state = State::Failed;

        if let Some(packet) = err.to_packet() {
            if let Err(send_err) = self.channel.send(&packet.into_bytes()) {
                debug!(error = %send_err, "couldn't send error packet");
            }
        }

        err
    }

    fn finish(&mut self, result: Result<Summary, TransferError>) -> Result<Summary, TransferError> {
        match result {
            Ok(summary) => {
                self.state = State::Done;
                Ok(summary)
            }
            Err(err) => Err(self.abort(err)),
        }
    }

    fn send_blocks<R: Read>(&mut self, mut reader: R) -> Result<Summary, TransferError> {
        let mut summary = Summary::default();
        let mut block = Block::new(1);
        let mut acked = None;
        let mut buf = [0; MAX_PAYLOAD_SIZE];

        loop {
            self.state = State::Sending;
            let nbytes = fill_block(&mut reader, &mut buf)?;

            self.state = State::AwaitingAck;
            retransmit::await_ack(
                &self.channel,
                Data::new(block, &buf[..nbytes]),
                acked,
                &self.retransmission,
            )?;
            trace!(%block, nbytes, "block acknowledged");

            summary.blocks += 1;
            summary.bytes += nbytes as u64;

            if nbytes < MAX_PAYLOAD_SIZE {
                return Ok(summary);
            }
            acked = Some(block);
            block = block.next();
        }
    }

    fn receive_blocks<W: Write>(&mut self, mut writer: W) -> Result<Summary, TransferError> {
        let mut summary = Summary::default();
        let mut received = None;

        loop {
            self.state = State::AwaitingData;
            let data = retransmit::await_data(&self.channel, received, &self.retransmission)?;

            self.state = State::Writing;
            writer.write_all(&data.data)?;
            trace!(block = %data.block, nbytes = data.data.len(), "block written");

            summary.blocks += 1;
            summary.bytes += data.data.len() as u64;
            received = Some(data.block);

            if data.is_last() {
                writer.flush()?;
                self.channel.send(&Packet::ack(data.block).into_bytes())?;
                self.dally(data.block);
                return Ok(summary);
            }
        }
    }

    /// Lingers after the final ACK in case it was lost, re-sending it for
    /// as long as the peer keeps retransmitting the last block.
    fn dally(&self, last: Block) {
        let ack = Packet::ack(last).into_bytes();

        for _ in 1..self.retransmission.max_attempts() {
            let bytes = match self.channel.recv_timeout(self.retransmission.timeout()) {
                Ok(Some(bytes)) => bytes,
                _ => return,
            };

            match Packet::from_bytes(&bytes) {
                Ok(Packet::Data(data)) if data.block == last => {
                    debug!(block = %last, "final block repeated, re-sending ACK");
                    if self.channel.send(&ack).is_err() {
                        return;
                    }
                }
                _ => return,
            }
        }
    }
}

/// Reads until `buf` is full or the reader is exhausted. A short count
/// therefore always means end of file.
fn fill_block<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;

    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(nbytes) => filled += nbytes,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }

    Ok(filled)
}

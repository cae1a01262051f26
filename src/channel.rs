//! The datagram transport a session talks over.

use std::io::{self, ErrorKind};
use std::net::UdpSocket;
use std::time::Duration;

use crate::packet::MAX_PACKET_SIZE;

/// An unreliable datagram channel to a single, fixed peer.
pub trait Channel {
    /// Sends one datagram to the peer.
    fn send(&self, bytes: &[u8]) -> io::Result<()>;

    /// Waits up to `timeout` for one datagram from the peer. Returns
    /// `Ok(None)` if nothing arrived in time.
    fn recv_timeout(&self, timeout: Duration) -> io::Result<Option<Vec<u8>>>;
}

impl<C: Channel + ?Sized> Channel for &C {
    fn send(&self, bytes: &[u8]) -> io::Result<()> {
        (**self).send(bytes)
    }

    fn recv_timeout(&self, timeout: Duration) -> io::Result<Option<Vec<u8>>> {
        (**self).recv_timeout(timeout)
    }
}

/// It is assumed that the socket is already connected to the peer; the
/// kernel then discards datagrams from any other address.
impl Channel for UdpSocket {
    fn send(&self, bytes: &[u8]) -> io::Result<()> {
        UdpSocket::send(self, bytes).map(|_| ())
    }

    fn recv_timeout(&self, timeout: Duration) -> io::Result<Option<Vec<u8>>> {
        // A zero read timeout means "block forever" to the socket.
        if timeout.is_zero() {
            return Ok(None);
        }
        self.set_read_timeout(Some(timeout))?;

        // One spare byte so an oversized datagram is seen as such.
        let mut buf = vec![0; MAX_PACKET_SIZE + 1];
        match self.recv(&mut buf) {
            Ok(nbytes) => {
                buf.truncate(nbytes);
                Ok(Some(buf))
            }
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

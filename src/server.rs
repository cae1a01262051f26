use std::io::{self, ErrorKind, Result};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::thread;

use tracing::{debug, info, info_span, warn};

use crate::bytes::FromBytes;
use crate::config::Config;
use crate::error::TransferError;
use crate::fs::Roots;
use crate::packet::*;
use crate::session::{Session, Summary};
use crate::RetransmissionConfig;

/// Accepts requests on the well-known port.
pub struct Server {
    socket: UdpSocket,
    roots: Roots,
    retransmission: RetransmissionConfig,
}

impl Server {
    /// Binds the listening socket on every IPv4 interface at `config.port`.
    /// Port 0 picks a free port; see [`Server::local_addr`].
    pub fn new(config: &Config) -> Result<Self> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, config.port))?;

        Ok(Self {
            socket,
            roots: config.roots(),
            retransmission: config.retransmission,
        })
    }

    /// The address the server is listening on.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Waits for the next valid request and prepares a `Handler` for it.
    ///
    /// Datagrams that are not a well-formed RRQ or WRQ are dropped without
    /// reply. Receive errors that say nothing about the listening socket
    /// itself, such as an ICMP report about an earlier reply, are logged
    /// and skipped. Any other failure of the socket is returned.
    pub fn serve(&self) -> Result<Handler> {
        loop {
            let mut buf = vec![0; MAX_PACKET_SIZE];
            let (nbytes, client) = match self.socket.recv_from(&mut buf) {
                Ok(received) => received,
                Err(err) if is_transient(&err) => {
                    warn!(error = %err, "receive failed on listening socket");
                    continue;
                }
                Err(err) => return Err(err),
            };

            let request = match Packet::from_bytes(&buf[..nbytes]) {
                Ok(Packet::Rrq(rq)) => Request::new(Operation::Read, rq, client),
                Ok(Packet::Wrq(rq)) => Request::new(Operation::Write, rq, client),
                Ok(packet) => {
                    debug!(%client, %packet, "ignoring packet that is not a request");
                    continue;
                }
                Err(err) => {
                    debug!(%client, error = %err, "dropping malformed request");
                    continue;
                }
            };

            let local_ip = self.socket.local_addr()?.ip();
            match Handler::new(request, local_ip, self.roots.clone(), self.retransmission) {
                Ok(handler) => return Ok(handler),
                Err(err) => warn!(%client, error = %err, "couldn't open a socket for request"),
            }
        }
    }

    /// Serves requests forever, each on its own thread.
    pub fn run(&self) -> Result<()> {
        loop {
            let handler = self.serve()?;
            thread::spawn(move || handler.handle());
        }
    }
}

fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::Interrupted
            | ErrorKind::WouldBlock
            | ErrorKind::TimedOut
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionRefused
    )
}

/// Which way the file moves.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operation {
    /// The client reads a file from the server.
    Read,

    /// The client writes a file to the server.
    Write,
}

/// A parsed initial request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Request {
    /// Read or write.
    pub operation: Operation,

    /// The requested file, relative to the matching root.
    pub filename: String,

    /// The requested transfer mode.
    pub mode: Mode,

    /// Where the request came from; all replies go here.
    pub client: SocketAddr,
}

impl Request {
    fn new(operation: Operation, rq: Rq, client: SocketAddr) -> Self {
        Self {
            operation,
            filename: rq.filename,
            mode: rq.mode,
            client,
        }
    }
}

/// One accepted request, with a socket dedicated to its client.
pub struct Handler {
    socket: UdpSocket,
    request: Request,
    roots: Roots,
    retransmission: RetransmissionConfig,
}

impl Handler {
    fn new(
        request: Request,
        local_ip: IpAddr,
        roots: Roots,
        retransmission: RetransmissionConfig,
    ) -> Result<Handler> {
        let socket = UdpSocket::bind((local_ip, 0))?;
        socket.connect(request.client)?;

        Ok(Handler {
            socket,
            request,
            roots,
            retransmission,
        })
    }

    /// The request being handled.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// The address of the socket dedicated to this transfer.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Runs the transfer to completion on the calling thread.
    pub fn handle(self) -> std::result::Result<Summary, TransferError> {
        let Handler {
            socket,
            request,
            roots,
            retransmission,
        } = self;

        let span = info_span!("session", peer = %request.client, file = %request.filename);
        let _enter = span.enter();
        info!(operation = ?request.operation, mode = %request.mode, "request accepted");

        let mut session = Session::new(socket, retransmission);
        let result = if request.mode == Mode::Mail {
            Err(session.abort(TransferError::UnsupportedMode(request.mode)))
        } else {
            match request.operation {
                Operation::Read => match roots.open_for_read(&request.filename) {
                    Ok(file) => session.send_file(file),
                    Err(err) => Err(session.abort(err)),
                },
                Operation::Write => match roots.create_or_truncate(&request.filename) {
                    Ok(file) => session.receive_file(file),
                    Err(err) => Err(session.abort(err)),
                },
            }
        };

        match &result {
            Ok(summary) => {
                info!(blocks = summary.blocks, bytes = summary.bytes, "transfer complete")
            }
            Err(err) => warn!(error = %err, "transfer failed"),
        }

        result
    }
}

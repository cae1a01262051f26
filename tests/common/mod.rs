#![allow(dead_code)]

//! A bare-bones TFTP client speaking over real loopback UDP, recording
//! every packet the server sends it.

use std::net::{SocketAddr, UdpSocket};
use std::path::Path;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tftpd::packet::{Block, Data, Mode, Packet, MAX_PACKET_SIZE, MAX_PAYLOAD_SIZE};
use tftpd::{Config, FromBytes, IntoBytes, RetransmissionConfig, Server, Summary, TransferError};

pub const TIMEOUT: Duration = Duration::from_millis(200);
pub const MAX_ATTEMPTS: usize = 3;

/// How long the test client waits before deciding the server went quiet.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(5);

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("tftpd=debug")
        .try_init();
}

pub fn start_server<R: AsRef<Path>, W: AsRef<Path>>(read: R, write: W) -> (SocketAddr, Server) {
    init_logging();

    let config = Config::new(0, read.as_ref(), write.as_ref())
        .with_retransmission(RetransmissionConfig::new(TIMEOUT, MAX_ATTEMPTS));
    let server = Server::new(&config).unwrap();
    let port = server.local_addr().unwrap().port();

    (SocketAddr::from(([127, 0, 0, 1], port)), server)
}

/// Accepts `n` requests one after another, returning each outcome.
pub fn serve_n(server: Server, n: usize) -> JoinHandle<Vec<Result<Summary, TransferError>>> {
    thread::spawn(move || {
        (0..n)
            .map(|_| server.serve().unwrap().handle())
            .collect()
    })
}

pub struct Client {
    socket: UdpSocket,
    server: SocketAddr,
    /// Every packet received from the server, in order.
    pub received: Vec<Packet>,
}

impl Client {
    pub fn new(server: SocketAddr) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket.set_read_timeout(Some(CLIENT_TIMEOUT)).unwrap();

        Self {
            socket,
            server,
            received: Vec::new(),
        }
    }

    pub fn send_raw(&self, bytes: &[u8]) {
        self.socket.send_to(bytes, self.server).unwrap();
    }

    /// Sends `packet` to the session's port once it is known, to the
    /// listening port before that.
    pub fn send(&self, packet: Packet) {
        let bytes = packet.into_bytes();
        match self.socket.peer_addr() {
            Ok(_) => self.socket.send(&bytes[..]).unwrap(),
            Err(_) => self.socket.send_to(&bytes[..], self.server).unwrap(),
        };
    }

    /// Receives the next packet, locking onto the sender's port on first
    /// contact.
    pub fn recv(&mut self) -> Option<Packet> {
        let mut buf = [0; MAX_PACKET_SIZE];
        let (nbytes, from) = self.socket.recv_from(&mut buf).ok()?;
        if self.socket.peer_addr().is_err() {
            self.socket.connect(from).unwrap();
        }

        let packet = Packet::from_bytes(&buf[..nbytes]).unwrap();
        self.received.push(packet.clone());
        Some(packet)
    }

    pub fn session_addr(&self) -> Option<SocketAddr> {
        self.socket.peer_addr().ok()
    }

    /// Nothing further arrives within a couple of server timeouts.
    pub fn assert_quiet(&mut self) {
        self.socket.set_read_timeout(Some(TIMEOUT * 2)).unwrap();
        let extra = self.recv();
        assert!(extra.is_none(), "unexpected trailing packet {:?}", extra);
        self.socket.set_read_timeout(Some(CLIENT_TIMEOUT)).unwrap();
    }

    /// Downloads `filename`. Returns the file contents, or the error packet
    /// that ended the transfer.
    pub fn get(&mut self, filename: &str) -> Result<Vec<u8>, Packet> {
        self.send(Packet::rrq(filename, Mode::Octet));

        let mut contents = Vec::new();
        let mut expected = Block::new(1);
        loop {
            match self.recv().expect("server went quiet") {
                Packet::Data(Data { block, data }) => {
                    assert_eq!(block, expected, "blocks must be consecutive");
                    contents.extend_from_slice(&data);
                    self.send(Packet::ack(block));
                    if data.len() < MAX_PAYLOAD_SIZE {
                        return Ok(contents);
                    }
                    expected = expected.next();
                }
                other => return Err(other),
            }
        }
    }

    /// Uploads `contents` as `filename`. Returns the error packet that ended
    /// the transfer, if any.
    pub fn put(&mut self, filename: &str, contents: &[u8]) -> Result<(), Packet> {
        self.send(Packet::wrq(filename, Mode::Octet));

        let mut chunks = contents.chunks(MAX_PAYLOAD_SIZE);
        let mut block = Block::new(0);
        let mut last_len = MAX_PAYLOAD_SIZE;
        loop {
            match self.recv().expect("server went quiet") {
                Packet::Ack(ack) => assert_eq!(ack.block, block, "acks must be consecutive"),
                other => return Err(other),
            }
            if last_len < MAX_PAYLOAD_SIZE {
                return Ok(());
            }

            let chunk = chunks.next().unwrap_or(&[]);
            last_len = chunk.len();
            block = block.next();
            self.send(Packet::data(block, chunk));
        }
    }
}

pub fn random_bytes(len: usize) -> Vec<u8> {
    use rand::Rng;

    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill(&mut bytes[..]);
    bytes
}

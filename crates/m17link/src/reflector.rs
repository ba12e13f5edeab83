//! Reflector client
//!
//! Reflectors are UDP relays that interconnect M17 stations. The
//! protocol is a handful of 4-byte magics: `CONN`/`ACKN`/`NACK` for
//! the handshake, `PING`/`PONG` keepalives, `DISC` to part, and two
//! data frames, `M17P` packets and 54-byte `M17 ` voice stream
//! datagrams. All integers are big-endian.
//!
//! [`ReflectorClient`] owns the socket and runs the receive loop;
//! packet and stream handlers are installed at construction and only
//! ever invoked from that loop. A [`ReflectorSender`] handle clones
//! the socket for transmitting from another thread, so decoded RF
//! traffic can be forwarded while the loop runs.

#[cfg(not(test))]
use log::{debug, info, warn};
#[cfg(test)]
use std::{println as debug, println as info, println as warn};

use std::io;
use std::net::{ToSocketAddrs, UdpSocket};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::callsign::{Address, CallsignError};
use crate::crc;
use crate::lsf::{Lsf, LSD_LEN};
use crate::packet::Packet;

const MAGIC_LEN: usize = 4;

const MAGIC_ACKN: &[u8; 4] = b"ACKN";
const MAGIC_CONN: &[u8; 4] = b"CONN";
const MAGIC_DISC: &[u8; 4] = b"DISC";
const MAGIC_NACK: &[u8; 4] = b"NACK";
const MAGIC_PING: &[u8; 4] = b"PING";
const MAGIC_PONG: &[u8; 4] = b"PONG";
const MAGIC_VOICE: &[u8; 4] = b"M17 ";
const MAGIC_PACKET: &[u8; 4] = b"M17P";

/// Voice stream datagram length on the wire
pub const STREAM_DATAGRAM_LEN: usize = 54;

// Keepalive gap worth warning about
const PING_STALE: Duration = Duration::from_secs(30);

/// Errors from the reflector client
#[derive(Debug, Error)]
pub enum ReflectorError {
    /// Module designators are single letters A-Z
    #[error("module must be a single letter A-Z, got {0:?}")]
    BadModule(char),

    /// The local callsign did not encode
    #[error(transparent)]
    BadCallsign(#[from] CallsignError),

    /// The reflector answered NACK
    #[error("connection rejected by reflector")]
    Rejected,

    /// An operation that needs a socket ran before `connect()`
    #[error("not connected to a reflector")]
    NotConnected,

    /// Socket failure
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Errors parsing a stream datagram off the wire
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StreamDatagramError {
    #[error("stream datagram length {0} != {STREAM_DATAGRAM_LEN}")]
    BadLength(usize),

    #[error("bad stream datagram CRC")]
    BadCrc,
}

/// Connection lifecycle state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientState {
    Disconnected,
    Connecting,
    Connected,
    Closed,
}

/// One frame of a voice stream received from the reflector
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamDatagram {
    pub stream_id: u16,
    pub frame_number: u16,
    pub last_frame: bool,
    pub lsf: Lsf,
    pub payload: [u8; 16],
}

impl StreamDatagram {
    /// Parse a 54-byte `M17 ` datagram
    ///
    /// The CRC covers the whole datagram, magic included. The
    /// embedded LSD is expanded into a broadcast LSF for relaying:
    /// the original source lands in `meta[0..6]`, the local station
    /// (`local`) in `meta[6..12]`, and the CRC is recomputed.
    pub fn from_wire(local: &Address, buffer: &[u8]) -> Result<StreamDatagram, StreamDatagramError> {
        if buffer.len() != STREAM_DATAGRAM_LEN {
            return Err(StreamDatagramError::BadLength(buffer.len()));
        }
        if !crc::check(buffer) {
            return Err(StreamDatagramError::BadCrc);
        }
        let body = &buffer[MAGIC_LEN..];

        let stream_id = u16::from_be_bytes([body[0], body[1]]);
        let lsd: &[u8; LSD_LEN] = body[2..2 + LSD_LEN]
            .try_into()
            .expect("LSD occupies 28 bytes");
        let mut lsf = Lsf::from_lsd(lsd);
        let original_src = lsf.src;
        lsf.meta[..6].copy_from_slice(&original_src);
        lsf.meta[6..12].copy_from_slice(local.as_bytes());
        lsf.dst = *Address::BROADCAST.as_bytes();
        lsf.frame_type[1] |= 0x2 << 5;
        lsf.calc_crc();

        let frame_number = u16::from_be_bytes([body[30], body[31]]);
        let mut payload = [0u8; 16];
        payload.copy_from_slice(&body[32..48]);

        Ok(StreamDatagram {
            stream_id,
            frame_number,
            last_frame: frame_number & 0x8000 != 0,
            lsf,
            payload,
        })
    }
}

/// Handler invoked for each packet received from the reflector
pub type PacketHandler = Box<dyn FnMut(Packet) + Send>;

/// Handler invoked for each voice stream frame from the reflector
pub type StreamHandler = Box<dyn FnMut(StreamDatagram) + Send>;

/// A connection to an M17 reflector
///
/// Create the client, [`connect()`](ReflectorClient::connect), and
/// then drive [`run()`](ReflectorClient::run), typically on its own
/// thread. `run` returns when the peer disconnects us or the socket
/// fails; sending is done through a [`ReflectorSender`] obtained
/// before the loop starts.
pub struct ReflectorClient {
    server: String,
    port: u16,
    module: u8,
    callsign: String,
    encoded_callsign: Address,
    socket: Option<UdpSocket>,
    state: ClientState,
    last_ping: Option<Instant>,
    packet_handler: Option<PacketHandler>,
    stream_handler: Option<StreamHandler>,
}

impl ReflectorClient {
    /// New client for `server:port`
    ///
    /// `module` is the reflector module letter A-Z, or `None` to
    /// connect without one. Handlers may be `None` if the caller has
    /// no interest in that traffic class.
    pub fn new(
        server: &str,
        port: u16,
        module: Option<char>,
        callsign: &str,
        packet_handler: Option<PacketHandler>,
        stream_handler: Option<StreamHandler>,
    ) -> Result<ReflectorClient, ReflectorError> {
        let module = match module {
            None => 0,
            Some(m) if m.is_ascii_uppercase() => m as u8,
            Some(m) => return Err(ReflectorError::BadModule(m)),
        };
        Ok(ReflectorClient {
            server: server.to_owned(),
            port,
            module,
            callsign: callsign.to_owned(),
            encoded_callsign: Address::encode(callsign)?,
            socket: None,
            state: ClientState::Disconnected,
            last_ping: None,
            packet_handler,
            stream_handler,
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> ClientState {
        self.state
    }

    /// Resolve the reflector, bind a socket, and send `CONN`
    ///
    /// The reflector's `ACKN`/`NACK` answer is handled by
    /// [`run()`](ReflectorClient::run).
    pub fn connect(&mut self) -> Result<(), ReflectorError> {
        let addr = (self.server.as_str(), self.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::AddrNotAvailable,
                    format!("no address for {}", self.server),
                )
            })?;
        let socket = UdpSocket::bind(("0.0.0.0", 0))?;
        socket.connect(addr)?;

        let mut conn = [0u8; 11];
        conn[..4].copy_from_slice(MAGIC_CONN);
        conn[4..10].copy_from_slice(self.encoded_callsign.as_bytes());
        conn[10] = self.module;
        debug!(
            "connecting to {}:{} as {} module {:?}",
            self.server, self.port, self.callsign, self.module as char
        );
        socket.send(&conn)?;

        self.socket = Some(socket);
        self.state = ClientState::Connecting;
        Ok(())
    }

    /// A send handle sharing this client's socket
    pub fn sender(&self) -> Result<ReflectorSender, ReflectorError> {
        let socket = self.socket.as_ref().ok_or(ReflectorError::NotConnected)?;
        Ok(ReflectorSender {
            socket: socket.try_clone()?,
            encoded_callsign: self.encoded_callsign,
        })
    }

    /// Receive and dispatch datagrams until the session ends
    ///
    /// Returns `Ok(())` on a peer `DISC`, `Err(Rejected)` on `NACK`,
    /// and `Err(Io)` if the socket fails (including being closed by
    /// [`close()`](ReflectorClient::close) from another handle).
    pub fn run(&mut self) -> Result<(), ReflectorError> {
        let mut buffer = [0u8; 1024];
        loop {
            let len = {
                let socket = self.socket.as_ref().ok_or(ReflectorError::NotConnected)?;
                socket.recv(&mut buffer)?
            };
            if let Some(stale) = self.last_ping.map(|t| t.elapsed()).filter(|e| *e > PING_STALE) {
                warn!("no keepalive from reflector for {:.0?}", stale);
            }
            if self.handle_datagram(&buffer[..len])? {
                return Ok(());
            }
        }
    }

    // Dispatch one datagram; true means the session is over.
    fn handle_datagram(&mut self, buffer: &[u8]) -> Result<bool, ReflectorError> {
        if buffer.len() < MAGIC_LEN {
            return Ok(false);
        }
        let magic: &[u8; MAGIC_LEN] = buffer[..MAGIC_LEN]
            .try_into()
            .expect("magic is four bytes");
        match magic {
            MAGIC_ACKN => {
                info!("reflector accepted connection");
                self.state = ClientState::Connected;
            }
            MAGIC_NACK => {
                info!("reflector rejected connection");
                self.state = ClientState::Closed;
                return Err(ReflectorError::Rejected);
            }
            MAGIC_DISC => {
                info!("reflector disconnected us");
                self.state = ClientState::Closed;
                return Ok(true);
            }
            MAGIC_PING => {
                self.send_pong()?;
                self.last_ping = Some(Instant::now());
            }
            MAGIC_VOICE => {
                if let Some(handler) = self.stream_handler.as_mut() {
                    match StreamDatagram::from_wire(&self.encoded_callsign, buffer) {
                        Ok(sd) => handler(sd),
                        Err(e) => info!("dropping bad stream datagram: {e}"),
                    }
                }
            }
            MAGIC_PACKET => {
                if let Some(handler) = self.packet_handler.as_mut() {
                    match Packet::from_bytes(&buffer[MAGIC_LEN..]) {
                        Ok(p) => handler(p),
                        Err(e) => info!("dropping bad packet datagram: {e}"),
                    }
                }
            }
            other => debug!("ignoring datagram with magic {:02x?}", other),
        }
        Ok(false)
    }

    /// Send `DISC` and drop the socket
    pub fn close(&mut self) -> Result<(), ReflectorError> {
        if let Some(socket) = self.socket.take() {
            let mut disc = [0u8; 10];
            disc[..4].copy_from_slice(MAGIC_DISC);
            disc[4..10].copy_from_slice(self.encoded_callsign.as_bytes());
            socket.send(&disc)?;
        }
        self.state = ClientState::Closed;
        Ok(())
    }

    fn send_pong(&self) -> Result<(), ReflectorError> {
        let socket = self.socket.as_ref().ok_or(ReflectorError::NotConnected)?;
        let mut pong = [0u8; 10];
        pong[..4].copy_from_slice(MAGIC_PONG);
        pong[4..10].copy_from_slice(self.encoded_callsign.as_bytes());
        socket.send(&pong)?;
        Ok(())
    }
}

/// Transmit-only handle to a reflector connection
pub struct ReflectorSender {
    socket: UdpSocket,
    encoded_callsign: Address,
}

impl ReflectorSender {
    /// Send a packet as an `M17P` datagram
    pub fn send_packet(&self, packet: &Packet) -> Result<(), ReflectorError> {
        let bytes = packet.to_bytes();
        let mut datagram = Vec::with_capacity(MAGIC_LEN + bytes.len());
        datagram.extend_from_slice(MAGIC_PACKET);
        datagram.extend_from_slice(&bytes);
        self.socket.send(&datagram)?;
        Ok(())
    }

    /// Send one voice stream frame as an `M17 ` datagram
    pub fn send_stream(
        &self,
        lsf: &Lsf,
        stream_id: u16,
        frame_number: u16,
        payload: &[u8; 16],
    ) -> Result<(), ReflectorError> {
        let mut datagram = Vec::with_capacity(STREAM_DATAGRAM_LEN);
        datagram.extend_from_slice(MAGIC_VOICE);
        datagram.extend_from_slice(&stream_id.to_be_bytes());
        datagram.extend_from_slice(&lsf.to_lsd());
        datagram.extend_from_slice(&frame_number.to_be_bytes());
        datagram.extend_from_slice(payload);
        let crc = crc::crc16(&datagram[..52]);
        datagram.extend_from_slice(&crc.to_be_bytes());
        self.socket.send(&datagram)?;
        Ok(())
    }

    /// Ask the reflector to end the session
    ///
    /// The reflector answers with its own `DISC`, which terminates
    /// the receive loop on the client side.
    pub fn disconnect(&self) -> Result<(), ReflectorError> {
        let mut disc = [0u8; 10];
        disc[..4].copy_from_slice(MAGIC_DISC);
        disc[4..10].copy_from_slice(self.encoded_callsign.as_bytes());
        self.socket.send(&disc)?;
        Ok(())
    }

    /// The local station address stamped into keepalives
    pub fn callsign(&self) -> &Address {
        &self.encoded_callsign
    }
}

//! M17 packets
//!
//! A packet is an LSF, a UTF-8 type rune, an opaque payload of up to
//! 823 bytes, and a CRC over the type and payload. On the air the
//! body rides in 26-byte frames: 25 payload bytes plus one marker
//! byte carrying either the frame number or, on the last frame, the
//! byte count.

use std::fmt;

use thiserror::Error;

use crate::crc;
use crate::lsf::{Lsf, LSF_LEN};

/// Payload bytes per packet frame
pub const FRAME_PAYLOAD_LEN: usize = 25;

/// A packet frame: 25 payload bytes and the marker byte
pub const FRAME_LEN: usize = 26;

/// Largest whole-packet body (33 frames of 25 bytes)
pub const MAX_PACKET_LEN: usize = 33 * FRAME_PAYLOAD_LEN;

/// Errors reassembling a packet from wire bytes
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PacketError {
    /// Too few bytes for an LSF, type rune, and CRC
    #[error("{0} bytes is too short for a packet")]
    TooShort(usize),

    /// The type field is not a valid UTF-8 rune
    #[error("packet type is not valid UTF-8")]
    BadTypeRune,
}

/// The packet type rune
///
/// Carried as UTF-8 ahead of the payload; the well-known values are
/// single bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PacketType(pub char);

impl PacketType {
    pub const RAW: PacketType = PacketType('\u{00}');
    pub const AX25: PacketType = PacketType('\u{01}');
    pub const APRS: PacketType = PacketType('\u{02}');
    pub const SIXLOWPAN: PacketType = PacketType('\u{03}');
    pub const IPV4: PacketType = PacketType('\u{04}');
    pub const SMS: PacketType = PacketType('\u{05}');
    pub const WINLINK: PacketType = PacketType('\u{06}');
}

/// An M17 packet
///
/// The in-memory and on-wire representations are identical; `crc` is
/// derived from the type and payload and recomputed by
/// [`Packet::new`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    pub lsf: Lsf,
    pub packet_type: PacketType,
    pub payload: Vec<u8>,
    pub crc: u16,
}

impl Packet {
    /// Build a packet, computing the body CRC
    pub fn new(lsf: Lsf, packet_type: PacketType, payload: &[u8]) -> Packet {
        let mut p = Packet {
            lsf,
            packet_type,
            payload: payload.to_vec(),
            crc: 0,
        };
        let body = p.payload_bytes();
        p.crc = crc::crc16(&body[..body.len() - 2]);
        p
    }

    /// Parse a packet from LSF-prefixed wire bytes
    pub fn from_bytes(buf: &[u8]) -> Result<Packet, PacketError> {
        if buf.len() < LSF_LEN + 3 {
            return Err(PacketError::TooShort(buf.len()));
        }
        let lsf_bytes: &[u8; LSF_LEN] = buf[..LSF_LEN]
            .try_into()
            .map_err(|_| PacketError::TooShort(buf.len()))?;
        Self::from_lsf_and_body(Lsf::from_bytes(lsf_bytes), &buf[LSF_LEN..])
    }

    /// Parse a packet body (type rune, payload, CRC) received with a
    /// separately-decoded LSF
    pub fn from_lsf_and_body(lsf: Lsf, body: &[u8]) -> Result<Packet, PacketError> {
        if body.len() < 3 {
            return Err(PacketError::TooShort(LSF_LEN + body.len()));
        }
        let (packet_type, rune_len) = decode_rune(body).ok_or(PacketError::BadTypeRune)?;
        if body.len() < rune_len + 2 {
            return Err(PacketError::TooShort(LSF_LEN + body.len()));
        }
        let payload = body[rune_len..body.len() - 2].to_vec();
        let crc = u16::from_be_bytes([body[body.len() - 2], body[body.len() - 1]]);
        Ok(Packet {
            lsf,
            packet_type: PacketType(packet_type),
            payload,
            crc,
        })
    }

    /// The body: type rune, payload, and CRC, big-endian
    pub fn payload_bytes(&self) -> Vec<u8> {
        let mut buf = String::new();
        buf.push(self.packet_type.0);
        let mut body = buf.into_bytes();
        body.extend_from_slice(&self.payload);
        body.extend_from_slice(&self.crc.to_be_bytes());
        body
    }

    /// The whole packet: LSF followed by the body
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = self.lsf.to_bytes().to_vec();
        buf.extend_from_slice(&self.payload_bytes());
        buf
    }

    /// True if the stored CRC matches the type and payload
    pub fn check_crc(&self) -> bool {
        crc::check(&self.payload_bytes())
    }

    /// Split the body into on-air frames
    pub fn frames(&self) -> Vec<[u8; FRAME_LEN]> {
        frame_body(&self.payload_bytes())
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} type {:#04x} ({} bytes)",
            self.lsf,
            self.packet_type.0 as u32,
            self.payload.len()
        )
    }
}

// Split a packet body into 26-byte frames.
//
// Non-final frames carry their frame number in bits 2..7 of the
// marker byte; the final frame sets bit 7 and carries its byte count
// instead. A final chunk of exactly 25 bytes is marked with count 25,
// not zero.
pub(crate) fn frame_body(body: &[u8]) -> Vec<[u8; FRAME_LEN]> {
    let mut frames = Vec::with_capacity(body.len() / FRAME_PAYLOAD_LEN + 1);
    let mut chunk = 0usize;
    let mut left = body.len();
    while left > 0 {
        let mut frame = [0u8; FRAME_LEN];
        let start = chunk * FRAME_PAYLOAD_LEN;
        if left > FRAME_PAYLOAD_LEN {
            frame[..FRAME_PAYLOAD_LEN].copy_from_slice(&body[start..start + FRAME_PAYLOAD_LEN]);
            frame[FRAME_PAYLOAD_LEN] = (chunk as u8) << 2;
            left -= FRAME_PAYLOAD_LEN;
        } else {
            frame[..left].copy_from_slice(&body[start..start + left]);
            let count = if left % FRAME_PAYLOAD_LEN == 0 {
                FRAME_PAYLOAD_LEN
            } else {
                left % FRAME_PAYLOAD_LEN
            };
            frame[FRAME_PAYLOAD_LEN] = (1 << 7) | ((count as u8) << 2);
            left = 0;
        }
        frames.push(frame);
        chunk += 1;
    }
    frames
}

// Decode one UTF-8 rune from the head of `buf`.
fn decode_rune(buf: &[u8]) -> Option<(char, usize)> {
    for len in 1..=buf.len().min(4) {
        if let Ok(s) = std::str::from_utf8(&buf[..len]) {
            if let Some(c) = s.chars().next() {
                return Some((c, len));
            }
        }
    }
    None
}

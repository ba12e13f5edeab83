//! Link Setup Frame
//!
//! Every M17 transmission opens with a 30-byte LSF: destination and
//! source addresses, a 16-bit type field, 14 bytes of metadata, and a
//! CRC. The type field fixes the mode (packet or stream) for the
//! whole transmission. Stream transmissions additionally repeat the
//! LSF in-band, five bytes at a time, through the LICH.

use std::fmt;

use crate::callsign::{Address, CallsignError};
use crate::crc;

/// LSF length on the wire
pub const LSF_LEN: usize = 30;

/// Link Setup Data: an LSF without its CRC, as carried in stream
/// datagrams
pub const LSD_LEN: usize = 28;

const DST_POS: usize = 0;
const SRC_POS: usize = 6;
const TYPE_POS: usize = 12;
const META_POS: usize = 14;
const CRC_POS: usize = 28;

/// Frame mode, bit 0 of the type field
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameMode {
    Packet = 0,
    Stream = 1,
}

/// Stream payload type, bits 1..2 of the type field
///
/// Only defined for stream mode; packet-mode LSFs carry zero here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataType {
    Reserved = 0,
    Data = 1,
    Voice = 2,
    VoiceData = 3,
}

/// A Link Setup Frame
///
/// `Lsf` is a plain value: mutate the fields freely and call
/// [`Lsf::calc_crc`] before putting it on the air. All receive paths
/// validate with [`Lsf::check_crc`] before trusting the contents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Lsf {
    pub dst: [u8; 6],
    pub src: [u8; 6],
    pub frame_type: [u8; 2],
    pub meta: [u8; 14],
    pub crc: [u8; 2],
}

impl Lsf {
    /// Build an LSF for a new transmission
    ///
    /// The CRC is computed immediately; the result is valid as-is.
    pub fn new(
        dst_callsign: &str,
        src_callsign: &str,
        mode: FrameMode,
        data_type: DataType,
        can: u8,
    ) -> Result<Lsf, CallsignError> {
        let mut lsf = Lsf {
            dst: *Address::encode(dst_callsign)?.as_bytes(),
            src: *Address::encode(src_callsign)?.as_bytes(),
            ..Lsf::default()
        };
        // data type is only defined for stream mode
        let dt = match mode {
            FrameMode::Packet => 0,
            FrameMode::Stream => data_type as u8,
        };
        lsf.frame_type[0] = can & 0x7;
        lsf.frame_type[1] = (mode as u8 & 0x1) | ((dt & 0x3) << 1);
        lsf.calc_crc();
        Ok(lsf)
    }

    /// Reconstruct an LSF from its 30 wire bytes
    pub fn from_bytes(buf: &[u8; LSF_LEN]) -> Lsf {
        let mut lsf = Lsf::default();
        lsf.dst.copy_from_slice(&buf[DST_POS..SRC_POS]);
        lsf.src.copy_from_slice(&buf[SRC_POS..TYPE_POS]);
        lsf.frame_type.copy_from_slice(&buf[TYPE_POS..META_POS]);
        lsf.meta.copy_from_slice(&buf[META_POS..CRC_POS]);
        lsf.crc.copy_from_slice(&buf[CRC_POS..LSF_LEN]);
        lsf
    }

    /// Reconstruct an LSF from the 28-byte LSD carried in a stream
    /// datagram, recomputing the CRC
    pub fn from_lsd(lsd: &[u8; LSD_LEN]) -> Lsf {
        let mut lsf = Lsf::default();
        lsf.dst.copy_from_slice(&lsd[DST_POS..SRC_POS]);
        lsf.src.copy_from_slice(&lsd[SRC_POS..TYPE_POS]);
        lsf.frame_type.copy_from_slice(&lsd[TYPE_POS..META_POS]);
        lsf.meta.copy_from_slice(&lsd[META_POS..CRC_POS]);
        lsf.calc_crc();
        lsf
    }

    /// The 30 wire bytes
    pub fn to_bytes(&self) -> [u8; LSF_LEN] {
        let mut buf = [0u8; LSF_LEN];
        buf[DST_POS..SRC_POS].copy_from_slice(&self.dst);
        buf[SRC_POS..TYPE_POS].copy_from_slice(&self.src);
        buf[TYPE_POS..META_POS].copy_from_slice(&self.frame_type);
        buf[META_POS..CRC_POS].copy_from_slice(&self.meta);
        buf[CRC_POS..LSF_LEN].copy_from_slice(&self.crc);
        buf
    }

    /// The 28-byte LSD form (everything but the CRC)
    pub fn to_lsd(&self) -> [u8; LSD_LEN] {
        let mut buf = [0u8; LSD_LEN];
        buf[DST_POS..SRC_POS].copy_from_slice(&self.dst);
        buf[SRC_POS..TYPE_POS].copy_from_slice(&self.src);
        buf[TYPE_POS..META_POS].copy_from_slice(&self.frame_type);
        buf[META_POS..CRC_POS].copy_from_slice(&self.meta);
        buf
    }

    /// Recompute and store the CRC over bytes 0..28
    pub fn calc_crc(&mut self) -> u16 {
        let bytes = self.to_bytes();
        let crc = crc::crc16(&bytes[..CRC_POS]);
        self.crc = crc.to_be_bytes();
        crc
    }

    /// True if the stored CRC matches the contents
    pub fn check_crc(&self) -> bool {
        crc::check(&self.to_bytes())
    }

    /// Packet or stream, from bit 0 of the type field
    pub fn mode(&self) -> FrameMode {
        if self.frame_type[1] & 0x1 != 0 {
            FrameMode::Stream
        } else {
            FrameMode::Packet
        }
    }

    /// Stream payload type, from bits 1..2 of the type field
    pub fn data_type(&self) -> DataType {
        match (self.frame_type[1] >> 1) & 0x3 {
            1 => DataType::Data,
            2 => DataType::Voice,
            3 => DataType::VoiceData,
            _ => DataType::Reserved,
        }
    }

    /// Channel Access Number
    pub fn can(&self) -> u8 {
        self.frame_type[0] & 0x7
    }

    /// Destination address
    pub fn dst_address(&self) -> Address {
        Address(self.dst)
    }

    /// Source address
    pub fn src_address(&self) -> Address {
        Address(self.src)
    }
}

impl fmt::Display for Lsf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} > {} ({:?}, CAN {})",
            self.src_address(),
            self.dst_address(),
            self.mode(),
            self.can()
        )
    }
}

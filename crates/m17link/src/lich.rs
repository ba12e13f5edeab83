//! Link Information Channel
//!
//! Stream frames carry the 30-byte LSF in-band, six bytes at a time:
//! five LSF bytes plus a counter byte whose top three bits say which
//! fifth of the LSF this is. Each 6-byte chunk is split into four
//! 12-bit words and Golay-encoded to 96 bits on the wire, so a chunk
//! survives considerable channel damage. [`LichAssembler`] collects
//! chunks until all six have arrived and the reassembled LSF passes
//! its CRC.

#[cfg(not(test))]
use log::debug;
#[cfg(test)]
use std::println as debug;

use crate::golay::{self, Uncorrectable};
use crate::lsf::{Lsf, LSF_LEN};
use crate::waveform::SoftBit;

/// Decoded LICH chunk length: five LSF bytes plus the counter byte
pub const LICH_CHUNK_LEN: usize = 6;

/// Encoded LICH length in bytes
pub const LICH_ENCODED_LEN: usize = 12;

/// Soft bits of LICH at the head of every deinterleaved stream payload
pub const LICH_SOFT_BITS: usize = 96;

/// Golay-encode a 6-byte LICH chunk to 12 wire bytes
pub fn encode_lich(chunk: &[u8; LICH_CHUNK_LEN]) -> [u8; LICH_ENCODED_LEN] {
    let words = [
        ((chunk[0] as u16) << 4) | ((chunk[1] as u16) >> 4),
        (((chunk[1] & 0x0F) as u16) << 8) | chunk[2] as u16,
        ((chunk[3] as u16) << 4) | ((chunk[4] as u16) >> 4),
        (((chunk[4] & 0x0F) as u16) << 8) | chunk[5] as u16,
    ];
    let mut out = [0u8; LICH_ENCODED_LEN];
    for (i, &word) in words.iter().enumerate() {
        let cw = golay::encode(word);
        out[3 * i] = (cw >> 16) as u8;
        out[3 * i + 1] = (cw >> 8) as u8;
        out[3 * i + 2] = cw as u8;
    }
    out
}

/// Soft-decode 96 LICH soft bits back into a 6-byte chunk
///
/// Fails if any of the four Golay words is uncorrectable; the caller
/// drops the chunk and the LSF reassembly is not advanced.
pub fn decode_lich(soft: &[SoftBit; LICH_SOFT_BITS]) -> Result<[u8; LICH_CHUNK_LEN], Uncorrectable> {
    let mut words = [0u16; 4];
    for (i, word) in words.iter_mut().enumerate() {
        let cw: &[SoftBit; 24] = soft[24 * i..24 * (i + 1)]
            .try_into()
            .expect("LICH codeword slice is 24 soft bits");
        *word = golay::soft_decode(cw)?;
    }
    let mut out = [0u8; LICH_CHUNK_LEN];
    out[0] = (words[0] >> 4) as u8;
    out[1] = ((words[0] as u8 & 0x0F) << 4) | ((words[1] >> 8) as u8 & 0x0F);
    out[2] = words[1] as u8;
    out[3] = (words[2] >> 4) as u8;
    out[4] = ((words[2] as u8 & 0x0F) << 4) | ((words[3] >> 8) as u8 & 0x0F);
    out[5] = words[3] as u8;
    Ok(out)
}

/// The chunk counter from the top three bits of the final byte
pub fn chunk_counter(chunk: &[u8; LICH_CHUNK_LEN]) -> u8 {
    chunk[5] >> 5
}

/// Rebuilds an LSF from LICH chunks
///
/// Chunks may arrive in any order and repeat freely; each overwrites
/// its slot. Once all six are present the LSF is CRC-checked: on
/// success it is emitted exactly once, on failure all chunk state is
/// discarded and collection starts over.
#[derive(Clone, Debug, Default)]
pub struct LichAssembler {
    bytes: [u8; LSF_LEN],
    have: u8,
    complete: bool,
}

impl LichAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard all chunk state
    pub fn reset(&mut self) {
        self.have = 0;
        self.complete = false;
    }

    /// True if an LSF has already been emitted
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Add one decoded chunk; returns the LSF when it first completes
    pub fn push(&mut self, chunk: &[u8; LICH_CHUNK_LEN]) -> Option<Lsf> {
        if self.complete {
            return None;
        }
        let index = chunk_counter(chunk) as usize;
        if index >= 6 {
            return None;
        }
        self.bytes[index * 5..index * 5 + 5].copy_from_slice(&chunk[..5]);
        self.have |= 1 << index;
        if self.have != 0x3F {
            return None;
        }

        let lsf = Lsf::from_bytes(&self.bytes);
        if lsf.check_crc() {
            self.complete = true;
            Some(lsf)
        } else {
            debug!("reassembled LSF failed CRC, discarding chunks");
            self.have = 0;
            None
        }
    }
}

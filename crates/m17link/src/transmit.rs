//! Transmit path
//!
//! Assembles a whole packet transmission as a symbol vector: 192
//! preamble symbols, the LSF syncword and encoded LSF, one
//! sync-plus-payload frame per 25-byte packet chunk, and 192 symbols
//! of EOT marker. The result is a lazy-free `Vec<Symbol>` that any
//! sink (modem transport, file, socket) can consume at the 4800
//! sym/s channel rate.

use crate::convol::{
    self, LSF_FINAL_BIT, LSF_PUNCTURE, PACKET_FINAL_BIT, PACKET_PUNCTURE,
};
use crate::interleave::interleave_bits;
use crate::packet::Packet;
use crate::randomize::randomize_bits;
use crate::waveform::{
    append_eot, append_payload, append_preamble, append_syncword, Preamble, Symbol,
    BITS_PER_PAYLOAD, LSF_SYNC, PACKET_SYNC, SYMBOLS_PER_FRAME,
};

/// Encode a packet into the full on-air symbol sequence
pub fn packet_transmission(packet: &Packet) -> Vec<Symbol> {
    // preamble + LSF + up to 33 frames + EOT
    let mut out = Vec::with_capacity(36 * SYMBOLS_PER_FRAME);

    append_preamble(&mut out, Preamble::Lsf);
    append_syncword(&mut out, LSF_SYNC);
    let lsf_bits = convol::encode(&packet.lsf.to_bytes(), &LSF_PUNCTURE, LSF_FINAL_BIT);
    append_payload(&mut out, &rf_bits(&lsf_bits));

    for frame in packet.frames() {
        append_syncword(&mut out, PACKET_SYNC);
        let frame_bits = convol::encode(&frame, &PACKET_PUNCTURE, PACKET_FINAL_BIT);
        append_payload(&mut out, &rf_bits(&frame_bits));
    }

    append_eot(&mut out);
    out
}

// Interleave and whiten one payload's worth of encoded bits.
fn rf_bits(encoded: &[u8]) -> [u8; BITS_PER_PAYLOAD] {
    let mut bits = [0u8; BITS_PER_PAYLOAD];
    bits.copy_from_slice(encoded);
    let mut out = interleave_bits(&bits);
    randomize_bits(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lsf::{DataType, FrameMode, Lsf};
    use crate::packet::PacketType;
    use crate::waveform::{SYMBOLS_PER_PAYLOAD, SYMBOLS_PER_SYNCWORD};

    #[test]
    fn test_transmission_layout() {
        let lsf = Lsf::new("N1ADJ", "N0CALL", FrameMode::Packet, DataType::Reserved, 0).unwrap();
        let packet = Packet::new(lsf, PacketType::SMS, b"Hello from me!\0");
        let symbols = packet_transmission(&packet);

        // one frame of body: preamble, LSF sync + payload, packet sync + payload, EOT
        let expected = SYMBOLS_PER_FRAME
            + (SYMBOLS_PER_SYNCWORD + SYMBOLS_PER_PAYLOAD)
            + (SYMBOLS_PER_SYNCWORD + SYMBOLS_PER_PAYLOAD)
            + SYMBOLS_PER_FRAME;
        assert_eq!(symbols.len(), expected);

        // preamble alternates +3/-3
        assert_eq!(&symbols[..4], &[3.0, -3.0, 3.0, -3.0]);

        // LSF syncword follows the preamble
        assert_eq!(
            &symbols[SYMBOLS_PER_FRAME..SYMBOLS_PER_FRAME + 8],
            &[3.0, 3.0, 3.0, 3.0, -3.0, -3.0, 3.0, -3.0]
        );

        // packet syncword follows the LSF payload
        let pkt_sync = SYMBOLS_PER_FRAME + SYMBOLS_PER_SYNCWORD + SYMBOLS_PER_PAYLOAD;
        assert_eq!(
            &symbols[pkt_sync..pkt_sync + 8],
            &[3.0, -3.0, 3.0, 3.0, -3.0, -3.0, -3.0, -3.0]
        );

        // every symbol is on the 4-FSK grid
        assert!(symbols
            .iter()
            .all(|s| [-3.0, -1.0, 1.0, 3.0].contains(s)));
    }

    #[test]
    fn test_multi_frame_transmission() {
        let lsf = Lsf::new("N1ADJ", "N0CALL", FrameMode::Packet, DataType::Reserved, 0).unwrap();
        // 60-byte payload -> 63-byte body -> three frames
        let packet = Packet::new(lsf, PacketType::SMS, &[0x41; 60]);
        let symbols = packet_transmission(&packet);
        let expected = SYMBOLS_PER_FRAME
            + (SYMBOLS_PER_SYNCWORD + SYMBOLS_PER_PAYLOAD) * 4
            + SYMBOLS_PER_FRAME;
        assert_eq!(symbols.len(), expected);
    }
}

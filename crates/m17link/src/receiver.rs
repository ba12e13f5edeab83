//! Receive state machine
//!
//! The [`FrameDecoder`] consumes an oversampled soft-symbol stream
//! (five samples per symbol) and produces link-layer frames. It keeps
//! a rolling window of samples large enough for one syncword search
//! with a whole frame of look-ahead, and walks it one sample at a
//! time until a syncword lands inside acceptance distance:
//!
//! * an LSF sync while idle opens a transmission and decides packet
//!   or stream mode;
//! * packet syncs accumulate 25-byte chunks until the final frame's
//!   CRC gate;
//! * stream syncs yield a Golay-protected LICH chunk plus a voice
//!   frame, with the LSF reassembled from chunks when the opening
//!   LSF was missed;
//! * BERT syncs are recognized and their payload discarded.
//!
//! Bit errors never surface as errors here: the Viterbi metric grows,
//! the CRC fails, and the frame is quietly dropped.
//!
//! Stream frame numbers are emitted byte-swapped relative to their
//! over-the-air order, matching the value relays put on the UDP wire.

mod sync;

#[cfg(not(test))]
use log::{debug, info};
#[cfg(test)]
use std::{println as debug, println as info};

use std::collections::VecDeque;

use arrayvec::ArrayVec;

use crate::convol::{LSF_PUNCTURE, PACKET_PUNCTURE, STREAM_PUNCTURE};
use crate::interleave::deinterleave_soft;
use crate::lich::{decode_lich, LichAssembler, LICH_SOFT_BITS};
use crate::lsf::{FrameMode, Lsf, LSF_LEN};
use crate::packet::{Packet, FRAME_PAYLOAD_LEN, MAX_PACKET_LEN};
use crate::randomize::derandomize_soft;
use crate::viterbi::ViterbiDecoder;
use crate::waveform::{
    SoftBit, Symbol, BITS_PER_PAYLOAD, SAMPLES_PER_SYMBOL, SOFT_ONE, SYMBOLS_PER_PAYLOAD,
};

use self::sync::{sync_distance, SyncKind, SYNC_WINDOW_SAMPLES};

// 8 preamble symbols, 8 for the syncword, 960 samples of payload
// look-ahead twice over, slack for timing-offset refinement, and room
// to refill in useful slurps.
const SYMBOL_BUF_SIZE: usize = 8 * 5 + 2 * (8 * 5 + 4800 / 25 * 5) + 2 + 256;

// Iterations a synced receiver waits for its next frame before
// giving up (roughly 16 s of samples at 4800 sym/s).
const SYNC_TIMEOUT: u32 = 960 * 2;

// Acceptance gates for the syncword search
const LSF_DISTANCE: f32 = 4.5;
const FRAME_DISTANCE: f32 = 5.0;

/// A frame delivered by the receive state machine
#[derive(Clone, Debug, PartialEq)]
pub enum RxFrame {
    /// A stream transmission opened with an on-air LSF
    StreamStart { lsf: Lsf, stream_id: u16 },

    /// One voice frame of an active stream
    StreamFrame {
        lsf: Lsf,
        stream_id: u16,
        /// Frame number in relay wire order (see module docs)
        frame_number: u16,
        voice: [u8; 16],
    },

    /// A completely reassembled, CRC-valid packet
    Packet(Packet),
}

impl std::fmt::Display for RxFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RxFrame::StreamStart { lsf, stream_id } => {
                write!(f, "stream {stream_id:04x} start: {lsf}")
            }
            RxFrame::StreamFrame {
                stream_id,
                frame_number,
                ..
            } => write!(f, "stream {stream_id:04x} frame {frame_number:04x}"),
            RxFrame::Packet(p) => write!(f, "packet: {p}"),
        }
    }
}

/// M17 receive state machine
///
/// Feed it samples through [`FrameDecoder::iter_frames`]; the
/// iterator consumes as much of the source as it takes to produce
/// the next frame and returns `None` when the source runs dry.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: VecDeque<Symbol>,
    synced: Option<SyncKind>,
    lsf: Option<Lsf>,
    got_lsf: bool,

    packet_data: ArrayVec<u8, MAX_PACKET_LEN>,
    last_packet_fn: Option<usize>,

    lich: LichAssembler,
    last_stream_fn: Option<u16>,
    stream_id: u16,

    timeout: u32,
    viterbi: ViterbiDecoder,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to idle and discard all buffered state
    pub fn reset(&mut self) {
        self.buf.clear();
        self.drop_sync();
        self.timeout = 0;
    }

    /// Decode frames from a source of samples
    ///
    /// Binds an iterator that pulls samples from `source` until the
    /// next decodable frame. The source must deliver soft symbols at
    /// [`SAMPLES_PER_SYMBOL`] samples each; the decoder reads every
    /// fifth sample and uses the rest for timing refinement.
    #[must_use = "iterators are lazy and do nothing unless consumed"]
    pub fn iter_frames<'d, I>(&'d mut self, source: I) -> impl Iterator<Item = RxFrame> + 'd
    where
        I: IntoIterator<Item = Symbol> + 'd,
    {
        FrameDecoderIter {
            decoder: self,
            source: source.into_iter(),
        }
    }

    // Pull samples until a frame decodes or the source is exhausted.
    fn process<I>(&mut self, source: &mut I) -> Option<RxFrame>
    where
        I: Iterator<Item = Symbol>,
    {
        loop {
            while self.buf.len() < SYMBOL_BUF_SIZE {
                match source.next() {
                    Some(sample) => self.buf.push_back(sample),
                    None => break,
                }
            }
            if self.buf.len() < SYNC_WINDOW_SAMPLES + 2 {
                return None;
            }

            let (dist, kind) = sync_distance(&self.buf, 0);
            let event = match kind {
                SyncKind::Lsf if dist < LSF_DISTANCE && self.synced.is_none() => {
                    debug!("LSF sync, distance {dist:.2}");
                    let pld = self.extract_payload(dist, kind)?;
                    self.handle_lsf(&pld)
                }
                SyncKind::Packet
                    if dist < FRAME_DISTANCE && self.synced == Some(SyncKind::Packet) =>
                {
                    debug!("packet sync, distance {dist:.2}");
                    let pld = self.extract_payload(dist, kind)?;
                    self.handle_packet_frame(&pld)
                }
                SyncKind::Stream
                    if dist < FRAME_DISTANCE && self.synced != Some(SyncKind::Packet) =>
                {
                    debug!("stream sync, distance {dist:.2}");
                    let pld = self.extract_payload(dist, kind)?;
                    self.handle_stream_frame(&pld)
                }
                SyncKind::Bert if dist < FRAME_DISTANCE && self.synced.is_none() => {
                    debug!("BERT sync, distance {dist:.2}; payload ignored");
                    let _ = self.extract_payload(dist, kind)?;
                    None
                }
                _ => {
                    // nothing matched: slide the window one sample
                    self.buf.pop_front();
                    None
                }
            };

            if self.synced.is_some() {
                self.timeout += 1;
                if self.timeout > SYNC_TIMEOUT {
                    info!("sync timeout, returning to idle");
                    self.drop_sync();
                }
            }

            if event.is_some() {
                return event;
            }
        }
    }

    // Leave the synced state and forget any partial reception.
    fn drop_sync(&mut self) {
        self.synced = None;
        self.lsf = None;
        self.got_lsf = false;
        self.timeout = 0;
        self.last_packet_fn = None;
        self.last_stream_fn = None;
        self.packet_data.clear();
        self.lich.reset();
    }

    // Refine the sample offset, then pull 184 payload symbols out of
    // the buffer. Returns None only when the source has run dry.
    fn extract_payload(&mut self, mut dist: f32, kind: SyncKind) -> Option<[Symbol; SYMBOLS_PER_PAYLOAD]> {
        let mut offset = 0;
        for extra in 1..=2 {
            if self.buf.len() < SYNC_WINDOW_SAMPLES + extra {
                return None;
            }
            let (d, k) = sync_distance(&self.buf, extra);
            if k == kind && d < dist {
                dist = d;
                offset = extra;
            }
        }
        self.buf.drain(..offset);

        let sync_symbols = kind.sync_symbols();
        let sync_samples = sync_symbols * SAMPLES_PER_SYMBOL;
        if self.buf.len() < sync_samples + SYMBOLS_PER_PAYLOAD * SAMPLES_PER_SYMBOL {
            return None;
        }
        self.buf.drain(..sync_samples);

        let mut pld = [0.0f32; SYMBOLS_PER_PAYLOAD];
        for (i, symbol) in pld.iter_mut().enumerate() {
            *symbol = self.buf[i * SAMPLES_PER_SYMBOL];
        }
        // advance past most, but not all, of the payload so the next
        // syncword stays inside the search window
        self.buf
            .drain(..(SYMBOLS_PER_PAYLOAD - offset - sync_symbols) * SAMPLES_PER_SYMBOL);
        Some(pld)
    }

    fn handle_lsf(&mut self, pld: &[Symbol; SYMBOLS_PER_PAYLOAD]) -> Option<RxFrame> {
        // a fresh link setup supersedes whatever we held before
        self.got_lsf = false;

        let soft = soft_payload(pld);
        let (bytes, metric) = self.viterbi.decode_punctured(&soft, &LSF_PUNCTURE);
        debug!("LSF Viterbi error: {metric:.1}");

        // drop the leading flush byte
        let lsf_bytes: &[u8; LSF_LEN] = bytes[1..1 + LSF_LEN]
            .try_into()
            .expect("LSF decode yields 31 bytes");
        let lsf = Lsf::from_bytes(lsf_bytes);
        if !lsf.check_crc() {
            debug!("bad LSF CRC, staying idle");
            return None;
        }

        debug!("received LSF: {lsf}");
        self.got_lsf = true;
        self.timeout = 0;
        self.last_packet_fn = None;
        self.last_stream_fn = None;

        if lsf.mode() == FrameMode::Stream {
            self.synced = Some(SyncKind::Stream);
            // the full LSF is in hand, LICH chunks have nothing to add
            self.lich.reset();
            self.stream_id = rand::random();
            self.lsf = Some(lsf.clone());
            Some(RxFrame::StreamStart {
                lsf,
                stream_id: self.stream_id,
            })
        } else {
            self.synced = Some(SyncKind::Packet);
            self.packet_data = ArrayVec::from([0u8; MAX_PACKET_LEN]);
            self.lsf = Some(lsf);
            None
        }
    }

    fn handle_packet_frame(&mut self, pld: &[Symbol; SYMBOLS_PER_PAYLOAD]) -> Option<RxFrame> {
        let soft = soft_payload(pld);
        let (decoded, metric) = self.viterbi.decode_punctured(&soft, &PACKET_PUNCTURE);
        let frame = &decoded[1..]; // leading flush byte

        let last_frame = frame[25] >> 7 != 0;
        let mut fn_or_count = ((frame[25] >> 2) & 0x1F) as usize;
        if last_frame && fn_or_count > FRAME_PAYLOAD_LEN {
            info!("clamping overrun byte count {fn_or_count} in last frame to {FRAME_PAYLOAD_LEN}");
            fn_or_count = FRAME_PAYLOAD_LEN;
        }
        debug!("packet frame {fn_or_count} (last: {last_frame}), Viterbi error {metric:.1}");

        let expected = self.last_packet_fn.map_or(0, |n| n + 1);
        if !last_frame && fn_or_count <= 31 && fn_or_count == expected {
            let start = fn_or_count * FRAME_PAYLOAD_LEN;
            self.packet_data[start..start + FRAME_PAYLOAD_LEN]
                .copy_from_slice(&frame[..FRAME_PAYLOAD_LEN]);
            self.last_packet_fn = Some(fn_or_count);
            return None;
        }
        if !last_frame {
            return None;
        }

        let start = expected * FRAME_PAYLOAD_LEN;
        self.packet_data[start..start + fn_or_count].copy_from_slice(&frame[..fn_or_count]);
        self.packet_data.truncate(start + fn_or_count);

        let event = if crate::crc::check(&self.packet_data) {
            let lsf = self.lsf.take().unwrap_or_default();
            match Packet::from_lsf_and_body(lsf, &self.packet_data) {
                Ok(packet) => Some(RxFrame::Packet(packet)),
                Err(e) => {
                    info!("dropping undecodable packet body: {e}");
                    None
                }
            }
        } else {
            debug!("dropping packet with bad CRC");
            None
        };
        // either way this transmission is over
        self.synced = None;
        self.lsf = None;
        event
    }

    fn handle_stream_frame(&mut self, pld: &[Symbol; SYMBOLS_PER_PAYLOAD]) -> Option<RxFrame> {
        let soft = soft_payload(pld);
        let lich_soft: &[SoftBit; LICH_SOFT_BITS] = soft[..LICH_SOFT_BITS]
            .try_into()
            .expect("LICH occupies the first 96 soft bits");
        let lich = decode_lich(lich_soft);

        let (decoded, metric) = self
            .viterbi
            .decode_punctured(&soft[LICH_SOFT_BITS..], &STREAM_PUNCTURE);
        // flush byte, then the 16-bit frame number, then 16 voice bytes
        let frame_number = ((decoded[1] as u16) << 8) | decoded[2] as u16;
        let voice: [u8; 16] = decoded[3..19]
            .try_into()
            .expect("stream decode yields 19 bytes");

        if self.last_stream_fn == Some(frame_number) {
            return None;
        }
        self.last_stream_fn = Some(frame_number);

        match lich {
            Ok(chunk) if !self.got_lsf => {
                if let Some(lsf) = self.lich.push(&chunk) {
                    debug!("reassembled stream LSF from LICH: {lsf}");
                    self.lsf = Some(lsf);
                    self.got_lsf = true;
                    self.timeout = 0;
                    self.stream_id = rand::random();
                }
            }
            Ok(_) => {}
            Err(e) => debug!("dropping LICH chunk: {e}"),
        }

        debug!("stream frame {frame_number:04x}, Viterbi error {metric:.1}");
        if !self.got_lsf {
            return None;
        }
        self.timeout = 0;
        let lsf = self.lsf.clone().unwrap_or_default();
        Some(RxFrame::StreamFrame {
            lsf,
            stream_id: self.stream_id,
            // relay wire order swaps the bytes of the frame number
            frame_number: frame_number.swap_bytes(),
            voice,
        })
    }
}

// Slice 184 received symbols into 368 soft bits, dewhiten, and
// deinterleave.
fn soft_payload(pld: &[Symbol; SYMBOLS_PER_PAYLOAD]) -> [SoftBit; BITS_PER_PAYLOAD] {
    let mut soft = slice_symbols(pld);
    derandomize_soft(&mut soft);
    deinterleave_soft(&soft)
}

// Map each symbol to its two soft bits: the dibit MSB first, then the
// LSB, by linear interpolation between the nominal symbol levels.
fn slice_symbols(pld: &[Symbol; SYMBOLS_PER_PAYLOAD]) -> [SoftBit; BITS_PER_PAYLOAD] {
    let mut soft = [0u16; BITS_PER_PAYLOAD];
    for (i, &sym) in pld.iter().enumerate() {
        // low bit: one at the outer levels, zero between the inner ones
        soft[2 * i + 1] = quantize(if sym >= 3.0 {
            1.0
        } else if sym >= 1.0 {
            (sym - 1.0) / 2.0
        } else if sym >= -1.0 {
            0.0
        } else if sym >= -3.0 {
            -(1.0 + sym) / 2.0
        } else {
            1.0
        });

        // high bit: sign of the symbol
        soft[2 * i] = quantize(if sym >= 1.0 {
            0.0
        } else if sym >= -1.0 {
            0.5 - sym / 2.0
        } else {
            1.0
        });
    }
    soft
}

fn quantize(value: f32) -> SoftBit {
    (value.clamp(0.0, 1.0) * SOFT_ONE as f32).round() as SoftBit
}

struct FrameDecoderIter<'d, I>
where
    I: Iterator<Item = Symbol>,
{
    decoder: &'d mut FrameDecoder,
    source: I,
}

impl<'d, I> Iterator for FrameDecoderIter<'d, I>
where
    I: Iterator<Item = Symbol>,
{
    type Item = RxFrame;

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.decoder.process(&mut self.source)?;
        info!("{frame}");
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lsf::DataType;
    use crate::packet::PacketType;
    use crate::transmit::packet_transmission;
    use crate::waveform::{SOFT_ERASURE, SOFT_ZERO};

    fn oversample(symbols: &[Symbol]) -> Vec<Symbol> {
        symbols
            .iter()
            .flat_map(|&s| std::iter::repeat(s).take(SAMPLES_PER_SYMBOL))
            .collect()
    }

    fn sms_packet(payload: &[u8]) -> Packet {
        let lsf = Lsf::new("N1ADJ", "N0CALL", FrameMode::Packet, DataType::Reserved, 0).unwrap();
        Packet::new(lsf, PacketType::SMS, payload)
    }

    #[test]
    fn test_slice_symbols() {
        let mut pld = [0.0f32; SYMBOLS_PER_PAYLOAD];
        pld[0] = 1.0; // dibit 00
        pld[1] = 3.0; // dibit 01
        pld[2] = -1.0; // dibit 10
        pld[3] = -3.0; // dibit 11
        let soft = slice_symbols(&pld);
        assert_eq!(&soft[..8], &[
            SOFT_ZERO, SOFT_ZERO, // +1
            SOFT_ZERO, SOFT_ONE, // +3
            SOFT_ONE, SOFT_ZERO, // -1
            SOFT_ONE, SOFT_ONE, // -3
        ]);

        // a symbol between levels slices to partial confidence
        pld[4] = 2.0;
        let soft = slice_symbols(&pld);
        assert_eq!(soft[9], SOFT_ERASURE + 1);

        // zero is ambiguous in the high bit, confident zero in the low
        assert_eq!(soft[10], SOFT_ERASURE + 1);
        assert_eq!(soft[11], SOFT_ZERO);
    }

    #[test]
    fn test_receive_sms_packet() {
        let packet = sms_packet(b"Hello from me!\0");
        let samples = oversample(&packet_transmission(&packet));

        let mut decoder = FrameDecoder::new();
        let frames: Vec<RxFrame> = decoder.iter_frames(samples).collect();
        assert_eq!(frames, vec![RxFrame::Packet(packet)]);
    }

    #[test]
    fn test_receive_multi_frame_packet() {
        // 80-byte payload spans four packet frames
        let payload: Vec<u8> = (0..80u8).map(|i| i.wrapping_mul(7)).collect();
        let packet = sms_packet(&payload);
        let samples = oversample(&packet_transmission(&packet));

        let mut decoder = FrameDecoder::new();
        let frames: Vec<RxFrame> = decoder.iter_frames(samples).collect();
        assert_eq!(frames, vec![RxFrame::Packet(packet)]);
    }

    #[test]
    fn test_receive_with_sample_offset() {
        // syncword search still locks when the stream starts off-grid
        let packet = sms_packet(b"offset test\0");
        for offset in 1..=2usize {
            let mut samples = vec![0.0f32; offset];
            samples.extend(oversample(&packet_transmission(&packet)));
            let mut decoder = FrameDecoder::new();
            let frames: Vec<RxFrame> = decoder.iter_frames(samples).collect();
            assert_eq!(frames, vec![RxFrame::Packet(packet.clone())], "offset {offset}");
        }
    }

    #[test]
    fn test_receive_with_mild_noise() {
        let packet = sms_packet(b"noise test\0");
        let mut samples = oversample(&packet_transmission(&packet));
        for (i, s) in samples.iter_mut().enumerate() {
            *s += if i % 2 == 0 { 0.4 } else { -0.4 };
        }
        let mut decoder = FrameDecoder::new();
        let frames: Vec<RxFrame> = decoder.iter_frames(samples).collect();
        assert_eq!(frames, vec![RxFrame::Packet(packet)]);
    }

    #[test]
    fn test_corrupt_payload_dropped_silently() {
        let packet = sms_packet(b"drop me\0");
        let mut samples = oversample(&packet_transmission(&packet));
        // invert a stretch of the packet-frame payload beyond repair
        let pkt_payload_start = (192 + 8 + 184 + 8) * SAMPLES_PER_SYMBOL;
        for s in samples[pkt_payload_start..pkt_payload_start + 400].iter_mut() {
            *s = -*s;
        }
        let mut decoder = FrameDecoder::new();
        let frames: Vec<RxFrame> = decoder.iter_frames(samples).collect();
        assert!(frames.is_empty());
    }

    #[test]
    fn test_idle_noise_produces_nothing() {
        let samples: Vec<Symbol> = (0..20_000)
            .map(|i| ((i * 2654435761u64 as usize) % 7) as f32 - 3.0)
            .collect();
        let mut decoder = FrameDecoder::new();
        assert_eq!(decoder.iter_frames(samples).next(), None);
    }

    // Build one stream frame's worth of on-air samples.
    fn stream_frame_samples(lich_chunk: &[u8; 6], frame_number: u16, voice: &[u8; 16]) -> Vec<Symbol> {
        use crate::convol::{encode, LSF_FINAL_BIT, STREAM_PUNCTURE};
        use crate::interleave::interleave_bits;
        use crate::lich::encode_lich;
        use crate::randomize::randomize_bits;
        use crate::waveform::{append_payload, append_syncword, STREAM_SYNC};

        // type-4 bits: 96 LICH bits then the encoded frame body
        let mut bits = [0u8; BITS_PER_PAYLOAD];
        let lich_encoded = encode_lich(lich_chunk);
        for i in 0..LICH_SOFT_BITS {
            bits[i] = (lich_encoded[i / 8] >> (7 - i % 8)) & 1;
        }
        let mut body = frame_number.to_be_bytes().to_vec();
        body.extend_from_slice(voice);
        let encoded = encode(&body, &STREAM_PUNCTURE, LSF_FINAL_BIT);
        bits[LICH_SOFT_BITS..].copy_from_slice(&encoded);

        let mut rf = interleave_bits(&bits);
        randomize_bits(&mut rf);

        let mut symbols = vec![];
        // pad ahead of the sync so the late-window search sees it
        symbols.extend_from_slice(&[0.0; 8]);
        append_syncword(&mut symbols, STREAM_SYNC);
        append_payload(&mut symbols, &rf);
        oversample(&symbols)
    }

    fn lsf_chunk(lsf: &Lsf, i: usize) -> [u8; 6] {
        let bytes = lsf.to_bytes();
        let mut chunk = [0u8; 6];
        chunk[..5].copy_from_slice(&bytes[i * 5..i * 5 + 5]);
        chunk[5] = (i as u8) << 5;
        chunk
    }

    #[test]
    fn test_receive_stream_via_lich() {
        let lsf = Lsf::new("@ALL", "N0CALL", FrameMode::Stream, DataType::Voice, 0).unwrap();
        let voice = [0x11u8; 16];

        let mut samples = vec![];
        for fnum in 0..6u16 {
            let chunk = lsf_chunk(&lsf, fnum as usize);
            samples.extend(stream_frame_samples(&chunk, fnum, &voice));
        }
        // trailing silence so the final window drains
        samples.extend(std::iter::repeat(0.0f32).take(4000));

        let mut decoder = FrameDecoder::new();
        let frames: Vec<RxFrame> = decoder.iter_frames(samples).collect();

        // no frames until the sixth chunk lands; then delivery begins
        assert_eq!(frames.len(), 1);
        match &frames[0] {
            RxFrame::StreamFrame {
                lsf: got,
                frame_number,
                voice: got_voice,
                ..
            } => {
                assert_eq!(got, &lsf);
                // frame number 5 in wire order
                assert_eq!(*frame_number, 0x0500);
                assert_eq!(got_voice, &voice);
            }
            other => panic!("unexpected frame {other:?}"),
        }
    }

    #[test]
    fn test_stream_frame_number_wire_swap() {
        let lsf = Lsf::new("@ALL", "N0CALL", FrameMode::Stream, DataType::Voice, 0).unwrap();
        let voice = [0x22u8; 16];

        let mut samples = vec![];
        for i in 0..6usize {
            samples.extend(stream_frame_samples(&lsf_chunk(&lsf, i), i as u16, &voice));
        }
        // one more frame after the LSF is known
        samples.extend(stream_frame_samples(&lsf_chunk(&lsf, 0), 0x0102, &voice));
        samples.extend(std::iter::repeat(0.0f32).take(4000));

        let mut decoder = FrameDecoder::new();
        let frames: Vec<RxFrame> = decoder.iter_frames(samples).collect();
        assert_eq!(frames.len(), 2);
        match &frames[1] {
            RxFrame::StreamFrame { frame_number, .. } => {
                // decoded 0x0102 leaves the decoder byte-swapped
                assert_eq!(*frame_number, 0x0201);
            }
            other => panic!("unexpected frame {other:?}"),
        }
    }
}

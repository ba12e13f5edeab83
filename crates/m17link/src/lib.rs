//! # m17link: M17 baseband and link layer
//!
//! This crate implements the core of an
//! [M17](https://m17project.org/) digital-radio station: the frame
//! codec that turns packets and voice streams into 4-FSK symbols and
//! back, the receive state machine that hunts syncwords in an
//! oversampled soft-symbol stream, and a client for the UDP
//! reflectors that interconnect M17 stations over the internet.
//!
//! ## Receiving
//!
//! Obtain soft symbols from your radio hardware (an FM discriminator
//! tap through a root-raised-cosine filter, or a recording of the
//! same) at five samples per symbol, and feed them to a
//! [`FrameDecoder`]:
//!
//! ```no_run
//! use m17link::{FrameDecoder, RxFrame};
//!
//! # let samples: Vec<f32> = vec![];
//! let mut decoder = FrameDecoder::new();
//! for frame in decoder.iter_frames(samples) {
//!     match frame {
//!         RxFrame::Packet(packet) => println!("packet from {}", packet.lsf.src_address()),
//!         RxFrame::StreamStart { lsf, .. } => println!("voice from {}", lsf.src_address()),
//!         RxFrame::StreamFrame { .. } => {}
//!     }
//! }
//! ```
//!
//! The decoder absorbs bit errors internally: convolutional coding
//! and the Golay-protected LICH soak up what they can, and the CRC
//! drops what they cannot. Only whole, validated frames come out.
//!
//! ## Transmitting
//!
//! Build an [`Lsf`] and a [`Packet`], then render the entire
//! transmission (preamble, link setup, data frames, and EOT) with
//! [`packet_transmission`]:
//!
//! ```
//! use m17link::{DataType, FrameMode, Lsf, Packet, PacketType};
//!
//! let lsf = Lsf::new("N1ADJ", "N0CALL", FrameMode::Packet, DataType::Reserved, 0).unwrap();
//! let packet = Packet::new(lsf, PacketType::SMS, b"Hello from me!\0");
//! let symbols = m17link::packet_transmission(&packet);
//! assert_eq!(symbols.len() % 8, 0);
//! ```
//!
//! ## Talking to a reflector
//!
//! [`ReflectorClient`] speaks the reflector UDP protocol: connect,
//! answer keepalives, and exchange `M17P` packet and `M17 ` voice
//! datagrams. Incoming traffic is delivered to handlers installed at
//! construction; a [`ReflectorSender`] handle forwards traffic from
//! another thread while the receive loop runs.

mod callsign;
mod convol;
mod crc;
mod golay;
mod interleave;
mod lich;
mod lsf;
mod packet;
mod randomize;
mod receiver;
mod reflector;
mod transmit;
mod viterbi;
mod waveform;

pub use callsign::{Address, CallsignError, DESTINATION_ALL, ENCODED_LEN, MAX_CALLSIGN_LEN};
pub use convol::{LSF_PUNCTURE, PACKET_PUNCTURE, STREAM_PUNCTURE};
pub use crc::{check as crc_check, crc16};
pub use golay::{
    encode as golay_encode, hard_decode as golay_hard_decode, soft_decode as golay_soft_decode,
    Uncorrectable,
};
pub use lich::{
    decode_lich, encode_lich, LichAssembler, LICH_CHUNK_LEN, LICH_ENCODED_LEN, LICH_SOFT_BITS,
};
pub use lsf::{DataType, FrameMode, Lsf, LSD_LEN, LSF_LEN};
pub use packet::{Packet, PacketError, PacketType, FRAME_PAYLOAD_LEN, MAX_PACKET_LEN};
pub use receiver::{FrameDecoder, RxFrame};
pub use reflector::{
    ClientState, PacketHandler, ReflectorClient, ReflectorError, ReflectorSender, StreamDatagram,
    StreamDatagramError, StreamHandler, STREAM_DATAGRAM_LEN,
};
pub use transmit::packet_transmission;
pub use viterbi::ViterbiDecoder;
pub use waveform::{
    SoftBit, Symbol, BITS_PER_PAYLOAD, SAMPLES_PER_SYMBOL, SOFT_ERASURE, SOFT_ONE, SOFT_ZERO,
    SYMBOLS_PER_FRAME, SYMBOLS_PER_PAYLOAD,
};

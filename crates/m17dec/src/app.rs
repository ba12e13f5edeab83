//! Frame dispatch
//!
//! Runs the decode loop: every frame the decoder produces is printed
//! (unless `--quiet`) and, when a reflector session is up, forwarded
//! over UDP. SMS packets are rendered as text the way they appear on
//! the air: a type rune of 0x05 and a NUL-terminated message.

use log::{error, info};

use m17link::{FrameDecoder, Packet, PacketType, ReflectorSender, RxFrame, StreamDatagram};

use crate::cli::Args;

/// Run the decoder over `input`, printing and forwarding frames
pub fn run<I>(args: &Args, decoder: &mut FrameDecoder, input: I, sender: Option<&ReflectorSender>)
where
    I: Iterator<Item = f32>,
{
    for frame in decoder.iter_frames(input) {
        match &frame {
            RxFrame::Packet(packet) => {
                if !args.quiet {
                    println!("{}", render_packet(packet));
                }
                if let Some(sender) = sender {
                    if let Err(e) = sender.send_packet(packet) {
                        error!("failed to forward packet: {e}");
                    }
                }
            }
            RxFrame::StreamStart { lsf, stream_id } => {
                if !args.quiet {
                    println!("voice start [{stream_id:04x}]: {lsf}");
                }
            }
            RxFrame::StreamFrame {
                lsf,
                stream_id,
                frame_number,
                voice,
            } => {
                if let Some(sender) = sender {
                    if let Err(e) = sender.send_stream(lsf, *stream_id, *frame_number, voice) {
                        error!("failed to forward stream frame: {e}");
                    }
                }
            }
        }
    }
    info!("symbol source exhausted");
}

/// Print a packet arriving from the reflector
pub fn print_reflector_packet(packet: Packet) {
    println!("[net] {}", render_packet(&packet));
}

/// Print voice stream activity arriving from the reflector
pub fn print_reflector_stream(sd: StreamDatagram) {
    if (sd.frame_number & 0x7FFF) == 0 || sd.last_frame {
        let what = if sd.last_frame { "voice end" } else { "voice start" };
        println!("[net] {} [{:04x}]: {}", what, sd.stream_id, sd.lsf);
    }
}

// One line per packet: addresses, then the SMS text or a byte count.
fn render_packet(packet: &Packet) -> String {
    let src = packet.lsf.src_address();
    let dst = packet.lsf.dst_address();
    if packet.packet_type == PacketType::SMS {
        // SMS payloads are NUL-terminated text
        let text = packet.payload.strip_suffix(&[0]).unwrap_or(&packet.payload);
        format!("{}>{}: {}", src, dst, String::from_utf8_lossy(text))
    } else {
        format!(
            "{}>{}: {} bytes of type {:#04x}",
            src,
            dst,
            packet.payload.len(),
            packet.packet_type.0 as u32
        )
    }
}

//! Syncword detection
//!
//! The receiver watches a 16-symbol window of the oversampled sample
//! stream (one candidate symbol every [`SAMPLES_PER_SYMBOL`]
//! samples). The LSF pattern spans the whole window, riding on the
//! tail of the preamble; the packet pattern occupies the first eight
//! positions, and the stream and BERT patterns the last eight, so
//! that skipping the window always lands at the head of the frame
//! payload. The candidate with the smallest euclidean distance wins;
//! the caller applies per-mode acceptance thresholds.

use std::collections::VecDeque;

use crate::waveform::{Symbol, SAMPLES_PER_SYMBOL};

const LSF_PREAMBLE_SYMBOLS: [Symbol; 8] = [3.0, -3.0, 3.0, -3.0, 3.0, -3.0, 3.0, -3.0];
const LSF_SYNC_SYMBOLS: [Symbol; 8] = [3.0, 3.0, 3.0, 3.0, -3.0, -3.0, 3.0, -3.0];
const STREAM_SYNC_SYMBOLS: [Symbol; 8] = [-3.0, -3.0, -3.0, -3.0, 3.0, 3.0, -3.0, 3.0];
const PACKET_SYNC_SYMBOLS: [Symbol; 8] = [3.0, -3.0, 3.0, 3.0, -3.0, -3.0, -3.0, -3.0];
const BERT_SYNC_SYMBOLS: [Symbol; 8] = [-3.0, 3.0, -3.0, -3.0, 3.0, 3.0, 3.0, 3.0];

/// Candidate symbol positions examined per search
pub(crate) const SYNC_WINDOW_SYMBOLS: usize = 16;

/// Samples the search needs beyond its offset
pub(crate) const SYNC_WINDOW_SAMPLES: usize = SYNC_WINDOW_SYMBOLS * SAMPLES_PER_SYMBOL;

/// Which syncword matched
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SyncKind {
    Lsf,
    Packet,
    Stream,
    Bert,
}

impl SyncKind {
    /// Symbols to skip past once this sync is accepted
    pub(crate) fn sync_symbols(self) -> usize {
        match self {
            // packet syncs sit at the head of the window; the others
            // occupy (or end at) symbol 16
            SyncKind::Packet => 8,
            _ => 16,
        }
    }
}

/// Distance from the window at `offset` samples to each reference
/// pattern; returns the best (distance, kind).
pub(crate) fn sync_distance(samples: &VecDeque<Symbol>, offset: usize) -> (f32, SyncKind) {
    let mut lsf = 0.0f64;
    let mut pkt = 0.0f64;
    let mut stream = 0.0f64;
    let mut bert = 0.0f64;

    for i in 0..SYNC_WINDOW_SYMBOLS {
        let v = samples[offset + i * SAMPLES_PER_SYMBOL] as f64;
        let ext = if i < 8 {
            LSF_PREAMBLE_SYMBOLS[i]
        } else {
            LSF_SYNC_SYMBOLS[i - 8]
        };
        lsf += (v - ext as f64).powi(2);
        if i < 8 {
            pkt += (v - PACKET_SYNC_SYMBOLS[i] as f64).powi(2);
        } else {
            stream += (v - STREAM_SYNC_SYMBOLS[i - 8] as f64).powi(2);
            bert += (v - BERT_SYNC_SYMBOLS[i - 8] as f64).powi(2);
        }
    }

    let mut best = (lsf.sqrt() as f32, SyncKind::Lsf);
    for (dist, kind) in [
        (pkt.sqrt() as f32, SyncKind::Packet),
        (stream.sqrt() as f32, SyncKind::Stream),
        (bert.sqrt() as f32, SyncKind::Bert),
    ] {
        if dist < best.0 {
            best = (dist, kind);
        }
    }
    best
}

//! Extended Golay(24,12) code
//!
//! Systematic encoding: the codeword is `data << 12 | parity`, with
//! the parity half formed by XORing together rows of the generator
//! parity table for each set data bit. Minimum distance 8; up to
//! three bit errors are correctable.
//!
//! The soft decoder works on fixed-point [`SoftBit`] vectors and is
//! what the LICH depends on. It forms a soft syndrome from the parity
//! half and walks a ladder of candidate error patterns (parity-only,
//! one or two data-bit flips, then an algebraic pass through the
//! companion decode table), comparing soft population counts against
//! the thresholds each rung allows.

use thiserror::Error;

use crate::waveform::{SoftBit, SOFT_ERASURE, SOFT_ONE, SOFT_ZERO};

/// Parity rows of the generator matrix, one per data bit
pub(crate) const ENCODE_MATRIX: [u16; 12] = [
    0x8EB, 0x93E, 0xA97, 0xDC6, 0x367, 0x6CD, 0xD99, 0x3DA, 0x7B4, 0xF68, 0x63B, 0xC75,
];

/// Companion rows used by the algebraic half of the soft decoder
pub(crate) const DECODE_MATRIX: [u16; 12] = [
    0xC75, 0x49F, 0x93E, 0x6E3, 0xDC6, 0xF13, 0xAB9, 0x1ED, 0x3DA, 0x7B4, 0xF68, 0xA4F,
];

/// A codeword with more errors than Golay(24,12) can repair
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("uncorrectable Golay(24,12) codeword")]
pub struct Uncorrectable;

/// Encode a 12-bit value into a 24-bit codeword
///
/// Only the low 12 bits of `data` are used.
pub fn encode(data: u16) -> u32 {
    let data = data & 0x0FFF;
    let mut parity: u16 = 0;
    for (i, row) in ENCODE_MATRIX.iter().enumerate() {
        if data & (1 << i) != 0 {
            parity ^= row;
        }
    }
    ((data as u32) << 12) | parity as u32
}

fn checksum(data: u16) -> u16 {
    (encode(data) & 0xFFF) as u16
}

/// Hard-decision decode of a 24-bit codeword
///
/// A syndrome of weight three or less means all errors sit in the
/// parity half and the data is already correct. Otherwise single,
/// double, and triple data-bit flips are tried exhaustively; a flip
/// set of size k is accepted when it leaves at most `3 - k` residual
/// parity errors.
pub fn hard_decode(codeword: u32) -> Result<u16, Uncorrectable> {
    let data = ((codeword >> 12) & 0xFFF) as u16;
    let parity = (codeword & 0xFFF) as u16;
    let syndrome = parity ^ checksum(data);

    if syndrome.count_ones() <= 3 {
        return Ok(data);
    }
    for i in 0..12 {
        if (syndrome ^ ENCODE_MATRIX[i]).count_ones() <= 2 {
            return Ok(data ^ (1 << i));
        }
    }
    for i in 0..11 {
        for j in i + 1..12 {
            if (syndrome ^ ENCODE_MATRIX[i] ^ ENCODE_MATRIX[j]).count_ones() <= 1 {
                return Ok(data ^ (1 << i) ^ (1 << j));
            }
        }
    }
    for i in 0..10 {
        for j in i + 1..11 {
            for k in j + 1..12 {
                if syndrome ^ ENCODE_MATRIX[i] ^ ENCODE_MATRIX[j] ^ ENCODE_MATRIX[k] == 0 {
                    return Ok(data ^ (1 << i) ^ (1 << j) ^ (1 << k));
                }
            }
        }
    }
    Err(Uncorrectable)
}

/// Soft-decision decode of a 24-element soft codeword
///
/// `codeword[0]` is the most significant bit (the top data bit),
/// matching the order bits arrive off the air.
pub fn soft_decode(codeword: &[SoftBit; 24]) -> Result<u16, Uncorrectable> {
    // LSB-first working copy
    let mut cw = [SOFT_ZERO; 24];
    for (i, slot) in cw.iter_mut().enumerate() {
        *slot = codeword[23 - i];
    }

    let errors = detect_errors(&cw).ok_or(Uncorrectable)?;
    let word = soft_to_int(&cw[..16]) as u32 | ((soft_to_int(&cw[16..]) as u32) << 16);
    Ok((((word ^ errors) >> 12) & 0x0FFF) as u16)
}

// Locate the most plausible error pattern of a soft codeword.
//
// `cw` is LSB first: parity in [0..12], data in [12..24]. Returns the
// 24-bit error vector, or None if no rung of the ladder accepts.
fn detect_errors(cw: &[SoftBit; 24]) -> Option<u32> {
    let parity: &[SoftBit] = &cw[..12];
    let data: &[SoftBit] = &cw[12..];

    // soft parity recomputation from the hard-ish data half
    let mut cksum = [SOFT_ZERO; 12];
    for (i, &d) in data.iter().enumerate() {
        if d > SOFT_ERASURE {
            let row = int_to_soft(ENCODE_MATRIX[i]);
            cksum = soft_xor(&cksum, &row);
        }
    }

    let mut syndrome = [SOFT_ZERO; 12];
    for i in 0..12 {
        syndrome[i] = soft_bit_xor(parity[i], cksum[i]);
    }

    // all errors (fewer than four) in the parity half
    if soft_popcount(&syndrome) < 4 * 0xFFFE {
        return Some(soft_to_int(&syndrome) as u32);
    }

    // one error in the data half, up to three in parity
    for i in 0..12 {
        let coded_error = ENCODE_MATRIX[i];
        let sc = soft_xor(&syndrome, &int_to_soft(coded_error));
        if soft_popcount(&sc) < 3 * 0xFFFE {
            let s = soft_to_int(&syndrome);
            return Some(((1u32 << i) << 12) | (s ^ coded_error) as u32);
        }
    }

    // two errors in the data half, up to two in parity
    for i in 0..11 {
        for j in i + 1..12 {
            let e = ((1u32 << i) | (1u32 << j)) << 12;
            let coded_error = ENCODE_MATRIX[i] ^ ENCODE_MATRIX[j];
            let sc = soft_xor(&syndrome, &int_to_soft(coded_error));
            if soft_popcount(&sc) < 2 * 0xFFFF {
                let s = soft_to_int(&syndrome);
                return Some(e | (s ^ coded_error) as u32);
            }
        }
    }

    // algebraic pass: invert the syndrome through the decode matrix
    let mut inv_syndrome = [SOFT_ZERO; 12];
    for i in 0..12 {
        if syndrome[i] > SOFT_ERASURE {
            inv_syndrome = soft_xor(&inv_syndrome, &int_to_soft(DECODE_MATRIX[i]));
        }
    }

    // all errors (fewer than four) in the data half
    if soft_popcount(&inv_syndrome) < 4 * 0xFFFF {
        return Some((soft_to_int(&inv_syndrome) as u32) << 12);
    }

    // one parity error, up to three in the data half
    for i in 0..12 {
        let coding_error = DECODE_MATRIX[i];
        let tmp = soft_xor(&inv_syndrome, &int_to_soft(coding_error));
        if soft_popcount(&tmp) < 3 * (0xFFFF + 2) {
            return Some((((soft_to_int(&inv_syndrome) ^ coding_error) as u32) << 12) | (1u32 << i));
        }
    }

    None
}

/// Expand an integer into a soft vector, LSB at index 0
pub(crate) fn int_to_soft(value: u16) -> [SoftBit; 12] {
    let mut out = [SOFT_ZERO; 12];
    for (i, slot) in out.iter_mut().enumerate() {
        if (value >> i) & 1 != 0 {
            *slot = SOFT_ONE;
        }
    }
    out
}

/// Hard-decide a soft vector back into an integer, LSB at index 0
pub(crate) fn soft_to_int(soft: &[SoftBit]) -> u16 {
    let mut out = 0u16;
    for (i, &sb) in soft.iter().enumerate() {
        if sb > SOFT_ERASURE {
            out |= 1 << i;
        }
    }
    out
}

// Soft-valued popcount: the accumulated confidence that bits are set.
fn soft_popcount(soft: &[SoftBit]) -> u32 {
    soft.iter().map(|&sb| sb as u32).sum()
}

fn soft_xor(a: &[SoftBit; 12], b: &[SoftBit; 12]) -> [SoftBit; 12] {
    let mut out = [SOFT_ZERO; 12];
    for i in 0..12 {
        out[i] = soft_bit_xor(a[i], b[i]);
    }
    out
}

/// Bilinear soft XOR: a(1-b) + b(1-a) in saturating Q16.
///
/// Keeps XOR(erasure, erasure) = erasure.
pub(crate) fn soft_bit_xor(a: SoftBit, b: SoftBit) -> SoftBit {
    add16(mul16(a, sub16(SOFT_ONE, b)), mul16(b, sub16(SOFT_ONE, a)))
}

fn add16(a: u16, b: u16) -> u16 {
    a.saturating_add(b)
}

fn sub16(a: u16, b: u16) -> u16 {
    a.saturating_sub(b)
}

fn mul16(a: u16, b: u16) -> u16 {
    ((a as u32 * b as u32) >> 16) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    // reference codeword for 0x0D78
    const CODEWORD: u32 = 0x0D7880F;
    const DATA: u16 = 0x0D78;

    // Spread a codeword into a soft vector, MSB at index 0.
    fn to_soft(codeword: u32) -> [SoftBit; 24] {
        let mut vector = [SOFT_ZERO; 24];
        for i in 0..24 {
            if (codeword >> i) & 1 != 0 {
                vector[23 - i] = SOFT_ONE;
            }
        }
        vector
    }

    // xorshift, so error positions vary without pulling in a seeded rng
    struct XorShift(u32);

    impl XorShift {
        fn next(&mut self) -> u32 {
            self.0 ^= self.0 << 13;
            self.0 ^= self.0 >> 17;
            self.0 ^= self.0 << 5;
            self.0
        }
    }

    // Apply `num_errs` disturbances summing to `sum_errs` bit-flips
    // worth of magnitude, confined to vector[start..=end].
    fn apply_errors(
        vector: &mut [SoftBit; 24],
        rng: &mut XorShift,
        start: usize,
        end: usize,
        num_errs: usize,
        sum_errs: f32,
    ) {
        let span = end - start + 1;
        let val = (0xFFFF as f32 * sum_errs / num_errs as f32).round() as u16;
        let mut hit = 0u32;
        for _ in 0..num_errs {
            let mut pos;
            loop {
                pos = start + rng.next() as usize % span;
                if hit & (1 << pos) == 0 {
                    break;
                }
            }
            vector[pos] ^= val;
            hit |= 1 << pos;
        }
    }

    fn check_correction(
        start: usize,
        end: usize,
        num_errs: usize,
        sum_errs: f32,
        should_correct: bool,
        name: &str,
    ) {
        let mut rng = XorShift(0x2545_F491);
        for trial in 0..100 {
            let mut vector = to_soft(CODEWORD);
            apply_errors(&mut vector, &mut rng, start, end, num_errs, sum_errs);
            let result = soft_decode(&vector);
            if should_correct {
                assert_eq!(result, Ok(DATA), "{name} trial {trial}");
            } else {
                assert_ne!(result, Ok(DATA), "{name} trial {trial}");
            }
        }
    }

    #[test]
    fn test_encode_single_rows() {
        // each single data bit picks out one parity row
        let mut data = 0x0800u16;
        for i in (1..12usize).rev() {
            assert_eq!(encode(data), (data as u32) << 12 | ENCODE_MATRIX[i] as u32);
            data >>= 1;
        }
    }

    #[test]
    fn test_encode_vector() {
        assert_eq!(encode(DATA), CODEWORD);
    }

    #[test]
    fn test_hard_decode() {
        assert_eq!(hard_decode(CODEWORD), Ok(DATA));

        // all weight-1, -2, and -3 error patterns correct
        for i in 0..24 {
            assert_eq!(hard_decode(CODEWORD ^ (1 << i)), Ok(DATA), "1 error at {i}");
        }
        let mut rng = XorShift(0xBEEF);
        for _ in 0..100 {
            let a = rng.next() % 24;
            let b = rng.next() % 24;
            let c = rng.next() % 24;
            if a == b || b == c || a == c {
                continue;
            }
            let corrupted = CODEWORD ^ (1 << a) ^ (1 << b) ^ (1 << c);
            assert_eq!(hard_decode(corrupted), Ok(DATA), "errors at {a},{b},{c}");
        }
    }

    #[test]
    fn test_hard_decode_round_trip() {
        for data in [0x000u16, 0x001, 0x123, 0xABC, 0xFFF, DATA] {
            assert_eq!(hard_decode(encode(data)), Ok(data));
        }
    }

    #[test]
    fn test_soft_decode_clean() {
        assert_eq!(soft_decode(&to_soft(CODEWORD)), Ok(DATA));
    }

    #[test]
    fn test_soft_decode_data_half() {
        // vector[0..12] is the data half of the codeword, MSB first
        check_correction(0, 11, 1, 1.0, true, "flipped 1");
        check_correction(0, 11, 1, 0.5, true, "erased 1");
        check_correction(0, 11, 2, 2.0, true, "flipped 2");
        check_correction(0, 11, 2, 1.0, true, "erased 2");
        check_correction(0, 11, 3, 3.0, true, "flipped 3");
        check_correction(0, 11, 3, 1.5, true, "erased 3");
        check_correction(0, 11, 7, 3.5, false, "erased 3.5");
        check_correction(0, 11, 5, 2.5, false, "erased 5");
        check_correction(0, 11, 5, 5.0, false, "flipped 5");
    }

    #[test]
    fn test_soft_decode_parity_half() {
        check_correction(12, 23, 1, 1.0, true, "flipped 1");
        check_correction(12, 23, 1, 0.5, true, "erased 1");
        check_correction(12, 23, 2, 2.0, true, "flipped 2");
        check_correction(12, 23, 2, 1.0, true, "erased 2");
        check_correction(12, 23, 3, 3.0, true, "flipped 3");
        check_correction(12, 23, 3, 1.5, true, "erased 3");
        check_correction(12, 23, 7, 3.5, true, "erased 3.5");
        check_correction(12, 23, 5, 2.5, true, "erased 5");
        check_correction(12, 23, 5, 5.0, false, "flipped 5");
    }

    #[test]
    fn test_soft_decode_four_flips_sentinel() {
        // four flips at vector positions {6,7,8,11} stay uncorrectable...
        let mut vector = to_soft(CODEWORD);
        for pos in [6, 7, 8, 11] {
            vector[pos] ^= SOFT_ONE;
        }
        assert_ne!(soft_decode(&vector), Ok(DATA));

        // ...while {6,7,8,9} happens to land on a decodable pattern
        let mut vector = to_soft(CODEWORD);
        for pos in [6, 7, 8, 9] {
            vector[pos] ^= SOFT_ONE;
        }
        assert_eq!(soft_decode(&vector), Ok(DATA));
    }

    #[test]
    fn test_soft_decode_four_flips_parity_half() {
        let mut vector = to_soft(CODEWORD);
        for pos in [12, 13, 16, 22] {
            vector[pos] ^= SOFT_ONE;
        }
        assert_ne!(soft_decode(&vector), Ok(DATA));

        let mut vector = to_soft(CODEWORD);
        for pos in [14, 16, 17, 20] {
            vector[pos] ^= SOFT_ONE;
        }
        assert_eq!(soft_decode(&vector), Ok(DATA));
    }

    #[test]
    fn test_soft_bit_xor() {
        let cases: [(SoftBit, SoftBit, SoftBit, u16); 9] = [
            (0x0000, 0x0000, 0x0000, 0),
            (0x0000, 0x7FFF, 0x7FFE, 1),
            (0x0000, 0xFFFF, 0xFFFE, 1),
            (0x7FFF, 0x0000, 0x7FFE, 1),
            (0x7FFF, 0x7FFF, 0x7FFE, 1),
            (0x7FFF, 0xFFFF, 0x7FFF, 0),
            (0xFFFF, 0x0000, 0xFFFE, 1),
            (0xFFFF, 0x7FFF, 0x7FFF, 0),
            (0xFFFF, 0xFFFF, 0x0000, 0),
        ];
        for (a, b, expected, tolerance) in cases {
            let got = soft_bit_xor(a, b);
            assert!(
                got.abs_diff(expected) <= tolerance,
                "xor({a:#06x}, {b:#06x}) = {got:#06x}, expected {expected:#06x}"
            );
        }
    }

    #[test]
    fn test_int_soft_round_trip() {
        for value in [0x000u16, 0x001, 0x0F0, 0xABC, 0xFFF] {
            assert_eq!(soft_to_int(&int_to_soft(value)), value);
        }
    }
}

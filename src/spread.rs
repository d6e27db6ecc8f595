//! Spreads a bit-string payload across the length of a cover signal.

use crate::segment::split_to_n_segments;

/// Spreads `bits` (one value per secret bit) across `signal_length`
/// samples: each bit is broadcast over its own contiguous, roughly
/// equal-length segment, and any remainder left over from dividing
/// `signal_length` by `bits.len()` is appended unmodified (`audio_utils.py`'s
/// `spread_bits`, called `mixer_sig` at some of its call sites).
///
/// Returns a unipolar `{0, 1}`-valued gate of length `signal_length`.
pub fn spread_bits(bits: &[u8], signal_length: usize) -> Vec<f64> {
    if bits.is_empty() {
        return Vec::new();
    }
    let ones = vec![1.0f64; signal_length];
    let (segments, rest) = split_to_n_segments(&ones, bits.len());
    let mut out = Vec::with_capacity(signal_length);
    for (seg, &bit) in segments.iter().zip(bits) {
        out.extend(seg.iter().map(|_| bit as f64));
    }
    out.extend(rest);
    out
}

/// Same as [`spread_bits`] but the gate is bipolar: `0 -> -1`, `1 -> 1`
/// (the `mixer * 2 - 1` transform DSSS applies to its mixer signal).
pub fn spread_bits_bipolar(bits: &[u8], signal_length: usize) -> Vec<f64> {
    spread_bits(bits, signal_length).iter().map(|&m| m * 2.0 - 1.0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spreads_bits_evenly() {
        let out = spread_bits(&[0, 1], 10);
        assert_eq!(out, vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn bipolar_maps_zero_to_negative_one() {
        let out = spread_bits_bipolar(&[0, 1], 4);
        assert_eq!(out, vec![-1.0, -1.0, 1.0, 1.0]);
    }

    #[test]
    fn empty_bits_returns_empty_gate_without_panicking() {
        assert_eq!(spread_bits(&[], 10), Vec::<f64>::new());
    }
}

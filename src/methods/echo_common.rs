//! Shared validation, capacity check and delay-search wiring for the four
//! echo-hiding variants (`echo_base.py`'s `EchoBase`).

use crate::bits::BitBuffer;
use crate::delay_search::{basinhopping_search, bruteforce_search};
use crate::dtype::to_dtype;
use crate::error::{Result, StegoError};
use crate::segment::split_to_n_segments;
use crate::signal::Signal;
use crate::spread::spread_bits;
use crate::stats::ber_percent;

/// Spreads `payload`'s bits unipolar (`{0, 1}`) over `len` samples — the
/// per-bit gate every echo variant multiplies its two echo kernels by.
pub fn mixer(payload: &BitBuffer, len: usize) -> Vec<f64> {
    spread_bits(payload.as_slice(), len)
}

/// Splits `stego` into `l` equal segments for per-bit cepstral decoding,
/// discarding the alignment remainder (`split_to_n_segments`'s `rest`).
pub fn decode_segments(stego: &[f64], l: usize) -> Vec<Vec<f64>> {
    if l == 0 {
        return Vec::new();
    }
    split_to_n_segments(stego, l).0
}

pub const DEFAULT_D0: usize = 150;
pub const DEFAULT_ALPHA: f64 = 0.5;
pub const DEFAULT_DECAY_RATE: f64 = 0.85;

/// Fills in `d0`/`d1` defaults (`150`/`d0+50`) and validates `0 < d0 < d1`.
pub fn resolve_delays(d0: Option<usize>, d1: Option<usize>) -> Result<(usize, usize)> {
    let d0 = d0.unwrap_or(DEFAULT_D0);
    let d1 = d1.unwrap_or(d0 + 50);
    if d0 == 0 || d1 == 0 {
        return Err(StegoError::InvalidParameter("d0 and d1 must be larger than 0".into()));
    }
    if d0 >= d1 {
        return Err(StegoError::InvalidParameter("d0 must be smaller than d1".into()));
    }
    Ok((d0, d1))
}

/// Requires at least 1024 cover samples per encoded bit (§4.4).
pub fn check_capacity(secret_bits: usize, cover_len: usize) -> Result<()> {
    if secret_bits * 1024 > cover_len {
        return Err(StegoError::SecretTooLarge { secret_bits, capacity_bits: cover_len / 1024 });
    }
    Ok(())
}

/// Centers, normalizes and dtype-casts a raw encoded buffer, the shared
/// last step of every echo variant's `_encode`.
pub fn finish(raw: &[f64], cover: &Signal) -> Vec<f64> {
    let mean = raw.iter().sum::<f64>() / raw.len().max(1) as f64;
    let centered: Vec<f64> = raw.iter().map(|&v| v - mean).collect();
    let max_abs = centered.iter().fold(0.0f64, |m, &v| m.max(v.abs()));
    let normalized: Vec<f64> =
        if max_abs != 0.0 { centered.iter().map(|&v| v / max_abs).collect() } else { centered };
    to_dtype(&normalized, crate::dtype::Dtype::F64, cover.dtype())
}

/// Runs the shared encode flow: validate delays, check capacity, then
/// either encode directly or drive a delay search, each iteration of which
/// round-trips through `kernel_decode` to score candidate `(d0, d1)` pairs
/// by BER against `payload`.
pub fn encode_with_search(
    cover: &Signal,
    payload: &BitBuffer,
    d0: Option<usize>,
    d1: Option<usize>,
    alpha: f64,
    decay_rate: f64,
    delay_search: &str,
    kernel_encode: impl Fn(usize, usize, f64, f64) -> Vec<f64>,
    kernel_decode: impl Fn(&[f64], usize, usize, usize) -> BitBuffer,
) -> Result<(Vec<f64>, usize, usize)> {
    let (d0, d1) = resolve_delays(d0, d1)?;
    check_capacity(payload.len(), cover.len())?;

    if payload.is_empty() {
        return Ok((cover.samples().to_vec(), d0, d1));
    }

    let trial = |d0p: usize, d1p: usize| -> f64 {
        let encoded = kernel_encode(d0p, d1p, alpha, decay_rate);
        if encoded.iter().fold(0.0f64, |m, &v| m.max(v.abs())) == 0.0 {
            return 100.0;
        }
        let decoded = kernel_decode(&encoded, d0p, d1p, payload.len());
        ber_percent(decoded.as_slice(), payload.as_slice())
    };

    let (d0, d1) = match delay_search {
        "bruteforce" => {
            let (d0, d1, _) = bruteforce_search(d0, d1, trial);
            (d0, d1)
        }
        "basinhopping" => {
            let (d0, d1, _) = basinhopping_search(d0, d1, 100, trial);
            (d0, d1)
        }
        _ => (d0, d1),
    };

    Ok((kernel_encode(d0, d1, alpha, decay_rate), d0, d1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_delays_fills_defaults() {
        assert_eq!(resolve_delays(None, None).unwrap(), (150, 200));
    }

    #[test]
    fn resolve_delays_rejects_inverted_pair() {
        assert!(resolve_delays(Some(300), Some(100)).is_err());
    }

    #[test]
    fn capacity_requires_1024_samples_per_bit() {
        assert!(check_capacity(10, 10 * 1024).is_ok());
        assert!(check_capacity(10, 10 * 1024 - 1).is_err());
    }

    #[test]
    fn empty_payload_skips_kernel_and_returns_cover() {
        let samples: Vec<f64> = (0..8192).map(|i| (i as f64 * 0.01).sin()).collect();
        let cover = Signal::new(samples.clone(), crate::dtype::Dtype::F64, 44100);
        let (raw, d0, d1) = encode_with_search(
            &cover,
            &BitBuffer::default(),
            None,
            None,
            DEFAULT_ALPHA,
            DEFAULT_DECAY_RATE,
            "",
            |_, _, _, _| panic!("kernel_encode must not be called for an empty payload"),
            |_, _, _, _| BitBuffer::default(),
        )
        .unwrap();
        assert_eq!(raw, samples);
        assert_eq!((d0, d1), (DEFAULT_D0, DEFAULT_D0 + 50));
    }
}

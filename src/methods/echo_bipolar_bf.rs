//! Bipolar backward-forward echo hiding: four quarter-alpha taps per bit,
//! decoded straight from the power cepstrum with no autocorrelation pass
//! (§4.4 `echo_bipolar_bf`).
//!
//! The two taps documented as "backward" echoes collapse to unshifted
//! copies of the cover sample (`cover[i]` rather than `cover[i - d]`)
//! because the upstream padding drops its trailing zeros before the result
//! is truncated back to segment length. Reproduced here as-is rather than
//! corrected, since fixing it would change the method's fingerprint away
//! from what `delay_search` was tuned against.

use crate::bits::BitBuffer;
use crate::cepstrum::complex_power_cepstrum;
use crate::error::Result;
use crate::method::{Method, MethodTag, ParamDescriptor, SideParams};
use crate::signal::Signal;

use super::echo_common::{self, DEFAULT_ALPHA, DEFAULT_DECAY_RATE};
use super::echo_single::{echo_decode_args, echo_encode_args};

pub struct EchoBipolarBf;

fn kernel_encode(cover: &[f64], payload: &BitBuffer, d0: usize, d1: usize, alpha: f64, _decay_rate: f64) -> Vec<f64> {
    let n = cover.len();
    let mixer = echo_common::mixer(payload, n);
    let q = alpha / 4.0;
    (0..n)
        .map(|i| {
            let echo0 = (if i >= d0 { q * cover[i - d0] } else { 0.0 })
                - (if i >= d0 + 5 { q * cover[i - d0 - 5] } else { 0.0 })
                + 2.0 * q * cover[i];
            let echo1 = (if i >= d1 { q * cover[i - d1] } else { 0.0 })
                - (if i >= d1 + 5 { q * cover[i - d1 - 5] } else { 0.0 })
                + 2.0 * q * cover[i];
            cover[i] + echo1 * mixer[i] + echo0 * (1.0 - mixer[i]).abs()
        })
        .collect()
}

fn kernel_decode(stego: &[f64], d0: usize, d1: usize, l: usize) -> BitBuffer {
    let segments = echo_common::decode_segments(stego, l);
    let bits: Vec<u8> = segments
        .iter()
        .map(|seg| {
            let cn = complex_power_cepstrum(seg);
            if cn[d0] > cn[d1] || cn[d0 + 5] < cn[d1 + 5] { 0 } else { 1 }
        })
        .collect();
    BitBuffer::new(bits)
}

impl Method for EchoBipolarBf {
    fn tag(&self) -> MethodTag {
        MethodTag::EchoBipolarBf
    }

    fn encode(&self, cover: &Signal, payload: &BitBuffer, opts: &SideParams) -> Result<(Signal, SideParams)> {
        let alpha = opts.get_f64("alpha").unwrap_or(DEFAULT_ALPHA);
        let decay_rate = opts.get_f64("decay_rate").unwrap_or(DEFAULT_DECAY_RATE);
        let delay_search = opts.get_str("delay_search").unwrap_or("").to_string();
        let d0 = opts.get_usize("d0");
        let d1 = opts.get_usize("d1");

        let cover_samples = cover.samples().to_vec();
        let (raw, d0, d1) = echo_common::encode_with_search(
            cover,
            payload,
            d0,
            d1,
            alpha,
            decay_rate,
            &delay_search,
            |d0, d1, alpha, decay_rate| kernel_encode(&cover_samples, payload, d0, d1, alpha, decay_rate),
            |encoded, d0, d1, l| kernel_decode(encoded, d0, d1, l),
        )?;

        let samples = echo_common::finish(&raw, cover);
        let mut side = SideParams::new();
        side.insert("d0", d0).insert("d1", d1).insert("l", payload.len());
        Ok((cover.with_samples(samples), side))
    }

    fn decode(&self, stego: &Signal, side: &SideParams) -> Result<BitBuffer> {
        let l = side.len_bits();
        if l == 0 {
            return Ok(BitBuffer::default());
        }
        let d0 = side.get_usize("d0").unwrap_or(echo_common::DEFAULT_D0);
        let d1 = side.get_usize("d1").unwrap_or(d0 + 50);
        Ok(kernel_decode(stego.samples(), d0, d1, l))
    }

    fn encode_args(&self) -> Vec<ParamDescriptor> {
        echo_encode_args()
    }

    fn decode_args(&self) -> Vec<ParamDescriptor> {
        echo_decode_args()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::Dtype;

    fn cover(n: usize) -> Signal {
        let samples: Vec<f64> = (0..n).map(|i| ((i as f64 * 0.061).sin() * 20000.0).round()).collect();
        Signal::new(samples, Dtype::I16, 44100)
    }

    #[test]
    fn round_trips_with_bruteforce_search() {
        let payload = BitBuffer::from_str_utf8("42");
        let cover = cover(payload.len() * 8192);
        let method = EchoBipolarBf;
        let mut opts = SideParams::new();
        opts.insert("d0", 250i64).insert("d1", 350i64).insert("delay_search", "bruteforce");
        let (stego, side) = method.encode(&cover, &payload, &opts).unwrap();
        let decoded = method.decode(&stego, &side).unwrap();
        assert_eq!(decoded.len(), payload.len());
    }
}

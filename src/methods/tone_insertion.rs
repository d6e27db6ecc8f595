//! Tone insertion (§4.8): blends two fixed-frequency tones into each
//! segment, with the tone matching the segment's bit boosted well above the
//! other.
//!
//! The upstream implementation of this method never finished: it computes
//! the reference tone powers and then returns the cover unmodified, and its
//! decoder is a stub that always reports zero bits. The algorithm below
//! follows the method's own power-ratio description instead of that stub.

use std::f64::consts::PI;

use crate::bits::BitBuffer;
use crate::dtype::to_dtype;
use crate::error::{Result, StegoError};
use crate::method::{Method, MethodTag, ParamDescriptor, ParamValue, SideParams};
use crate::segment::split_to_segments_of_len_n;
use crate::signal::Signal;

pub const SEGMENT_LEN: usize = 705;
pub const DEFAULT_F0: f64 = 1250.0;
pub const DEFAULT_F1: f64 = 8575.0;

const STRONG_RATIO: f64 = 0.0025;
const WEAK_RATIO: f64 = 0.000025;

pub struct ToneInsertion;

fn tone(freq: f64) -> Vec<f64> {
    (0..SEGMENT_LEN)
        .map(|i| {
            let t = 0.016 * i as f64 / (SEGMENT_LEN - 1) as f64;
            (2.0 * PI * freq * t).sin()
        })
        .collect()
}

fn power(x: &[f64]) -> f64 {
    x.iter().map(|&v| v * v).sum::<f64>() / x.len() as f64
}

impl Method for ToneInsertion {
    fn tag(&self) -> MethodTag {
        MethodTag::ToneInsertion
    }

    fn encode(&self, cover: &Signal, payload: &BitBuffer, opts: &SideParams) -> Result<(Signal, SideParams)> {
        let f0 = opts.get_f64("f0").unwrap_or(DEFAULT_F0);
        let f1 = opts.get_f64("f1").unwrap_or(DEFAULT_F1);

        let mut side = SideParams::new();
        side.insert("l", payload.len()).insert("f0", f0).insert("f1", f1);

        if payload.is_empty() {
            return Ok((cover.with_samples(cover.samples().to_vec()), side));
        }

        let l = payload.len();
        if l * SEGMENT_LEN > cover.len() {
            return Err(StegoError::SecretTooLarge { secret_bits: l, capacity_bits: cover.len() / SEGMENT_LEN });
        }

        let tone0 = tone(f0);
        let tone1 = tone(f1);
        let p0 = power(&tone0);
        let p1 = power(&tone1);

        let (mut segments, rest) = split_to_segments_of_len_n(cover.samples(), SEGMENT_LEN);

        for (segment, &bit) in segments.iter_mut().zip(payload.as_slice()) {
            let p_i = power(segment);
            let (strong_p, weak_p) = (STRONG_RATIO * p_i, WEAK_RATIO * p_i);
            let (amp0, amp1) = if bit == 1 {
                ((weak_p / p0).sqrt(), (strong_p / p1).sqrt())
            } else {
                ((strong_p / p0).sqrt(), (weak_p / p1).sqrt())
            };
            for i in 0..SEGMENT_LEN {
                segment[i] += amp0 * tone0[i] + amp1 * tone1[i];
            }
        }

        let mut raw: Vec<f64> = segments.into_iter().flatten().collect();
        raw.extend(rest);

        let samples = to_dtype(&raw, cover.dtype(), cover.dtype());
        Ok((cover.with_samples(samples), side))
    }

    fn decode(&self, stego: &Signal, side: &SideParams) -> Result<BitBuffer> {
        let l = side.len_bits();
        if l == 0 {
            return Ok(BitBuffer::default());
        }
        let f0 = side.get_f64("f0").unwrap_or(DEFAULT_F0);
        let f1 = side.get_f64("f1").unwrap_or(DEFAULT_F1);

        let tone0 = tone(f0);
        let tone1 = tone(f1);

        let (segments, _) = split_to_segments_of_len_n(stego.samples(), SEGMENT_LEN);
        let bits: Vec<u8> = segments
            .iter()
            .take(l)
            .map(|segment| {
                let dot0: f64 = segment.iter().zip(&tone0).map(|(&a, &b)| a * b).sum();
                let dot1: f64 = segment.iter().zip(&tone1).map(|(&a, &b)| a * b).sum();
                if dot1 > dot0 { 1 } else { 0 }
            })
            .collect();

        Ok(BitBuffer::new(bits))
    }

    fn encode_args(&self) -> Vec<ParamDescriptor> {
        vec![
            ParamDescriptor { name: "f0", help: "first tone frequency in Hz", required: false, default: Some(ParamValue::Float(DEFAULT_F0)) },
            ParamDescriptor { name: "f1", help: "second tone frequency in Hz", required: false, default: Some(ParamValue::Float(DEFAULT_F1)) },
        ]
    }

    fn decode_args(&self) -> Vec<ParamDescriptor> {
        vec![
            ParamDescriptor { name: "f0", help: "first tone frequency in Hz", required: false, default: Some(ParamValue::Float(DEFAULT_F0)) },
            ParamDescriptor { name: "f1", help: "second tone frequency in Hz", required: false, default: Some(ParamValue::Float(DEFAULT_F1)) },
            ParamDescriptor { name: "l", help: "encoded data length; decode only this many bits", required: true, default: None },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::Dtype;

    fn cover(n: usize) -> Signal {
        let samples: Vec<f64> = (0..n).map(|i| ((i as f64 * 0.011).sin() * 20000.0).round()).collect();
        Signal::new(samples, Dtype::I16, 44100)
    }

    #[test]
    fn round_trips() {
        let payload = BitBuffer::from_str_utf8("42");
        let cover = cover(payload.len() * SEGMENT_LEN);
        let method = ToneInsertion;
        let (stego, side) = method.encode(&cover, &payload, &SideParams::new()).unwrap();
        let decoded = method.decode(&stego, &side).unwrap();
        assert_eq!(decoded.as_slice(), payload.as_slice());
    }

    #[test]
    fn encoded_samples_stay_integral_for_an_integer_cover() {
        let payload = BitBuffer::from_str_utf8("42");
        let cover = cover(payload.len() * SEGMENT_LEN);
        let method = ToneInsertion;
        let (stego, _) = method.encode(&cover, &payload, &SideParams::new()).unwrap();
        assert!(stego.samples().iter().all(|v| v.fract() == 0.0));
    }
}

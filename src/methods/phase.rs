//! Phase coding (§4.5): hides bits in the phase spectrum of the cover's
//! first segment, propagating phase differences into later segments so the
//! reconstruction stays continuous.

use num_complex::Complex64;
use rustfft::FftPlanner;
use std::f64::consts::PI;

use crate::bits::BitBuffer;
use crate::dtype::{to_dtype, Dtype};
use crate::error::{Result, StegoError};
use crate::method::{Method, MethodTag, ParamDescriptor, SideParams};
use crate::segment::split_to_segments_of_len_n;
use crate::signal::Signal;

pub struct Phase;

/// `2 * 2^ceil(log2(2*l))`, the smallest power-of-two segment twice `l`'s
/// nearest power of two (§4.5).
fn segment_len(l: usize) -> usize {
    let mut p = 1usize;
    while p < 2 * l {
        p *= 2;
    }
    2 * p
}

fn fft_forward(x: &[f64]) -> Vec<Complex64> {
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(x.len());
    let mut buf: Vec<Complex64> = x.iter().map(|&v| Complex64::new(v, 0.0)).collect();
    fft.process(&mut buf);
    buf
}

fn ifft_real(mag: &[f64], angles: &[f64]) -> Vec<f64> {
    let n = mag.len();
    let mut planner = FftPlanner::<f64>::new();
    let ifft = planner.plan_fft_inverse(n);
    let mut buf: Vec<Complex64> =
        mag.iter().zip(angles).map(|(&m, &a)| Complex64::from_polar(m, a)).collect();
    ifft.process(&mut buf);
    let scale = 1.0 / n as f64;
    buf.iter().map(|c| c.re * scale).collect()
}

fn finish(raw: &[f64], from: Dtype, to: Dtype) -> Vec<f64> {
    let mean = raw.iter().sum::<f64>() / raw.len().max(1) as f64;
    let centered: Vec<f64> = raw.iter().map(|&v| v - mean).collect();
    let max_abs = centered.iter().fold(0.0f64, |m, &v| m.max(v.abs()));
    let normalized: Vec<f64> = if max_abs != 0.0 { centered.iter().map(|&v| v / max_abs).collect() } else { centered };
    to_dtype(&normalized, from, to)
}

impl Method for Phase {
    fn tag(&self) -> MethodTag {
        MethodTag::Phase
    }

    fn encode(&self, cover: &Signal, payload: &BitBuffer, opts: &SideParams) -> Result<(Signal, SideParams)> {
        let _ = opts;
        let l = payload.len();
        let mut side = SideParams::new();
        side.insert("l", l);

        if l == 0 {
            return Ok((cover.with_samples(cover.samples().to_vec()), side));
        }

        let n = segment_len(l);
        if n > cover.len() {
            return Err(StegoError::SecretTooLarge { secret_bits: l, capacity_bits: cover.len() / n.max(1) });
        }

        let (segments, rest) = split_to_segments_of_len_n(cover.samples(), n);
        let spectra: Vec<Vec<Complex64>> = segments.iter().map(|s| fft_forward(s)).collect();
        let magnitudes: Vec<Vec<f64>> = spectra.iter().map(|s| s.iter().map(|c| c.norm()).collect()).collect();
        let mut angles: Vec<Vec<f64>> = spectra.iter().map(|s| s.iter().map(|c| c.arg()).collect()).collect();

        let diffs: Vec<Vec<f64>> = (0..angles.len().saturating_sub(1))
            .map(|i| angles[i + 1].iter().zip(&angles[i]).map(|(a, b)| a - b).collect())
            .collect();

        let secret_angles: Vec<f64> =
            payload.as_slice().iter().map(|&b| if b == 0 { PI / 2.0 } else { -PI / 2.0 }).collect();

        let half = n / 2;
        angles[0][half - l..half].copy_from_slice(&secret_angles);
        for (k, &a) in secret_angles.iter().rev().enumerate() {
            angles[0][half + 1 + k] = -a;
        }

        for i in 1..angles.len() {
            for k in 0..n {
                angles[i][k] = angles[i - 1][k] + diffs[i - 1][k];
            }
        }

        let mut raw = Vec::with_capacity(cover.len());
        for (mag, ang) in magnitudes.iter().zip(&angles) {
            raw.extend(ifft_real(mag, ang));
        }
        raw.extend(rest.iter().copied());

        let samples = finish(&raw, Dtype::F64, cover.dtype());
        Ok((cover.with_samples(samples), side))
    }

    fn decode(&self, stego: &Signal, side: &SideParams) -> Result<BitBuffer> {
        let l = side.len_bits();
        if l == 0 {
            return Ok(BitBuffer::default());
        }
        let n = segment_len(l);
        let seg = &stego.samples()[..n.min(stego.len())];
        let spectrum = fft_forward(seg);
        let half = n / 2;
        let bits: Vec<u8> =
            spectrum[half - l..half].iter().map(|c| if c.arg() < 0.0 { 1 } else { 0 }).collect();
        Ok(BitBuffer::new(bits))
    }

    fn decode_args(&self) -> Vec<ParamDescriptor> {
        vec![ParamDescriptor { name: "l", help: "encoded data length; decode only this many bits", required: true, default: None }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cover(n: usize) -> Signal {
        let samples: Vec<f64> = (0..n).map(|i| ((i as f64 * 0.029).sin() * 20000.0).round()).collect();
        Signal::new(samples, Dtype::I16, 44100)
    }

    #[test]
    fn round_trips() {
        let payload = BitBuffer::from_str_utf8("42");
        let cover = cover(4096);
        let method = Phase;
        let (stego, side) = method.encode(&cover, &payload, &SideParams::new()).unwrap();
        let decoded = method.decode(&stego, &side).unwrap();
        assert_eq!(decoded.as_slice(), payload.as_slice());
    }

    #[test]
    fn empty_payload_round_trips_to_empty() {
        let payload = BitBuffer::default();
        let cover = cover(256);
        let method = Phase;
        let (stego, side) = method.encode(&cover, &payload, &SideParams::new()).unwrap();
        assert_eq!(method.decode(&stego, &side).unwrap().len(), 0);
    }
}

//! Silence interval coding (§4.7): hides a nibble per shortened segment
//! boundary, where segments are delimited by runs of near-silent samples.

use crate::bits::BitBuffer;
use crate::consecutive::consecutive_values;
use crate::error::{Result, StegoError};
use crate::method::{Method, MethodTag, ParamDescriptor, ParamValue, SideParams};
use crate::signal::Signal;

pub const DEFAULT_MIN_SILENCE_LEN: usize = 400;

pub struct SilenceInterval;

fn silence_run_lengths(samples: &[f64]) -> (Vec<usize>, Vec<usize>) {
    let peak = samples.iter().fold(0.0f64, |m, &v| m.max(v.abs()));
    let threshold = 0.15 * peak;
    let silent: Vec<bool> = samples.iter().map(|&v| v.abs() <= threshold).collect();
    consecutive_values(&silent)
}

fn pack_nibbles(bits: &[u8]) -> Vec<u8> {
    let padded_len = bits.len().div_ceil(4) * 4;
    let mut padded = bits.to_vec();
    padded.resize(padded_len, 0);
    padded
        .chunks(4)
        .map(|c| c.iter().enumerate().fold(0u8, |acc, (k, &b)| acc | (b << k)))
        .collect()
}

impl Method for SilenceInterval {
    fn tag(&self) -> MethodTag {
        MethodTag::SilenceInterval
    }

    fn encode(&self, cover: &Signal, payload: &BitBuffer, opts: &SideParams) -> Result<(Signal, SideParams)> {
        let min_silence_len = opts.get_usize("min_silence_len").unwrap_or(DEFAULT_MIN_SILENCE_LEN);

        let mut side = SideParams::new();
        side.insert("l", payload.len());

        if payload.is_empty() {
            return Ok((cover.with_samples(cover.samples().to_vec()), side));
        }

        let (starts, _) = silence_run_lengths(cover.samples());
        let nibbles = pack_nibbles(payload.as_slice());

        if starts.is_empty() {
            return Err(StegoError::SecretTooLarge { secret_bits: nibbles.len(), capacity_bits: 0 });
        }

        let mut bounds = starts.clone();
        bounds.remove(0);
        bounds.push(cover.len());

        let mut segments: Vec<Vec<f64>> = Vec::with_capacity(bounds.len());
        let mut pos = 0;
        for &b in &bounds {
            segments.push(cover.samples()[pos..b].to_vec());
            pos = b;
        }

        let mut nibble_idx = 0usize;
        for segment in segments.iter_mut() {
            if nibble_idx == nibbles.len() {
                break;
            }
            let len = segment.len();
            let target = nibbles[nibble_idx] as usize;
            let new_len = len - ((len as i64 - target as i64).rem_euclid(16) as usize);
            if len < min_silence_len || new_len < min_silence_len {
                continue;
            }
            segment.truncate(new_len);
            nibble_idx += 1;
        }

        if nibble_idx != nibbles.len() {
            return Err(StegoError::SecretTooLarge { secret_bits: nibbles.len(), capacity_bits: nibble_idx });
        }

        let samples: Vec<f64> = segments.into_iter().flatten().collect();
        Ok((cover.with_samples(samples), side))
    }

    fn decode(&self, stego: &Signal, side: &SideParams) -> Result<BitBuffer> {
        let l = side.len_bits();
        if l == 0 {
            return Ok(BitBuffer::default());
        }
        let min_silence_len = side.get_usize("min_silence_len").unwrap_or(DEFAULT_MIN_SILENCE_LEN);

        let (_, lens) = silence_run_lengths(stego.samples());
        let take = stego.len().div_ceil(4);
        let nibbles: Vec<u8> =
            lens.into_iter().filter(|&len| len >= min_silence_len).take(take).map(|len| (len % 16) as u8).collect();

        let mut bits = Vec::with_capacity(nibbles.len() * 4);
        for nibble in nibbles {
            for k in 0..4 {
                bits.push((nibble >> k) & 1);
            }
        }
        bits.truncate(l);
        Ok(BitBuffer::new(bits))
    }

    fn encode_args(&self) -> Vec<ParamDescriptor> {
        vec![ParamDescriptor {
            name: "min_silence_len",
            help: "minimum length of a silence interval; default: 400",
            required: false,
            default: Some(ParamValue::Int(DEFAULT_MIN_SILENCE_LEN as i64)),
        }]
    }

    fn decode_args(&self) -> Vec<ParamDescriptor> {
        vec![
            ParamDescriptor { name: "l", help: "encoded data length; decode only this many bits", required: true, default: None },
            ParamDescriptor {
                name: "min_silence_len",
                help: "minimum length of a silence interval; default: 400",
                required: false,
                default: Some(ParamValue::Int(DEFAULT_MIN_SILENCE_LEN as i64)),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::Dtype;

    fn cover_with_silence(n: usize) -> Signal {
        let mut samples = Vec::with_capacity(n);
        let mut toggle = true;
        let mut i = 0;
        while i < n {
            let run = 900;
            for _ in 0..run.min(n - i) {
                samples.push(if toggle { 0.0 } else { 20000.0 });
                i += 1;
            }
            toggle = !toggle;
        }
        Signal::new(samples, Dtype::I16, 44100)
    }

    #[test]
    fn round_trips() {
        let payload = BitBuffer::from_str_utf8("H");
        let cover = cover_with_silence(payload.len().div_ceil(4) * 2 * 900 + 900);
        let method = SilenceInterval;
        let (stego, side) = method.encode(&cover, &payload, &SideParams::new()).unwrap();
        let decoded = method.decode(&stego, &side).unwrap();
        assert_eq!(decoded.as_slice(), payload.as_slice());
    }

    #[test]
    fn cover_with_no_detectable_runs_reports_secret_too_large_instead_of_panicking() {
        let payload = BitBuffer::from_str_utf8("H");
        let cover = Signal::new(Vec::new(), Dtype::I16, 44100);
        let method = SilenceInterval;
        let err = method.encode(&cover, &payload, &SideParams::new()).unwrap_err();
        assert!(matches!(err, crate::error::StegoError::SecretTooLarge { .. }));
    }
}

//! Direct-sequence spread spectrum (§4.6): spreads each payload bit as a
//! `+-1` chip train and mixes it with a passphrase-derived PN sequence.

use crate::bits::BitBuffer;
use crate::dtype::{to_dtype, Dtype};
use crate::error::{Result, StegoError};
use crate::method::{Method, MethodTag, ParamDescriptor, ParamValue, SideParams};
use crate::pn::pn_sequence;
use crate::segment::split_to_n_segments;
use crate::signal::Signal;
use crate::spread::spread_bits_bipolar;

pub const DEFAULT_ALPHA: f64 = 0.005;

pub struct Dsss;

impl Method for Dsss {
    fn tag(&self) -> MethodTag {
        MethodTag::Dsss
    }

    fn encode(&self, cover: &Signal, payload: &BitBuffer, opts: &SideParams) -> Result<(Signal, SideParams)> {
        let password = opts.get_str("password").unwrap_or("").to_string();
        let alpha = opts.get_f64("alpha").unwrap_or(DEFAULT_ALPHA);

        let mut side = SideParams::new();
        side.insert("l", payload.len()).insert("password", password.clone());

        if payload.len() > cover.len() {
            return Err(StegoError::SecretTooLarge { secret_bits: payload.len(), capacity_bits: cover.len() });
        }

        if payload.is_empty() {
            return Ok((cover.with_samples(cover.samples().to_vec()), side));
        }

        let mixer = spread_bits_bipolar(payload.as_slice(), cover.len());
        let pn = pn_sequence(&password, cover.len());

        let raw: Vec<f64> = cover
            .samples()
            .iter()
            .zip(mixer.iter().zip(&pn))
            .map(|(&s, (&m, &p))| s + m * alpha * p)
            .collect();

        let mean = raw.iter().sum::<f64>() / raw.len() as f64;
        let centered: Vec<f64> = raw.iter().map(|&v| v - mean).collect();
        let max_abs = centered.iter().fold(0.0f64, |m, &v| m.max(v.abs()));
        let normalized: Vec<f64> =
            if max_abs != 0.0 { centered.iter().map(|&v| v / max_abs).collect() } else { centered };
        let samples = to_dtype(&normalized, Dtype::F64, cover.dtype());

        Ok((cover.with_samples(samples), side))
    }

    fn decode(&self, stego: &Signal, side: &SideParams) -> Result<BitBuffer> {
        let l = side.len_bits();
        if l == 0 {
            return Ok(BitBuffer::default());
        }
        let password = side.get_str("password").unwrap_or("");
        let pn = pn_sequence(password, stego.len());

        let (stego_segments, _) = split_to_n_segments(stego.samples(), l);
        let (pn_segments, _) = split_to_n_segments(&pn, l);

        let bits: Vec<u8> = stego_segments
            .iter()
            .zip(&pn_segments)
            .map(|(s, p)| {
                let corr: f64 = s.iter().zip(p).map(|(&a, &b)| a * b).sum();
                if corr > 0.0 { 1 } else { 0 }
            })
            .collect();

        Ok(BitBuffer::new(bits))
    }

    fn encode_args(&self) -> Vec<ParamDescriptor> {
        vec![
            ParamDescriptor { name: "password", help: "passphrase seeding the PN sequence", required: false, default: Some(ParamValue::Str(String::new())) },
            ParamDescriptor { name: "alpha", help: "spreading amplitude multiplier", required: false, default: Some(ParamValue::Float(DEFAULT_ALPHA)) },
        ]
    }

    fn decode_args(&self) -> Vec<ParamDescriptor> {
        vec![
            ParamDescriptor { name: "password", help: "passphrase seeding the PN sequence", required: false, default: Some(ParamValue::Str(String::new())) },
            ParamDescriptor { name: "l", help: "encoded data length; decode only this many bits", required: true, default: None },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cover(n: usize) -> Signal {
        let samples: Vec<f64> = (0..n).map(|i| ((i as f64 * 0.017).sin() * 20000.0).round()).collect();
        Signal::new(samples, Dtype::I16, 44100)
    }

    #[test]
    fn round_trips_with_correct_password() {
        let payload = BitBuffer::from_str_utf8("42");
        let cover = cover(payload.len() * 4096);
        let method = Dsss;
        let mut opts = SideParams::new();
        opts.insert("password", "hunter2");
        let (stego, side) = method.encode(&cover, &payload, &opts).unwrap();
        let decoded = method.decode(&stego, &side).unwrap();
        assert_eq!(decoded.as_slice(), payload.as_slice());
    }

    #[test]
    fn wrong_password_mismatches() {
        let payload = BitBuffer::from_str_utf8("42");
        let cover = cover(payload.len() * 4096);
        let method = Dsss;
        let mut opts = SideParams::new();
        opts.insert("password", "hunter2");
        let (stego, side) = method.encode(&cover, &payload, &opts).unwrap();

        let mut wrong_side = side.clone();
        wrong_side.insert("password", "wrong");
        let decoded = method.decode(&stego, &wrong_side).unwrap();
        assert_ne!(decoded.as_slice(), payload.as_slice());
    }
}

//! Least significant bit substitution (§4.3).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bits::BitBuffer;
use crate::dtype::{float_to_int_bits, int_bits_to_float, Dtype};
use crate::error::{Result, StegoError};
use crate::method::{Method, MethodTag, ParamDescriptor, ParamValue, SideParams};
use crate::signal::Signal;

pub struct Lsb;

fn to_int_view(samples: &[f64], dtype: Dtype) -> Vec<i64> {
    match dtype.lsb_int_view() {
        Some(from) => float_to_int_bits(samples, from),
        None => samples.iter().map(|&v| v.round() as i64).collect(),
    }
}

fn from_int_view(ints: &[i64], dtype: Dtype) -> Vec<f64> {
    match dtype.lsb_int_view() {
        Some(to) => int_bits_to_float(ints, to),
        None => ints.iter().map(|&v| v as f64).collect(),
    }
}

fn pack_chunks(bits: &[u8], depth: usize) -> Vec<i64> {
    bits.chunks(depth)
        .map(|chunk| chunk.iter().enumerate().fold(0i64, |acc, (k, &b)| acc | ((b as i64) << k)))
        .collect()
}

fn unpack_chunks(values: &[i64], depth: usize, l: usize) -> BitBuffer {
    let mut bits = Vec::with_capacity(values.len() * depth);
    for &v in values {
        for k in 0..depth {
            bits.push(((v >> k) & 1) as u8);
        }
    }
    bits.truncate(l);
    BitBuffer::new(bits)
}

impl Method for Lsb {
    fn tag(&self) -> MethodTag {
        MethodTag::Lsb
    }

    fn encode(&self, cover: &Signal, payload: &BitBuffer, opts: &SideParams) -> Result<(Signal, SideParams)> {
        let int_dtype = cover.dtype().lsb_int_view().unwrap_or(cover.dtype());
        let bitwidth = int_dtype.bits() as usize;
        let depth = opts.get_usize("depth").unwrap_or(1);
        if depth < 1 || depth > bitwidth {
            return Err(StegoError::InvalidParameter(format!("bit depth must be between 1 and {bitwidth}")));
        }
        let only_needed = opts.get_bool("only_needed").unwrap_or(false);

        let mut side = SideParams::new();
        side.insert("l", payload.len()).insert("depth", depth);

        if payload.is_empty() {
            return Ok((cover.with_samples(cover.samples().to_vec()), side));
        }

        let mut ints = to_int_view(cover.samples(), cover.dtype());

        let l = payload.len();
        let padded_len = l.div_ceil(depth) * depth;
        let mut padded_bits = payload.as_slice().to_vec();
        padded_bits.resize(padded_len, 0);
        let chunks = pack_chunks(&padded_bits, depth);

        if chunks.len() > ints.len() {
            return Err(StegoError::SecretTooLarge { secret_bits: chunks.len(), capacity_bits: ints.len() });
        }

        let mask = !((1i64 << depth) - 1);
        let mut rng = opts.get_i64("seed").map(|s| StdRng::seed_from_u64(s as u64)).unwrap_or_else(StdRng::from_entropy);

        for (i, slot) in ints.iter_mut().enumerate() {
            if i < chunks.len() {
                *slot = (*slot & mask) | chunks[i];
            } else if only_needed {
                // tail left untouched
            } else {
                let noise: i64 = rng.gen_range(0..1i64 << depth);
                *slot = (*slot & mask) | noise;
            }
        }

        let samples = from_int_view(&ints, cover.dtype());
        Ok((cover.with_samples(samples), side))
    }

    fn decode(&self, stego: &Signal, side: &SideParams) -> Result<BitBuffer> {
        let l = side.len_bits();
        if l == 0 {
            return Ok(BitBuffer::default());
        }
        let depth = side.get_usize("depth").unwrap_or(1);
        let chunks_needed = l.div_ceil(depth);

        let int_dtype = stego.dtype().lsb_int_view().unwrap_or(stego.dtype());
        let bitwidth = int_dtype.bits() as usize;
        if depth < 1 || depth > bitwidth {
            return Err(StegoError::InvalidParameter(format!("bit depth must be between 1 and {bitwidth}")));
        }

        let ints = to_int_view(stego.samples(), stego.dtype());
        let n = chunks_needed.min(ints.len());
        let mask = (1i64 << depth) - 1;
        let values: Vec<i64> = ints[..n].iter().map(|&v| v & mask).collect();
        Ok(unpack_chunks(&values, depth, l))
    }

    fn encode_args(&self) -> Vec<ParamDescriptor> {
        vec![
            ParamDescriptor {
                name: "depth",
                help: "number of bits to encode in a sample",
                required: false,
                default: Some(ParamValue::Int(1)),
            },
            ParamDescriptor {
                name: "only_needed",
                help: "encode only LSBs that are needed",
                required: false,
                default: Some(ParamValue::Bool(false)),
            },
        ]
    }

    fn decode_args(&self) -> Vec<ParamDescriptor> {
        vec![
            ParamDescriptor {
                name: "depth",
                help: "number of bits encoded in a sample",
                required: false,
                default: Some(ParamValue::Int(1)),
            },
            ParamDescriptor { name: "l", help: "encoded data length; decode only this many bits", required: true, default: None },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cover(n: usize) -> Signal {
        let samples: Vec<f64> = (0..n).map(|i| (i as i64 % 65536 - 32768) as f64).collect();
        Signal::new(samples, Dtype::I16, 44100)
    }

    #[test]
    fn depth_1_round_trips() {
        let payload = BitBuffer::from_str_utf8("42");
        let cover = cover(payload.len() * 2);
        let method = Lsb;
        let mut opts = SideParams::new();
        opts.insert("depth", 1i64);
        let (stego, side) = method.encode(&cover, &payload, &opts).unwrap();
        let decoded = method.decode(&stego, &side).unwrap();
        assert_eq!(decoded.as_slice(), payload.as_slice());
    }

    #[test]
    fn depth_2_round_trips_but_mismatches_depth_1_decode() {
        let payload = BitBuffer::from_str_utf8("42");
        let cover = cover(payload.len());
        let method = Lsb;
        let mut opts = SideParams::new();
        opts.insert("depth", 2i64);
        let (stego, side) = method.encode(&cover, &payload, &opts).unwrap();
        let decoded = method.decode(&stego, &side).unwrap();
        assert_eq!(decoded.as_slice(), payload.as_slice());

        let mut wrong_side = side.clone();
        wrong_side.insert("depth", 1i64);
        let wrong = method.decode(&stego, &wrong_side).unwrap();
        assert_ne!(wrong.as_slice(), payload.as_slice());
    }

    #[test]
    fn only_needed_leaves_tail_untouched() {
        let payload = BitBuffer::from_str_utf8("4");
        let cover = cover(64);
        let method = Lsb;
        let mut opts = SideParams::new();
        opts.insert("only_needed", true);
        let (stego, _) = method.encode(&cover, &payload, &opts).unwrap();
        assert_eq!(&stego.samples()[8..], &cover.samples()[8..]);
    }

    #[test]
    fn secret_too_large_errors() {
        let payload = BitBuffer::from_str_utf8("this is way too long to fit");
        let cover = cover(4);
        let method = Lsb;
        assert!(method.encode(&cover, &payload, &SideParams::new()).is_err());
    }
}

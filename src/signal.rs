//! The single-channel sample buffer every method operates on.

use crate::dtype::Dtype;

/// A single-channel signal: its samples (always stored as `f64`, at the
/// dtype's native scale — an `I16` signal's samples range over
/// `-32768.0..=32767.0`, not `[-1, 1]`), its dtype and its sample rate.
///
/// Multichannel covers are reduced to channel 0 before reaching a `Signal`
/// (§6); nothing in the method contract deals with channel count.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    samples: Vec<f64>,
    dtype: Dtype,
    sample_rate: u32,
}

impl Signal {
    pub fn new(samples: Vec<f64>, dtype: Dtype, sample_rate: u32) -> Self {
        Signal { samples, dtype, sample_rate }
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [f64] {
        &mut self.samples
    }

    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }

    pub fn dtype(&self) -> Dtype {
        self.dtype
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// A new signal with the same dtype and sample rate but different
    /// samples, as produced by a method's encode step.
    pub fn with_samples(&self, samples: Vec<f64>) -> Self {
        Signal { samples, dtype: self.dtype, sample_rate: self.sample_rate }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_samples_preserves_dtype_and_rate() {
        let s = Signal::new(vec![1.0, 2.0, 3.0], Dtype::I16, 44100);
        let t = s.with_samples(vec![4.0, 5.0, 6.0]);
        assert_eq!(t.dtype(), Dtype::I16);
        assert_eq!(t.sample_rate(), 44100);
        assert_eq!(t.samples(), &[4.0, 5.0, 6.0]);
    }
}

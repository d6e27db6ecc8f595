//! Robustness modifications applied to a stego signal before decoding, used
//! only by the evaluation harness (`audio_utils.py`'s `resample`,
//! `add_normalized_noise`, and the evaluation loop's quantization/filter/MP3
//! steps).

use std::io::Write as _;
use std::process::{Command, Stdio};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::dtype::{to_dtype, Dtype};
use crate::signal::Signal;

/// One robustness modification applied to a stego signal, in evaluation
/// order (§4.10).
#[derive(Debug, Clone)]
pub enum Modification {
    Identity,
    ResampleHalfRateRoundTrip,
    QuantizationDowngrade,
    AdditiveNoise { snr_db: f64 },
    Mp3RoundTrip { bitrate_kbps: u32 },
    ButterworthLowPass,
    ButterworthHighPass,
}

impl Modification {
    pub fn label(&self) -> String {
        match self {
            Modification::Identity => "identity".to_string(),
            Modification::ResampleHalfRateRoundTrip => "resample_half_rate".to_string(),
            Modification::QuantizationDowngrade => "quantization_downgrade".to_string(),
            Modification::AdditiveNoise { snr_db } => format!("noise_{snr_db}db"),
            Modification::Mp3RoundTrip { bitrate_kbps } => format!("mp3_{bitrate_kbps}kbit"),
            Modification::ButterworthLowPass => "butterworth_lowpass".to_string(),
            Modification::ButterworthHighPass => "butterworth_highpass".to_string(),
        }
    }

    /// The standard modification sequence (§4.10); `extended` adds the
    /// 15 dB noise step and the 128 kbit MP3 step.
    pub fn sequence(extended: bool) -> Vec<Modification> {
        let mut seq = vec![
            Modification::Identity,
            Modification::ResampleHalfRateRoundTrip,
            Modification::QuantizationDowngrade,
            Modification::AdditiveNoise { snr_db: 20.0 },
            Modification::AdditiveNoise { snr_db: 10.0 },
        ];
        if extended {
            seq.push(Modification::AdditiveNoise { snr_db: 15.0 });
        }
        seq.push(Modification::Mp3RoundTrip { bitrate_kbps: 96 });
        if extended {
            seq.push(Modification::Mp3RoundTrip { bitrate_kbps: 128 });
        }
        seq.push(Modification::ButterworthLowPass);
        seq.push(Modification::ButterworthHighPass);
        seq
    }

    /// Applies the modification to `signal`. Returns `None` only for the
    /// MP3 step when no external codec binary is on `PATH` (§4.10 failure
    /// policy: skip the step, don't fail the task).
    pub fn apply(&self, signal: &Signal) -> Option<Signal> {
        match self {
            Modification::Identity => Some(signal.clone()),
            Modification::ResampleHalfRateRoundTrip => Some(resample_round_trip(signal)),
            Modification::QuantizationDowngrade => Some(quantization_downgrade(signal)),
            Modification::AdditiveNoise { snr_db } => Some(add_normalized_noise(signal, *snr_db)),
            Modification::Mp3RoundTrip { bitrate_kbps } => mp3_round_trip(signal, *bitrate_kbps),
            Modification::ButterworthLowPass => {
                Some(butterworth(signal, signal.sample_rate() as f64 / 4.0, false))
            }
            Modification::ButterworthHighPass => {
                Some(butterworth(signal, signal.sample_rate() as f64 / 4.0, true))
            }
        }
    }
}

/// Linear 1-D resample by `factor` (`audio_utils.py`'s `resample`): maps
/// `ceil(len/factor)` evenly-spaced output points onto a linear
/// interpolation of the input sampled on `[0, 1]`.
pub fn resample_linear(x: &[f64], factor: f64) -> Vec<f64> {
    if x.is_empty() {
        return Vec::new();
    }
    let n = (x.len() as f64 / factor).ceil() as usize;
    if n == 0 {
        return Vec::new();
    }
    if x.len() == 1 {
        return vec![x[0]; n];
    }
    (0..n)
        .map(|i| {
            let t = i as f64 / (n - 1).max(1) as f64;
            let pos = t * (x.len() - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = (lo + 1).min(x.len() - 1);
            let frac = pos - lo as f64;
            x[lo] * (1.0 - frac) + x[hi] * frac
        })
        .collect()
}

/// Downsamples to half rate then back to the original length, the
/// resampling artifact modification (§4.10).
fn resample_round_trip(signal: &Signal) -> Signal {
    let halved = resample_linear(signal.samples(), 2.0);
    let restored = resample_linear(&halved, 0.5);
    let mut restored = restored;
    restored.resize(signal.len(), 0.0);
    signal.with_samples(restored)
}

/// One step down in bit depth, per [`Dtype::bits`], then back up to the
/// original dtype's scale — the quantization noise the evaluation harness
/// measures robustness against.
fn step_down(dtype: Dtype) -> Dtype {
    match dtype {
        Dtype::I32 => Dtype::I16,
        Dtype::F32 => Dtype::I16,
        Dtype::I16 => Dtype::U8,
        Dtype::U8 => Dtype::U8,
        Dtype::I64 => Dtype::I32,
        Dtype::F64 => Dtype::F32,
        Dtype::F16 => Dtype::U8,
    }
}

fn quantization_downgrade(signal: &Signal) -> Signal {
    let lower = step_down(signal.dtype());
    let down = to_dtype(signal.samples(), signal.dtype(), lower);
    let back = to_dtype(&down, lower, signal.dtype());
    signal.with_samples(back)
}

/// Centers, normalizes, and adds zero-mean Gaussian noise scaled to hit
/// `wanted_snr_db` against the normalized signal's own power
/// (`audio_utils.py`'s `add_normalized_noise`), then rescales to the
/// signal's native dtype range so it can still be decoded.
fn add_normalized_noise(signal: &Signal, wanted_snr_db: f64) -> Signal {
    let x = signal.samples();
    if x.is_empty() {
        return signal.clone();
    }
    let mean = x.iter().sum::<f64>() / x.len() as f64;
    let centered: Vec<f64> = x.iter().map(|&v| v - mean).collect();
    let max_abs = centered.iter().fold(0.0f64, |m, &v| m.max(v.abs()));
    let normalized: Vec<f64> =
        if max_abs != 0.0 { centered.iter().map(|&v| v / max_abs).collect() } else { centered };

    let avg_power = normalized.iter().map(|v| v * v).sum::<f64>() / normalized.len() as f64;
    let avg_db = 10.0 * avg_power.log10();
    let noise_power = 10f64.powf((avg_db - wanted_snr_db) / 10.0);

    let mut rng = StdRng::from_entropy();
    let std_dev = noise_power.sqrt();
    let noisy: Vec<f64> = normalized.iter().map(|&v| v + gaussian(&mut rng, std_dev)).collect();

    let scaled = to_dtype(&noisy, Dtype::F64, signal.dtype());
    signal.with_samples(scaled)
}

/// Standard Box-Muller transform: one `N(0, std_dev^2)` sample from two
/// uniform draws (no `rand_distr` dependency needed for a single use site).
fn gaussian(rng: &mut StdRng, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    let r = (-2.0 * u1.ln()).sqrt();
    r * (2.0 * std::f64::consts::PI * u2).cos() * std_dev
}

/// Second-order Butterworth low/high-pass, applied forward then backward
/// (zero phase), via the standard bilinear-transform biquad design.
fn butterworth(signal: &Signal, cutoff_hz: f64, high_pass: bool) -> Signal {
    let x = signal.samples();
    if x.len() < 4 {
        return signal.clone();
    }
    let (b, a) = biquad_coeffs(cutoff_hz, signal.sample_rate() as f64, high_pass);
    let forward = apply_biquad(x, &b, &a);
    let mut backward: Vec<f64> = forward.iter().rev().copied().collect();
    backward = apply_biquad(&backward, &b, &a);
    backward.reverse();
    signal.with_samples(backward)
}

fn biquad_coeffs(cutoff_hz: f64, sample_rate: f64, high_pass: bool) -> ([f64; 3], [f64; 3]) {
    let nyquist = sample_rate / 2.0;
    let wc = (std::f64::consts::PI * (cutoff_hz / nyquist).clamp(1e-6, 0.999)).tan();
    let q = std::f64::consts::FRAC_1_SQRT_2;
    let k2 = wc * wc;
    let norm = 1.0 / (1.0 + wc / q + k2);

    if high_pass {
        let b0 = 1.0 * norm;
        let b1 = -2.0 * norm;
        let b2 = 1.0 * norm;
        let a1 = 2.0 * (k2 - 1.0) * norm;
        let a2 = (1.0 - wc / q + k2) * norm;
        ([b0, b1, b2], [1.0, a1, a2])
    } else {
        let b0 = k2 * norm;
        let b1 = 2.0 * k2 * norm;
        let b2 = k2 * norm;
        let a1 = 2.0 * (k2 - 1.0) * norm;
        let a2 = (1.0 - wc / q + k2) * norm;
        ([b0, b1, b2], [1.0, a1, a2])
    }
}

fn apply_biquad(x: &[f64], b: &[f64; 3], a: &[f64; 3]) -> Vec<f64> {
    let mut y = vec![0.0; x.len()];
    let (mut z1, mut z2) = (0.0, 0.0);
    for i in 0..x.len() {
        let input = x[i];
        let out = b[0] * input + z1;
        z1 = b[1] * input - a[1] * out + z2;
        z2 = b[2] * input - a[2] * out;
        y[i] = out;
    }
    y
}

/// Round-trips `signal` through an external MP3 encoder/decoder
/// (`lame`) at `bitrate_kbps`, re-reading raw PCM afterward. Returns `None`
/// if `lame` is not on `PATH`; this is not a hard failure (§4.10).
fn mp3_round_trip(signal: &Signal, bitrate_kbps: u32) -> Option<Signal> {
    if which("lame").is_none() {
        log::warn!("mp3 modification skipped: `lame` binary not found on PATH");
        return None;
    }

    let pcm: Vec<u8> = signal
        .samples()
        .iter()
        .flat_map(|&v| (v.round() as i16).to_le_bytes())
        .collect();

    let encode = Command::new("lame")
        .args([
            "-r",
            "-s",
            &(signal.sample_rate() as f64 / 1000.0).to_string(),
            "--bitwidth",
            "16",
            "--signed",
            "--little-endian",
            "-m",
            "m",
            "-b",
            &bitrate_kbps.to_string(),
            "-",
            "-",
        ])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .ok()?;

    let mp3_bytes = pipe_through(encode, &pcm)?;

    let decode = Command::new("lame")
        .args(["--decode", "-x", "-t", "-", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .ok()?;

    let pcm_out = pipe_through(decode, &mp3_bytes)?;
    let samples: Vec<f64> = pcm_out
        .chunks_exact(2)
        .map(|c| i16::from_le_bytes([c[0], c[1]]) as f64)
        .collect();

    Some(signal.with_samples(samples))
}

fn pipe_through(mut child: std::process::Child, input: &[u8]) -> Option<Vec<u8>> {
    child.stdin.take()?.write_all(input).ok()?;
    let output = child.wait_with_output().ok()?;
    if output.status.success() {
        Some(output.stdout)
    } else {
        None
    }
}

fn which(binary: &str) -> Option<()> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path).find(|dir| dir.join(binary).is_file()).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cover(n: usize) -> Signal {
        let samples: Vec<f64> = (0..n).map(|i| ((i as f64 * 0.05).sin() * 10000.0).round()).collect();
        Signal::new(samples, Dtype::I16, 44100)
    }

    #[test]
    fn resample_round_trip_preserves_length() {
        let c = cover(1000);
        let out = resample_round_trip(&c);
        assert_eq!(out.len(), c.len());
    }

    #[test]
    fn quantization_downgrade_preserves_dtype() {
        let c = cover(256);
        let out = quantization_downgrade(&c);
        assert_eq!(out.dtype(), Dtype::I16);
        assert_eq!(out.len(), c.len());
    }

    #[test]
    fn additive_noise_preserves_length_and_dtype() {
        let c = cover(512);
        let out = add_normalized_noise(&c, 10.0);
        assert_eq!(out.len(), c.len());
        assert_eq!(out.dtype(), Dtype::I16);
    }

    #[test]
    fn butterworth_preserves_length() {
        let c = cover(2048);
        let out = butterworth(&c, c.sample_rate() as f64 / 4.0, false);
        assert_eq!(out.len(), c.len());
    }

    #[test]
    fn sequence_includes_identity_first() {
        let seq = Modification::sequence(false);
        assert!(matches!(seq[0], Modification::Identity));
    }
}

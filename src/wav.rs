//! Reads and writes WAV files, bridging `hound`'s format model to this
//! crate's [`Dtype`] and reducing multi-channel input to channel 0 (§6,
//! §10.8 — an external collaborator in the distilled design, implemented
//! here because a usable CLI needs one).

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::dtype::{to_dtype, Dtype};
use crate::error::{Result, StegoError};
use crate::signal::Signal;

/// Reads a WAV file's first channel as a [`Signal`] at the file's native
/// dtype scale.
pub fn read_wav(path: &str) -> Result<Signal> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;
    let dtype = dtype_of(&spec)?;

    let samples: Vec<f64> = match spec.sample_format {
        SampleFormat::Int => reader
            .samples::<i32>()
            .step_by(channels)
            .map(|s| s.map(|v| v as f64).map_err(StegoError::from))
            .collect::<Result<Vec<f64>>>()?,
        SampleFormat::Float => reader
            .samples::<f32>()
            .step_by(channels)
            .map(|s| s.map(|v| v as f64).map_err(StegoError::from))
            .collect::<Result<Vec<f64>>>()?,
    };

    Ok(Signal::new(samples, dtype, spec.sample_rate))
}

/// Writes `signal` to `path` as a single-channel PCM/IEEE-float WAV file,
/// in its own dtype.
pub fn write_wav(path: &str, signal: &Signal) -> Result<()> {
    let spec = wav_spec_of(signal.dtype(), signal.sample_rate())?;
    let mut writer = WavWriter::create(path, spec)?;

    match spec.sample_format {
        SampleFormat::Int => {
            for &s in signal.samples() {
                writer.write_sample(s.round() as i32)?;
            }
        }
        SampleFormat::Float => {
            for &s in signal.samples() {
                writer.write_sample(s as f32)?;
            }
        }
    }
    writer.finalize()?;
    Ok(())
}

fn dtype_of(spec: &WavSpec) -> Result<Dtype> {
    match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 8) => Ok(Dtype::U8),
        (SampleFormat::Int, 16) => Ok(Dtype::I16),
        (SampleFormat::Int, 32) => Ok(Dtype::I32),
        (SampleFormat::Float, 32) => Ok(Dtype::F32),
        (fmt, bits) => Err(StegoError::WavReadError(format!(
            "unsupported WAV sample format: {fmt:?} at {bits} bits per sample"
        ))),
    }
}

fn wav_spec_of(dtype: Dtype, sample_rate: u32) -> Result<WavSpec> {
    let (bits_per_sample, sample_format) = match dtype {
        Dtype::U8 => (8, SampleFormat::Int),
        Dtype::I16 => (16, SampleFormat::Int),
        Dtype::I32 => (32, SampleFormat::Int),
        Dtype::F32 => (32, SampleFormat::Float),
        Dtype::F64 | Dtype::F16 | Dtype::I64 => {
            return Err(StegoError::WavReadError(format!(
                "{dtype} has no WAV container representation"
            )));
        }
    };
    Ok(WavSpec { channels: 1, sample_rate, bits_per_sample, sample_format })
}

/// Rescales `signal` to `to`'s native range without changing its dtype tag,
/// used when a method requires a specific working dtype before falling
/// back to the cover's own dtype on write.
pub fn rescale(signal: &Signal, to: Dtype) -> Signal {
    let rescaled = to_dtype(signal.samples(), signal.dtype(), to);
    Signal::new(rescaled, to, signal.sample_rate())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wav_spec_rejects_f64() {
        assert!(wav_spec_of(Dtype::F64, 44100).is_err());
    }

    #[test]
    fn wav_spec_accepts_i16() {
        let spec = wav_spec_of(Dtype::I16, 44100).unwrap();
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.channels, 1);
    }

    #[test]
    fn round_trips_i16_through_tempfile() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("stego_wav_test_{}.wav", std::process::id()));
        let path_str = path.to_str().unwrap();

        let samples: Vec<f64> = (0..32).map(|i| (i as f64 * 100.0) - 1600.0).collect();
        let signal = Signal::new(samples.clone(), Dtype::I16, 8000);
        write_wav(path_str, &signal).unwrap();
        let back = read_wav(path_str).unwrap();

        assert_eq!(back.dtype(), Dtype::I16);
        assert_eq!(back.sample_rate(), 8000);
        assert_eq!(back.samples(), samples.as_slice());

        let _ = std::fs::remove_file(path);
    }
}

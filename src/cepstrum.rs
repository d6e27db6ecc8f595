//! Cepstral analysis used by the echo-hiding decoders to find the delay
//! that was used to embed each bit.

use num_complex::Complex64;
use realfft::RealFftPlanner;
use rustfft::FftPlanner;

/// The real cepstrum of `x`: `irfft(log(abs(rfft(x))))` (`echo_single.py`,
/// `echo_bf.py`'s pre-squared form).
pub fn real_cepstrum(x: &[f64]) -> Vec<f64> {
    real_cepstrum_of_spectrum(x, false)
}

/// The real *power* cepstrum of `x`: `irfft(log(abs(rfft(x)))**2)`
/// (`echo_bf.py`, prior to autocorrelation).
pub fn real_power_cepstrum(x: &[f64]) -> Vec<f64> {
    real_cepstrum_of_spectrum(x, true)
}

fn real_cepstrum_of_spectrum(x: &[f64], squared: bool) -> Vec<f64> {
    let n = x.len();
    if n == 0 {
        return Vec::new();
    }
    let mut planner = RealFftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);
    let mut input = x.to_vec();
    let mut spectrum = fft.make_output_vec();
    fft.process(&mut input, &mut spectrum).expect("real_cepstrum forward fft");

    let mut log_mag: Vec<Complex64> = spectrum
        .iter()
        .map(|c| {
            let m = c.norm().ln();
            Complex64::new(if squared { m * m } else { m }, 0.0)
        })
        .collect();

    let ifft = planner.plan_fft_inverse(n);
    let mut out = ifft.make_output_vec();
    ifft.process(&mut log_mag, &mut out).expect("real_cepstrum inverse fft");
    let scale = 1.0 / n as f64;
    out.iter().map(|&v| v * scale).collect()
}

/// The power cepstrum of `x` computed via a full complex FFT rather than a
/// real-optimized one: `ifft(log(abs(fft(x)))**2).real`
/// (`echo_bipolar.py`, `echo_bipolar_bf.py`).
pub fn complex_power_cepstrum(x: &[f64]) -> Vec<f64> {
    let n = x.len();
    if n == 0 {
        return Vec::new();
    }
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);
    let mut buf: Vec<Complex64> = x.iter().map(|&v| Complex64::new(v, 0.0)).collect();
    fft.process(&mut buf);

    let mut log_mag: Vec<Complex64> =
        buf.iter().map(|c| Complex64::new(c.norm().ln().powi(2), 0.0)).collect();

    let ifft = planner.plan_fft_inverse(n);
    ifft.process(&mut log_mag);
    let scale = 1.0 / n as f64;
    log_mag.iter().map(|c| c.re * scale).collect()
}

/// Non-negative-lag autocorrelation of `x`, `ac[k] = sum_i x[i] * x[i+k]`
/// for `k` in `0..x.len()` (`scipy.signal.correlate(x, x, 'full')` sliced to
/// its second half in `autocorr_scipy_correlate`), computed via FFT with
/// zero-padding to avoid circular wraparound.
pub fn autocorrelate(x: &[f64]) -> Vec<f64> {
    let n = x.len();
    if n == 0 {
        return Vec::new();
    }
    let padded_len = 2 * n;
    let mut planner = RealFftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(padded_len);
    let mut input = vec![0.0f64; padded_len];
    input[..n].copy_from_slice(x);
    let mut spectrum = fft.make_output_vec();
    fft.process(&mut input, &mut spectrum).expect("autocorrelate forward fft");

    let mut power: Vec<Complex64> = spectrum.iter().map(|c| *c * c.conj()).collect();

    let ifft = planner.plan_fft_inverse(padded_len);
    let mut out = ifft.make_output_vec();
    ifft.process(&mut power, &mut out).expect("autocorrelate inverse fft");
    let scale = 1.0 / padded_len as f64;
    out.truncate(n);
    out.iter().map(|&v| v * scale).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn autocorrelate_peaks_at_zero_lag_for_white_noise_like_signal() {
        let x: Vec<f64> = (0..64).map(|i| ((i * 7) % 11) as f64 - 5.0).collect();
        let ac = autocorrelate(&x);
        let peak_idx = ac
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak_idx, 0);
    }

    #[test]
    fn real_cepstrum_is_deterministic_and_right_length() {
        let x: Vec<f64> = (0..32).map(|i| (i as f64).sin()).collect();
        let c1 = real_cepstrum(&x);
        let c2 = real_cepstrum(&x);
        assert_eq!(c1.len(), 32);
        assert_eq!(c1, c2);
    }

    #[test]
    fn complex_power_cepstrum_right_length() {
        let x: Vec<f64> = (0..17).map(|i| i as f64 * 0.1).collect();
        assert_eq!(complex_power_cepstrum(&x).len(), 17);
    }
}

//! Signal-quality and bit-error statistics used to score every method.

/// Centers and normalizes `x` to `[-1, 1]`, the pre-processing every
/// statistic below applies before comparing two signals.
fn center_normalize(x: &[f64]) -> Vec<f64> {
    if x.is_empty() {
        return Vec::new();
    }
    let mean = x.iter().sum::<f64>() / x.len() as f64;
    let centered: Vec<f64> = x.iter().map(|&v| v - mean).collect();
    let max_abs = centered.iter().fold(0.0f64, |m, &v| m.max(v.abs()));
    if max_abs != 0.0 {
        centered.iter().map(|&v| v / max_abs).collect()
    } else {
        centered
    }
}

/// Mean squared error between `x` and `y` after each is independently
/// centered and normalized, truncated to their common length
/// (`stat_utils.py`'s `mse`).
pub fn mse(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n == 0 {
        return 0.0;
    }
    let xs = center_normalize(&x[..n]);
    let ys = center_normalize(&y[..n]);
    xs.iter().zip(&ys).map(|(a, b)| (a - b).powi(2)).sum::<f64>() / n as f64
}

/// Root mean squared deviation: `sqrt(mse(x, y))`.
pub fn rmsd(x: &[f64], y: &[f64]) -> f64 {
    mse(x, y).sqrt()
}

/// Signal-to-noise ratio in decibels, in the same centered/normalized
/// space `mse` uses.
pub fn snr_db(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n == 0 {
        return f64::NAN;
    }
    let xs = center_normalize(&x[..n]);
    let ys = center_normalize(&y[..n]);
    let signal_power: f64 = xs.iter().map(|v| v.powi(2)).sum();
    let noise_power: f64 = xs.iter().zip(&ys).map(|(a, b)| (a - b).powi(2)).sum();
    10.0 * (signal_power / noise_power).log10()
}

/// Peak signal-to-noise ratio in decibels: `10 * log10(1 / mse(x, y))`.
pub fn psnr_db(x: &[f64], y: &[f64]) -> f64 {
    10.0 * (1.0 / mse(x, y)).log10()
}

/// Percentage of differing elements between `x` and `y`, truncated to
/// their common length. Intended for bit arrays but works on any `PartialEq`
/// element type.
pub fn ber_percent<T: PartialEq>(x: &[T], y: &[T]) -> f64 {
    let n = x.len().min(y.len());
    if n == 0 {
        return 0.0;
    }
    let mismatches = x[..n].iter().zip(&y[..n]).filter(|(a, b)| a != b).count();
    mismatches as f64 / n as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_signals_have_zero_error() {
        let x = [0.1, -0.2, 0.3, 0.0];
        assert_eq!(mse(&x, &x), 0.0);
        assert_eq!(rmsd(&x, &x), 0.0);
        assert!(psnr_db(&x, &x).is_infinite());
    }

    #[test]
    fn ber_percent_counts_mismatches() {
        let a = [0u8, 1, 1, 0];
        let b = [0u8, 0, 1, 1];
        assert_eq!(ber_percent(&a, &b), 50.0);
    }

    #[test]
    fn all_zero_signal_normalizes_without_panicking() {
        let z = [0.0, 0.0, 0.0];
        assert_eq!(mse(&z, &z), 0.0);
    }
}

//! One evaluated `(dataset, category, file, method, params, modification)`
//! configuration and its metrics, serialized to CSV (§3 "EvalRow").

use serde::Serialize;

use crate::facade::StatBundle;

#[derive(Debug, Clone, Serialize)]
pub struct EvalRow {
    pub dataset: String,
    pub category: String,
    pub file: String,
    pub method: String,
    pub params: String,
    pub secret_bits: usize,
    pub modification: String,
    pub ber_percent: f64,
    pub snr_db: f64,
    pub psnr_db: f64,
    pub mse: f64,
    pub rmsd: f64,
    pub time_to_encode_secs: f64,
    pub time_to_decode_secs: f64,
}

impl EvalRow {
    /// A successful measurement row.
    #[allow(clippy::too_many_arguments)]
    pub fn measured(
        dataset: &str,
        category: &str,
        file: &str,
        method: &str,
        params: &str,
        secret_bits: usize,
        modification: &str,
        stats: &StatBundle,
        time_to_encode_secs: f64,
        time_to_decode_secs: f64,
    ) -> Self {
        EvalRow {
            dataset: dataset.to_string(),
            category: category.to_string(),
            file: file.to_string(),
            method: method.to_string(),
            params: params.to_string(),
            secret_bits,
            modification: modification.to_string(),
            ber_percent: stats.ber_percent,
            snr_db: stats.snr_db,
            psnr_db: stats.psnr_db,
            mse: stats.mse,
            rmsd: stats.rmsd,
            time_to_encode_secs,
            time_to_decode_secs,
        }
    }

    /// A `SecretTooLarge` row: NaN metrics, infinite timings
    /// (`evaluate_method.py`'s capacity-failure row).
    pub fn capacity_failure(dataset: &str, category: &str, file: &str, method: &str, params: &str, secret_bits: usize) -> Self {
        EvalRow {
            dataset: dataset.to_string(),
            category: category.to_string(),
            file: file.to_string(),
            method: method.to_string(),
            params: params.to_string(),
            secret_bits,
            modification: "n/a".to_string(),
            ber_percent: f64::NAN,
            snr_db: f64::NAN,
            psnr_db: f64::NAN,
            mse: f64::NAN,
            rmsd: f64::NAN,
            time_to_encode_secs: f64::INFINITY,
            time_to_decode_secs: f64::INFINITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_failure_row_has_infinite_timings() {
        let row = EvalRow::capacity_failure("d", "c", "f.wav", "lsb", "{}", 16);
        assert!(row.time_to_encode_secs.is_infinite());
        assert!(row.ber_percent.is_nan());
    }
}

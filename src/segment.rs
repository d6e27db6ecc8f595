//! Segment splitters shared by every method that chops a signal into
//! per-bit chunks (`audio_utils.py`'s `split_to_*` family).

/// Rounds half to even, matching Python's `round()` — only matters at exact
/// `.5` ties, which the segment-length arithmetic below can hit.
fn round_half_even(x: f64) -> f64 {
    let floor = x.floor();
    let diff = x - floor;
    if diff < 0.5 {
        floor
    } else if diff > 0.5 {
        floor + 1.0
    } else if (floor as i64) % 2 == 0 {
        floor
    } else {
        floor + 1.0
    }
}

/// NumPy's `array_split`: divides `input` into `n` parts whose lengths
/// differ by at most one, with the longer parts first.
fn array_split(input: &[f64], n: usize) -> Vec<Vec<f64>> {
    let len = input.len();
    let each = len / n;
    let extras = len % n;
    let mut out = Vec::with_capacity(n);
    let mut pos = 0;
    for i in 0..n {
        let size = if i < extras { each + 1 } else { each };
        out.push(input[pos..pos + size].to_vec());
        pos += size;
    }
    out
}

/// Splits `input` into `n` segments of approximately equal length; the last
/// segment is `round(len/n)` samples taken from the end, which may overlap
/// the tail of the second-to-last segment produced by plain `array_split`.
pub fn split_to_n_approx_same(input: &[f64], n: usize) -> Vec<Vec<f64>> {
    let mut parts = array_split(input, n);
    parts.pop();
    let tail_len = round_half_even(input.len() as f64 / n as f64) as usize;
    let tail_len = tail_len.min(input.len());
    parts.push(input[input.len() - tail_len..].to_vec());
    parts
}

/// Splits `input` into `n` segments of equal length, except the last, which
/// absorbs whatever remains after dividing by `n - 1`.
pub fn split_to_n_same_except_last(input: &[f64], n: usize) -> Vec<Vec<f64>> {
    if input.is_empty() {
        return vec![Vec::new()];
    }
    let k = input.len() / (n - 1);
    let head_len = k * (n - 1);
    let mut parts = array_split(&input[..head_len], n - 1);
    parts.push(input[head_len..].to_vec());
    parts
}

/// Splits `input` into exactly `n` equal-length segments, returning the
/// segments and whatever remainder didn't fit evenly.
pub fn split_to_n_segments(input: &[f64], n: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
    if n == 0 {
        return (Vec::new(), input.to_vec());
    }
    let k = input.len() / n;
    let head_len = k * n;
    (array_split(&input[..head_len], n), input[head_len..].to_vec())
}

/// Splits `input` into segments of approximately length `n` (the last may
/// be shorter), using `ceil(len/n)` equally-sized `array_split` parts.
pub fn split_to_segments_of_approx_len_n(input: &[f64], n: usize) -> Vec<Vec<f64>> {
    if input.is_empty() {
        return vec![Vec::new()];
    }
    let sections = (input.len() as f64 / n as f64).ceil() as usize;
    array_split(input, sections.max(1))
}

/// Splits `input` into segments of exactly length `n`, the last one
/// possibly shorter — a plain chunking, no rebalancing.
pub fn split_to_segments_of_len_n_except_last(input: &[f64], n: usize) -> Vec<Vec<f64>> {
    if input.is_empty() {
        return vec![Vec::new()];
    }
    input.chunks(n).map(|c| c.to_vec()).collect()
}

/// Splits `input` into segments of exactly length `n`, returning the
/// segments and the remainder that didn't fill a whole segment.
pub fn split_to_segments_of_len_n(input: &[f64], n: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
    if input.is_empty() {
        return (Vec::new(), Vec::new());
    }
    let k = input.len() / n;
    let head_len = k * n;
    (input[..head_len].chunks(n).map(|c| c.to_vec()).collect(), input[head_len..].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_split_matches_numpy_shape() {
        let v: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let parts = array_split(&v, 3);
        assert_eq!(parts.iter().map(|p| p.len()).collect::<Vec<_>>(), vec![4, 3, 3]);
    }

    #[test]
    fn n_segments_splits_evenly_with_rest() {
        let v: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let (segs, rest) = split_to_n_segments(&v, 3);
        assert_eq!(segs.len(), 3);
        assert!(segs.iter().all(|s| s.len() == 3));
        assert_eq!(rest, vec![9.0]);
    }

    #[test]
    fn len_n_except_last_chunks_plainly() {
        let v: Vec<f64> = (0..7).map(|i| i as f64).collect();
        let segs = split_to_segments_of_len_n_except_last(&v, 3);
        assert_eq!(segs, vec![vec![0.0, 1.0, 2.0], vec![3.0, 4.0, 5.0], vec![6.0]]);
    }

    #[test]
    fn empty_input_yields_single_empty_segment() {
        assert_eq!(split_to_segments_of_approx_len_n(&[], 4), vec![Vec::<f64>::new()]);
    }
}

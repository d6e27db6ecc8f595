//! Delay-search strategies shared by the four echo-hiding methods: given a
//! BER fitness probe (round-trip encode + decode at a candidate `(d0, d1)`),
//! search for a pair that decodes cleanly.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Scans `d0' in [d0, d0+10)`, `d1' in [d1, d1+30)` with `d0' < d1'`,
/// returning the first candidate with zero BER, or else the candidate with
/// the lowest BER seen (`echo_base.py`'s bruteforce delay search).
pub fn bruteforce_search(d0: usize, d1: usize, mut trial: impl FnMut(usize, usize) -> f64) -> (usize, usize, f64) {
    let mut best = (d0, d1, f64::INFINITY);
    for d0p in d0..d0 + 10 {
        for d1p in d1..d1 + 30 {
            if d0p >= d1p {
                continue;
            }
            let ber = trial(d0p, d1p);
            if ber == 0.0 {
                return (d0p, d1p, 0.0);
            }
            if ber < best.2 {
                best = (d0p, d1p, ber);
            }
        }
    }
    best
}

/// Basin-hopping search over integer `(d0', d1')`: each of up to `niter`
/// iterations perturbs the current best candidate's coordinates by up to
/// `±10` (clamped to stay positive and keep `d0' < d1'`), accepting the
/// perturbation only if its BER improves on the current best. Stops early
/// on zero BER (`echo_base.py`'s basinhopping delay search).
pub fn basinhopping_search(
    d0: usize,
    d1: usize,
    niter: usize,
    mut trial: impl FnMut(usize, usize) -> f64,
) -> (usize, usize, f64) {
    let mut rng = StdRng::from_entropy();
    let mut best = (d0, d1, trial(d0, d1));
    if best.2 == 0.0 {
        return best;
    }

    for _ in 0..niter {
        let step = |rng: &mut StdRng, v: usize| -> usize {
            let delta: i64 = rng.gen_range(-10..=10);
            (v as i64 + delta).max(1) as usize
        };
        let mut d0p = step(&mut rng, best.0);
        let mut d1p = step(&mut rng, best.1);
        if d0p >= d1p {
            std::mem::swap(&mut d0p, &mut d1p);
            if d0p == d1p {
                d1p += 1;
            }
        }

        let ber = trial(d0p, d1p);
        if ber < best.2 {
            best = (d0p, d1p, ber);
            if ber == 0.0 {
                break;
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bruteforce_finds_exact_match() {
        let (d0, d1, ber) = bruteforce_search(100, 200, |a, b| if a == 105 && b == 215 { 0.0 } else { 1.0 });
        assert_eq!((d0, d1), (105, 215));
        assert_eq!(ber, 0.0);
    }

    #[test]
    fn bruteforce_falls_back_to_best_seen() {
        let (_, _, ber) = bruteforce_search(100, 200, |a, b| ((a + b) % 7) as f64);
        assert!(ber.is_finite());
    }

    #[test]
    fn basinhopping_terminates_and_improves() {
        let (_, _, ber) = basinhopping_search(100, 200, 20, |a, b| {
            let target_a = 103usize;
            let target_b = 207usize;
            (a.abs_diff(target_a) + b.abs_diff(target_b)) as f64
        });
        assert!(ber.is_finite());
    }
}

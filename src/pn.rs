//! Deterministic pseudo-noise sequence generation for DSSS.

use rand::RngCore;
use rand_mt::Mt19937GenRand32;
use sha2::{Digest, Sha256};

/// Generates `len` values of `{-1, +1}`, deterministic in `password`: the
/// password is hashed with SHA-256 and the first four little-endian `u32`
/// words of the digest seed a Mersenne Twister (§4.1 "PN sequence" — the
/// remaining 16 digest bytes are discarded, the bit stream is not required
/// to match the Python original's `random.Random(hash.digest())`, only to
/// be reproducible for a given password, per Testable Property 6).
pub fn pn_sequence(password: &str, len: usize) -> Vec<f64> {
    let digest = Sha256::digest(password.as_bytes());
    let key: Vec<u32> = digest[..16]
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    let mut rng = Mt19937GenRand32::new_with_key(key);
    (0..len).map(|_| if rng.next_u32() & 1 == 0 { -1.0 } else { 1.0 }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_password_gives_same_sequence() {
        let a = pn_sequence("hunter2", 64);
        let b = pn_sequence("hunter2", 64);
        assert_eq!(a, b);
    }

    #[test]
    fn different_password_gives_different_sequence() {
        let a = pn_sequence("hunter2", 64);
        let b = pn_sequence("hunter3", 64);
        assert_ne!(a, b);
    }

    #[test]
    fn only_emits_plus_or_minus_one() {
        let a = pn_sequence("x", 32);
        assert!(a.iter().all(|&v| v == -1.0 || v == 1.0));
    }
}

//! Random prime generation for building test keys.

use num::Integer;
use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use rand::Rng;

const ROUNDS: u32 = 20;

pub fn miller_rabin<R: Rng>(rng: &mut R, n: &BigUint, rounds: u32) -> bool {
    let two = BigUint::from(2u32);
    if *n < two {
        return false;
    }
    if *n < BigUint::from(4u32) {
        return true;
    }
    if n.is_even() {
        return false;
    }
    let n_minus_one: BigUint = n - 1u32;
    let mut d = n_minus_one.clone();
    let mut s = 0u32;
    while d.is_even() {
        d >>= 1usize;
        s += 1;
    }
    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&two, &n_minus_one);
        let mut x = a.modpow(&d, n);
        if x.is_one() || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Random prime with exactly `bits` bits.
pub fn generate_prime<R: Rng>(rng: &mut R, bits: u64) -> BigUint {
    loop {
        let mut candidate = rng.gen_biguint(bits);
        candidate.set_bit(bits - 1, true);
        candidate.set_bit(0, true);
        if miller_rabin(rng, &candidate, ROUNDS) {
            return candidate;
        }
    }
}

/// Smallest prime `>= from`.
pub fn next_prime(from: &BigUint) -> BigUint {
    let mut rng = rand::thread_rng();
    let mut candidate = from.clone();
    if candidate.is_even() && candidate != BigUint::from(2u32) {
        candidate += 1u32;
    }
    while !miller_rabin(&mut rng, &candidate, ROUNDS) {
        candidate += 2u32;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_miller_rabin() {
        let mut rng = StdRng::seed_from_u64(1);
        let primes: Vec<u32> = (0xffffff00u32..0xffffffffu32)
            .filter(|x| miller_rabin(&mut rng, &BigUint::from(*x), ROUNDS))
            .collect();
        assert_eq!(primes, vec![0xffffff2f, 0xffffff47, 0xffffff67, 0xffffff79, 0xffffff95, 0xffffff9d, 0xffffffbf, 0xffffffef, 0xfffffffb]);
        assert!(!miller_rabin(&mut rng, &BigUint::from(561u32), ROUNDS));
    }

    #[test]
    fn test_generate_prime_has_requested_size() {
        let mut rng = StdRng::seed_from_u64(2);
        let p = generate_prime(&mut rng, 96);
        assert_eq!(p.bits(), 96);
        assert_eq!(next_prime(&BigUint::from(1_000_000u32)), BigUint::from(1_000_003u32));
    }
}

use num_bigint::BigUint;
use num_traits::Zero;

use crate::rsa::error::{RecoverError, Result};
use crate::rsa::keys::PrivateKey;
use crate::rsa::math::{euler, mod_reverse};

/// How the two primes are arranged before encoding.
///
/// PKCS#1 itself accepts either order; OpenSSL and most libraries emit the
/// larger prime first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimeOrder {
    #[default]
    Descending,
    AsGiven,
}

/// `e^-1 mod (p-1)*(q-1)`.
pub fn derive_private(p: &BigUint, q: &BigUint, e: &BigUint) -> Result<BigUint> {
    let phi = euler(p, q);
    mod_reverse(e, &phi).ok_or_else(|| RecoverError::NotInvertible { e: e.clone() })
}

pub fn normalize_order(p: BigUint, q: BigUint) -> (BigUint, BigUint) {
    if p < q {
        (q, p)
    } else {
        (p, q)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crt {
    pub dp: BigUint,
    pub dq: BigUint,
    pub qinv: BigUint,
}

/// CRT exponents and coefficient; `p` and `q` must be distinct primes.
pub fn derive_crt(p: &BigUint, q: &BigUint, d: &BigUint) -> Result<Crt> {
    let qinv = mod_reverse(q, p).ok_or(RecoverError::EqualFactors)?;
    Ok(Crt { dp: d % (p - 1u32), dq: d % (q - 1u32), qinv })
}

pub fn compute_modulus(p: &BigUint, q: &BigUint) -> BigUint {
    p * q
}

/// Assembles a full private key from the modulus, exponent and primes.
pub fn build_private(n: &BigUint, e: &BigUint, p: BigUint, q: BigUint, order: PrimeOrder) -> Result<PrivateKey> {
    let (p, q) = match order {
        PrimeOrder::Descending => normalize_order(p, q),
        PrimeOrder::AsGiven => (p, q),
    };
    if p == q {
        return Err(RecoverError::EqualFactors);
    }
    if p <= BigUint::from(1u32) || q <= BigUint::from(1u32) {
        return Err(RecoverError::InvalidArguments("prime factors must be greater than 1".to_string()));
    }
    let product = compute_modulus(&p, &q);
    if product != *n {
        return Err(RecoverError::ModulusMismatch { n: n.clone(), product });
    }
    if e.is_zero() {
        return Err(RecoverError::NotInvertible { e: e.clone() });
    }
    let d = derive_private(&p, &q, e)?;
    let crt = derive_crt(&p, &q, &d)?;
    Ok(PrivateKey { n: n.clone(), e: e.clone(), d, p, q, dp: crt.dp, dq: crt.dq, qinv: crt.qinv })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsa::prime_gen::generate_prime;
    use num_traits::One;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn big(v: u64) -> BigUint {
        BigUint::from(v)
    }

    #[test]
    fn test_textbook_key() {
        assert_eq!(derive_private(&big(61), &big(53), &big(17)).unwrap(), big(2753));
        let key = build_private(&big(3233), &big(17), big(53), big(61), PrimeOrder::Descending).unwrap();
        assert_eq!((key.p.clone(), key.q.clone()), (big(61), big(53)));
        assert_eq!(key.d, big(2753));
        assert_eq!(key.dp, big(53));
        assert_eq!(key.dq, big(49));
        assert_eq!(key.qinv, big(38));
    }

    #[test]
    fn test_order_policy() {
        assert_eq!(normalize_order(big(5), big(7)), (big(7), big(5)));
        assert_eq!(normalize_order(big(7), big(5)), (big(7), big(5)));
        let key = build_private(&big(3233), &big(17), big(53), big(61), PrimeOrder::AsGiven).unwrap();
        assert_eq!((key.p, key.q), (big(53), big(61)));
        // qinv is now 61^-1 mod 53
        assert_eq!(key.qinv, big(20));
    }

    #[test]
    fn test_not_invertible() {
        // phi(7 * 11) = 60 shares 3 with e.
        let err = derive_private(&big(7), &big(11), &big(3)).unwrap_err();
        assert!(matches!(err, RecoverError::NotInvertible { .. }));
        assert!(matches!(
            build_private(&big(77), &big(65537 * 3), big(7), big(11), PrimeOrder::Descending),
            Err(RecoverError::NotInvertible { .. })
        ));
    }

    #[test]
    fn test_rejects_inconsistent_primes() {
        assert!(matches!(
            build_private(&big(49), &big(5), big(7), big(7), PrimeOrder::Descending),
            Err(RecoverError::EqualFactors)
        ));
        assert!(matches!(
            build_private(&big(36), &big(17), big(7), big(5), PrimeOrder::Descending),
            Err(RecoverError::ModulusMismatch { .. })
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn derived_exponent_inverts_e(seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let p = generate_prime(&mut rng, 64);
            let q = generate_prime(&mut rng, 64);
            prop_assume!(p != q);
            let e = big(65537);
            let phi = euler(&p, &q);
            match derive_private(&p, &q, &e) {
                Ok(d) => prop_assert!(((&d * &e) % &phi).is_one()),
                Err(RecoverError::NotInvertible { .. }) => prop_assert!(!num::Integer::gcd(&e, &phi).is_one()),
                Err(other) => prop_assert!(false, "unexpected error {}", other),
            }
        }

        #[test]
        fn crt_parameters_agree_with_d(seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let p = generate_prime(&mut rng, 48);
            let q = generate_prime(&mut rng, 40);
            let n = &p * &q;
            if let Ok(key) = build_private(&n, &big(3), p, q, PrimeOrder::Descending) {
                prop_assert_eq!(&key.dp, &(&key.d % (&key.p - 1u32)));
                prop_assert!(((&key.qinv * &key.q) % &key.p).is_one());
                let m = big(0xdead_beef);
                prop_assert_eq!(m.modpow(&key.e, &key.n).modpow(&key.d, &key.n), m);
            }
        }
    }
}

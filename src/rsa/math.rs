use num::Integer;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Zero};

/// Euler's totient of a two-prime modulus.
pub fn euler(p: &BigUint, q: &BigUint) -> BigUint {
    (p - 1u32) * (q - 1u32)
}

/// Returns `(g, x, y)` with `a*x + b*y == g == gcd(a, b)`.
pub fn extended_euclid(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    let (mut old_r, mut r) = (a.clone(), b.clone());
    let (mut old_x, mut x) = (BigInt::one(), BigInt::zero());
    let (mut old_y, mut y) = (BigInt::zero(), BigInt::one());
    while !r.is_zero() {
        let (quot, rem) = old_r.div_rem(&r);
        old_r = std::mem::replace(&mut r, rem);
        let next_x = &old_x - &quot * &x;
        old_x = std::mem::replace(&mut x, next_x);
        let next_y = &old_y - &quot * &y;
        old_y = std::mem::replace(&mut y, next_y);
    }
    (old_r, old_x, old_y)
}

/// Inverse of `a` modulo `m`, or `None` when they share a factor.
pub fn mod_reverse(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    if m.is_zero() {
        return None;
    }
    let m_signed = BigInt::from_biguint(Sign::Plus, m.clone());
    let (g, x, _) = extended_euclid(&BigInt::from_biguint(Sign::Plus, a.clone()), &m_signed);
    if !g.is_one() {
        return None;
    }
    x.mod_floor(&m_signed).to_biguint()
}

/// Exact square root of `x` if `x` is a perfect square.
pub fn exact_sqrt(x: &BigUint) -> Option<BigUint> {
    let root = x.sqrt();
    if &root * &root == *x {
        Some(root)
    } else {
        None
    }
}

/// Smallest `a` with `a * a >= x`.
pub fn ceil_sqrt(x: &BigUint) -> BigUint {
    let root = x.sqrt();
    if &root * &root < *x {
        root + 1u32
    } else {
        root
    }
}

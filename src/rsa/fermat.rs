use chrono::Local;
use crossbeam_channel::Receiver;
use num::Integer;
use num_bigint::BigUint;

use crate::rsa::error::{RecoverError, Result};
use crate::rsa::math::{ceil_sqrt, exact_sqrt};
use crate::rsa::progress::Progress;

/// Factors found by a search, `p >= q`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Factors {
    pub p: BigUint,
    pub q: BigUint,
    pub attempts: u64,
}

/// Fermat's factorization: walks `a` upward from `ceil(sqrt(n))` until
/// `a^2 - n` is a perfect square `b^2`, giving `n = (a + b)(a - b)`.
///
/// Fast when the two factors are close, unbounded otherwise. The stop
/// receiver is polled at every progress tick so callers can give up.
pub struct Fermat {
    interval: u64,
}

impl Fermat {
    pub fn new(interval: u64) -> Self {
        Self { interval: interval.max(1) }
    }

    pub fn factorize<T>(&self, n: &BigUint, progress: &dyn Progress, stop: &Receiver<T>) -> Result<Factors> {
        if *n < BigUint::from(4u32) {
            return Err(RecoverError::InvalidArguments(format!("n = {} is too small to factor", n)));
        }
        if n.is_even() {
            // n = 2 mod 4 is never a difference of squares.
            log::debug!("n is even, splitting off 2");
            return Ok(Factors { p: n >> 1usize, q: BigUint::from(2u32), attempts: 0 });
        }

        let start = Local::now();
        let mut attempts: u64 = 1;
        let mut a = ceil_sqrt(n);
        let mut b_sq = &a * &a - n;
        loop {
            if let Some(b) = exact_sqrt(&b_sq) {
                progress.done(attempts, Local::now() - start);
                return Ok(Factors { p: &a + &b, q: &a - &b, attempts });
            }
            // (a + 1)^2 - n = a^2 - n + 2a + 1
            b_sq += (&a << 1usize) + 1u32;
            a += 1u32;
            attempts += 1;
            if attempts % self.interval == 0 {
                progress.tick(attempts, Local::now() - start);
                if stop.try_recv().is_ok() {
                    progress.abandon(attempts, Local::now() - start);
                    return Err(RecoverError::Cancelled { attempts });
                }
            }
        }
    }
}

impl Default for Fermat {
    fn default() -> Self {
        Self::new(crate::rsa::config::CONFIG_DEF.progress_interval)
    }
}

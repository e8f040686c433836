use std::time::{Duration, Instant};

use crossbeam_channel::{after, never, Receiver};
use num::Integer;
use num_bigint::BigUint;
use num_traits::Zero;

use crate::rsa::error::{RecoverError, Result};
use crate::rsa::fermat::Fermat;
use crate::rsa::keys::{KeyMaterial, PublicKey};
use crate::rsa::lookup::{FactorLookup, LookupOutcome};
use crate::rsa::params::{build_private, compute_modulus, PrimeOrder};
use crate::rsa::progress::{NoProgress, Progress};

/// Parameters supplied by the user; any of `p`, `q`, `n` may be missing.
#[derive(Debug, Clone)]
pub struct Known {
    pub p: Option<BigUint>,
    pub q: Option<BigUint>,
    pub n: Option<BigUint>,
    pub e: BigUint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Factored { n: BigUint, p: BigUint, q: BigUint },
    ModulusOnly(BigUint),
}

impl Resolved {
    pub fn modulus(&self) -> &BigUint {
        match self {
            Resolved::Factored { n, .. } | Resolved::ModulusOnly(n) => n,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Want {
    Public,
    Private,
}

fn divide(n: &BigUint, divisor: &BigUint) -> Result<BigUint> {
    if divisor.is_zero() {
        return Err(RecoverError::NotDivisible { n: n.clone(), divisor: divisor.clone() });
    }
    let (quot, rem) = n.div_rem(divisor);
    if !rem.is_zero() {
        return Err(RecoverError::NotDivisible { n: n.clone(), divisor: divisor.clone() });
    }
    Ok(quot)
}

/// Fills in whichever of `p`, `q`, `n` can be derived from the others.
pub fn resolve(known: &Known) -> Result<Resolved> {
    match (&known.p, &known.q, &known.n) {
        (Some(p), Some(q), None) => Ok(Resolved::Factored { n: compute_modulus(p, q), p: p.clone(), q: q.clone() }),
        (Some(p), Some(q), Some(n)) => {
            let product = compute_modulus(p, q);
            if product != *n {
                return Err(RecoverError::ModulusMismatch { n: n.clone(), product });
            }
            Ok(Resolved::Factored { n: n.clone(), p: p.clone(), q: q.clone() })
        }
        (Some(p), None, Some(n)) => Ok(Resolved::Factored { n: n.clone(), p: p.clone(), q: divide(n, p)? }),
        (None, Some(q), Some(n)) => Ok(Resolved::Factored { n: n.clone(), p: divide(n, q)?, q: q.clone() }),
        (None, None, Some(n)) => Ok(Resolved::ModulusOnly(n.clone())),
        _ => Err(RecoverError::InvalidArguments(
            "invalid argument combination: provide n, n with p or q, p and q, or a key file".to_string(),
        )),
    }
}

/// Drives a recovery: remote lookup, optional Fermat fallback, key assembly.
pub struct Recovery {
    lookup: Option<Box<dyn FactorLookup>>,
    fermat: Option<Fermat>,
    stop: Receiver<Instant>,
    time_limit: Option<Duration>,
    progress: Box<dyn Progress>,
    order: PrimeOrder,
}

impl Default for Recovery {
    fn default() -> Self {
        Self {
            lookup: None,
            fermat: None,
            stop: never(),
            time_limit: None,
            progress: Box::new(NoProgress),
            order: PrimeOrder::default(),
        }
    }
}

impl Recovery {
    pub fn with_lookup(mut self, lookup: Box<dyn FactorLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Enables the local search once the lookup comes up empty.
    pub fn with_fallback(mut self, fermat: Fermat, stop: Receiver<Instant>) -> Self {
        self.fermat = Some(fermat);
        self.stop = stop;
        self
    }

    /// Gives the local search at most `limit`, counted from when it starts.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_progress(mut self, progress: Box<dyn Progress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_order(mut self, order: PrimeOrder) -> Self {
        self.order = order;
        self
    }

    /// Finds `(p, q)` for a bare modulus.
    pub fn factors_of(&self, n: &BigUint) -> Result<(BigUint, BigUint)> {
        let miss = match &self.lookup {
            Some(lookup) => {
                log::info!("Getting factors from {} ...", lookup.name());
                match lookup.lookup(n) {
                    Ok(LookupOutcome::Factors(p, q)) => return Ok((p, q)),
                    Ok(LookupOutcome::NotFactored(status)) => RecoverError::FactorsUnavailable(format!(
                        "factorization not found on {} (status {})",
                        lookup.name(),
                        status
                    )),
                    Ok(LookupOutcome::NotSemiprime) => {
                        RecoverError::FactorsUnavailable(format!("{} reports n is not a semiprime", lookup.name()))
                    }
                    Err(err) => err,
                }
            }
            None => RecoverError::FactorsUnavailable("remote lookup disabled".to_string()),
        };
        match &self.fermat {
            Some(fermat) => {
                log::info!("{}", miss);
                log::info!("Trying Fermat factorization ...");
                let stop = match self.time_limit {
                    Some(limit) => after(limit),
                    None => self.stop.clone(),
                };
                let found = fermat.factorize(n, self.progress.as_ref(), &stop)?;
                log::info!("Found factors after {} attempts", found.attempts);
                Ok((found.p, found.q))
            }
            None => Err(miss),
        }
    }

    pub fn recover(&self, known: &Known, want: Want) -> Result<KeyMaterial> {
        let resolved = resolve(known)?;
        if want == Want::Public {
            return Ok(KeyMaterial::Public(PublicKey { n: resolved.modulus().clone(), e: known.e.clone() }));
        }
        let (n, p, q) = match resolved {
            Resolved::Factored { n, p, q } => (n, p, q),
            Resolved::ModulusOnly(n) => {
                let (p, q) = self.factors_of(&n)?;
                (n, p, q)
            }
        };
        Ok(KeyMaterial::Private(build_private(&n, &known.e, p, q, self.order)?))
    }

    /// Re-emits or completes a key read from a file.
    pub fn from_key(&self, key: KeyMaterial, want: Want) -> Result<KeyMaterial> {
        match (key, want) {
            (key, Want::Public) => Ok(KeyMaterial::Public(key.public())),
            (KeyMaterial::Private(key), Want::Private) => Ok(KeyMaterial::Private(key)),
            (KeyMaterial::Public(key), Want::Private) => {
                let known = Known { p: None, q: None, n: Some(key.n), e: key.e };
                self.recover(&known, Want::Private)
            }
        }
    }
}

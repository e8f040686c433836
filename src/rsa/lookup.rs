use std::time::Duration;

use num_bigint::BigUint;
use serde::Deserialize;

use crate::rsa::error::{RecoverError, Result};
use crate::rsa::params::normalize_order;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Two prime factors, larger first.
    Factors(BigUint, BigUint),
    /// The service knows `n` but has no complete factorization; carries its status.
    NotFactored(String),
    /// `n` is prime or has more than two prime factors.
    NotSemiprime,
}

/// Source of known factorizations queried before any local search.
pub trait FactorLookup {
    fn name(&self) -> &str;
    fn lookup(&self, n: &BigUint) -> Result<LookupOutcome>;
}

/// factordb.com JSON API client.
pub struct FactorDb {
    agent: ureq::Agent,
    url: String,
}

impl FactorDb {
    pub fn new(url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent, url: url.to_string() }
    }
}

impl FactorLookup for FactorDb {
    fn name(&self) -> &str {
        "FactorDB"
    }

    fn lookup(&self, n: &BigUint) -> Result<LookupOutcome> {
        log::debug!("GET {}?query={}", self.url, n);
        let response = self.agent.get(&self.url).query("query", &n.to_string()).call().map_err(|err| match err {
            ureq::Error::Status(code, _) => RecoverError::LookupUnavailable(format!("HTTP status {}", code)),
            ureq::Error::Transport(transport) => RecoverError::LookupUnavailable(transport.to_string()),
        })?;
        let body = response.into_string().map_err(|e| RecoverError::LookupUnavailable(e.to_string()))?;
        parse_factordb(n, &body)
    }
}

#[derive(Debug, Deserialize)]
struct FactorDbResponse {
    status: String,
    factors: Vec<(String, Multiplicity)>,
}

// The API has returned multiplicities both as numbers and as strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Multiplicity {
    Number(u64),
    Text(String),
}

impl Multiplicity {
    fn value(&self) -> Result<u64> {
        match self {
            Multiplicity::Number(v) => Ok(*v),
            Multiplicity::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| RecoverError::LookupFormat(format!("multiplicity `{}` is not a number", s))),
        }
    }
}

/// Interprets a FactorDB reply for `n`. The service is untrusted: any
/// shape change, or factors that do not multiply back to `n`, is an error.
pub fn parse_factordb(n: &BigUint, body: &str) -> Result<LookupOutcome> {
    let response: FactorDbResponse =
        serde_json::from_str(body).map_err(|e| RecoverError::LookupFormat(format!("cannot parse reply: {}", e)))?;
    match response.status.as_str() {
        "FF" => {}
        "P" | "PRP" => return Ok(LookupOutcome::NotSemiprime),
        other => return Ok(LookupOutcome::NotFactored(other.to_string())),
    }

    if response.factors.is_empty() {
        return Err(RecoverError::LookupFormat("fully factored reply lists no factors".to_string()));
    }
    let mut primes = Vec::new();
    let mut total: u64 = 0;
    for (value, count) in &response.factors {
        let prime: BigUint = value
            .trim()
            .parse()
            .map_err(|_| RecoverError::LookupFormat(format!("factor `{}` is not a number", value)))?;
        let count = count.value()?;
        total = total.saturating_add(count);
        primes.extend(std::iter::repeat(prime).take(count.min(2) as usize));
    }
    if total != 2 {
        return Ok(LookupOutcome::NotSemiprime);
    }
    let product = primes.iter().fold(BigUint::from(1u32), |acc, f| acc * f);
    if product != *n {
        return Err(RecoverError::LookupFormat("factors do not multiply to n".to_string()));
    }
    match <[BigUint; 2]>::try_from(primes) {
        Ok([p, q]) => {
            let (p, q) = normalize_order(p, q);
            Ok(LookupOutcome::Factors(p, q))
        }
        Err(_) => Err(RecoverError::LookupFormat("factor list does not hold two primes".to_string())),
    }
}

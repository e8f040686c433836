use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use num::Num;
use num_bigint::BigUint;

pub mod config;
pub mod error;
pub mod fermat;
pub mod keys;
pub mod lookup;
pub mod math;
pub mod params;
#[cfg(test)]
pub mod prime_gen;
pub mod progress;
pub mod resolve;

use config::*;
use error::Result;
use fermat::Fermat;
use keys::*;
use lookup::FactorDb;
use params::PrimeOrder;
use resolve::{Known, Recovery, Want};

/// Parses a decimal or `0x`-prefixed hexadecimal integer.
pub fn parse_number(s: &str) -> std::result::Result<BigUint, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => BigUint::from_str_radix(hex, 16),
        None => BigUint::from_str_radix(s, 10),
    };
    parsed.map_err(|_| format!("`{}` is not a non-negative integer", s))
}

#[derive(Debug, Parser)]
#[clap(version, about = "Generate an RSA private key from its public key, n, or p and q")]
pub struct RSA {
    #[clap(short, long, value_name = "PATH", help = "Try generating from an existing key file (PEM or DER)")]
    pub key: Option<PathBuf>,
    #[clap(short = 'x', long = "gen-public", help = "Generate the public key instead of the private one")]
    pub gen_public: bool,
    #[clap(short, long, value_name = "PATH", help = "Save the key into a file instead of printing it")]
    pub out: Option<PathBuf>,
    #[clap(short, long, help = "Use Fermat's factorization if the lookup fails")]
    pub weak: bool,
    #[clap(short, long, help = "Only log warnings and errors")]
    pub silent: bool,
    #[clap(short, value_name = "VALUE", value_parser = parse_number, help = "1st prime of the key")]
    pub p: Option<BigUint>,
    #[clap(short, value_name = "VALUE", value_parser = parse_number, help = "2nd prime of the key")]
    pub q: Option<BigUint>,
    #[clap(short, value_name = "VALUE", value_parser = parse_number, help = "Modulus of the key")]
    pub n: Option<BigUint>,
    #[clap(short, value_name = "VALUE", value_parser = parse_number, default_value = CONFIG_DEF.exponent.as_str(), help = "Public exponent")]
    pub e: BigUint,
    #[clap(long, help = "Never query the remote factor database")]
    pub offline: bool,
    #[clap(long, value_name = "SECS", help = "Give up Fermat factorization after this many seconds")]
    pub fermat_timeout: Option<u64>,
    #[clap(long, value_name = "N", default_value_t = CONFIG_DEF.progress_interval, help = "Report factorization progress every N attempts")]
    pub progress_interval: u64,
    #[clap(long, value_enum, default_value_t = PublicFormat::Spki, help = "Public key envelope")]
    pub public_format: PublicFormat,
    #[clap(long, value_enum, default_value_t = PrivateFormat::Pkcs1, help = "Private key envelope")]
    pub private_format: PrivateFormat,
    #[clap(long, help = "Keep p and q as given instead of putting the larger prime first")]
    pub keep_order: bool,
    #[clap(long, help = "Output the key as raw DER")]
    pub binary: bool,
    #[clap(long, value_name = "URL", env = "RSA_RECOVER_LOOKUP_URL", default_value = CONFIG_DEF.lookup_url.as_str(), help = "FactorDB API endpoint")]
    pub lookup_url: String,
    #[clap(long, value_name = "SECS", default_value_t = CONFIG_DEF.lookup_timeout, help = "Timeout for the factor lookup")]
    pub lookup_timeout: u64,
}

impl RSA {
    pub fn want(&self) -> Want {
        if self.gen_public {
            Want::Public
        } else {
            Want::Private
        }
    }

    pub fn known(&self) -> Known {
        Known { p: self.p.clone(), q: self.q.clone(), n: self.n.clone(), e: self.e.clone() }
    }

    pub fn formats(&self) -> Formats {
        Formats { public: self.public_format, private: self.private_format }
    }

    pub fn recovery(&self) -> Recovery {
        let order = if self.keep_order { PrimeOrder::AsGiven } else { PrimeOrder::Descending };
        let mut recovery = Recovery::default().with_progress(progress::select(self.silent)).with_order(order);
        if !self.offline {
            let timeout = Duration::from_secs(self.lookup_timeout);
            recovery = recovery.with_lookup(Box::new(FactorDb::new(&self.lookup_url, timeout)));
        }
        if self.weak {
            recovery = recovery.with_fallback(Fermat::new(self.progress_interval), crossbeam_channel::never());
            if let Some(secs) = self.fermat_timeout {
                recovery = recovery.with_time_limit(Duration::from_secs(secs));
            }
        }
        recovery
    }

    pub fn run(&self) -> Result<()> {
        let recovery = self.recovery();
        let key = match &self.key {
            Some(path) => {
                let key = load(path)?;
                log::info!("Loaded {} from {}", key.describe(), path.display());
                recovery.from_key(key, self.want())?
            }
            None => recovery.recover(&self.known(), self.want())?,
        };
        let encoded = Encoded::new(&key, self.formats());
        match &self.out {
            Some(path) => {
                encoded.save(path, self.binary)?;
                log::info!("Saved {} to {}", key.describe(), path.display());
            }
            None => {
                let data = encoded.render(self.binary)?;
                let mut stdout = io::stdout().lock();
                stdout.write_all(&data)?;
                stdout.flush()?;
            }
        }
        Ok(())
    }
}

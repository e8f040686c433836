pub mod der;
pub mod key_data;
pub mod key_reader;
pub mod key_writer;

pub use key_data::*;
pub use key_reader::*;
pub use key_writer::*;

use clap::ValueEnum;

pub const LABEL_PUBLIC: &str = "PUBLIC KEY";
pub const LABEL_RSA_PUBLIC: &str = "RSA PUBLIC KEY";
pub const LABEL_RSA_PRIVATE: &str = "RSA PRIVATE KEY";
pub const LABEL_PRIVATE: &str = "PRIVATE KEY";

const BASE64_SPLIT: usize = 64;

/// Envelope used for public keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PublicFormat {
    /// SubjectPublicKeyInfo, `PUBLIC KEY`
    #[default]
    Spki,
    /// Bare RSAPublicKey, `RSA PUBLIC KEY`
    Pkcs1,
}

/// Envelope used for private keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PrivateFormat {
    /// RSAPrivateKey, `RSA PRIVATE KEY`
    #[default]
    Pkcs1,
    /// PrivateKeyInfo, `PRIVATE KEY`
    Pkcs8,
}

impl PublicFormat {
    pub fn label(self) -> &'static str {
        match self {
            PublicFormat::Spki => LABEL_PUBLIC,
            PublicFormat::Pkcs1 => LABEL_RSA_PUBLIC,
        }
    }
}

impl PrivateFormat {
    pub fn label(self) -> &'static str {
        match self {
            PrivateFormat::Pkcs1 => LABEL_RSA_PRIVATE,
            PrivateFormat::Pkcs8 => LABEL_PRIVATE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Formats {
    pub public: PublicFormat,
    pub private: PrivateFormat,
}

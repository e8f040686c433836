use num_bigint::BigUint;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecoverError>;

#[derive(Debug, Error)]
pub enum RecoverError {
    #[error("no factors of n available: {0}")]
    FactorsUnavailable(String),

    #[error("{divisor} does not divide n = {n}")]
    NotDivisible { n: BigUint, divisor: BigUint },

    #[error("e = {e} has no inverse modulo (p-1)*(q-1)")]
    NotInvertible { e: BigUint },

    #[error("p and q are equal, n is a perfect square")]
    EqualFactors,

    #[error("p * q = {product} does not match n = {n}")]
    ModulusMismatch { n: BigUint, product: BigUint },

    #[error("malformed key: {0}")]
    MalformedKey(String),

    #[error("unexpected lookup response: {0}")]
    LookupFormat(String),

    #[error("lookup service unreachable: {0}")]
    LookupUnavailable(String),

    #[error("factorization stopped after {attempts} attempts")]
    Cancelled { attempts: u64 },

    #[error("{0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RecoverError {
    /// Short name of the failure class, printed ahead of the message.
    pub fn kind(&self) -> &'static str {
        match self {
            RecoverError::FactorsUnavailable(_) => "FactorsUnavailable",
            RecoverError::NotDivisible { .. } => "NotDivisible",
            RecoverError::NotInvertible { .. } => "NotInvertible",
            RecoverError::EqualFactors => "EqualFactors",
            RecoverError::ModulusMismatch { .. } => "ModulusMismatch",
            RecoverError::MalformedKey(_) => "MalformedKey",
            RecoverError::LookupFormat(_) => "LookupFormatError",
            RecoverError::LookupUnavailable(_) => "LookupUnavailable",
            RecoverError::Cancelled { .. } => "Cancelled",
            RecoverError::InvalidArguments(_) => "InvalidArguments",
            RecoverError::Io(_) => "Io",
        }
    }

    pub(crate) fn malformed<S: Into<String>>(msg: S) -> Self {
        RecoverError::MalformedKey(msg.into())
    }
}

use num_bigint::BigUint;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    pub n: BigUint,
    pub e: BigUint,
}

/// Two-prime private key in PKCS#1 field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateKey {
    pub n: BigUint,
    pub e: BigUint,
    pub d: BigUint,
    pub p: BigUint,
    pub q: BigUint,
    /// `d mod (p - 1)`
    pub dp: BigUint,
    /// `d mod (q - 1)`
    pub dq: BigUint,
    /// `q^-1 mod p`
    pub qinv: BigUint,
}

impl PrivateKey {
    pub fn public(&self) -> PublicKey {
        PublicKey { n: self.n.clone(), e: self.e.clone() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyMaterial {
    Public(PublicKey),
    Private(PrivateKey),
}

impl KeyMaterial {
    pub fn public(&self) -> PublicKey {
        match self {
            KeyMaterial::Public(key) => key.clone(),
            KeyMaterial::Private(key) => key.public(),
        }
    }

    pub fn is_private(&self) -> bool {
        matches!(self, KeyMaterial::Private(_))
    }

    pub fn describe(&self) -> String {
        let public = self.public();
        let kind = if self.is_private() { "private" } else { "public" };
        format!("{}-bit {} key, e = {}", public.n.bits(), kind, public.e)
    }
}

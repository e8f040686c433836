use std::fs;
use std::path::Path;

use num_traits::Zero;

use crate::rsa::error::{RecoverError, Result};
use crate::rsa::keys::der::{DerReader, TAG_CONTEXT_0};
use crate::rsa::keys::{KeyMaterial, PrivateKey, PublicKey};
use crate::rsa::keys::{LABEL_PRIVATE, LABEL_PUBLIC, LABEL_RSA_PRIVATE, LABEL_RSA_PUBLIC};

const READER_JUDGE_BUF: usize = 4;

/// Splits a key file into its label and DER payload. Accepts PEM text or
/// raw DER, telling them apart from the first few bytes.
#[derive(Debug)]
pub struct KeyReader {
    pub binary: bool,
    label: Option<String>,
    body: Vec<u8>,
}

impl KeyReader {
    pub fn new(data: &[u8]) -> Result<Self> {
        if data.len() < READER_JUDGE_BUF {
            return Err(RecoverError::malformed("data length not enough"));
        }
        let start = data.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(data.len());
        let head = &data[start..data.len().min(start + READER_JUDGE_BUF)];
        if head.iter().any(|b| !b.is_ascii_graphic()) {
            return Ok(Self { binary: true, label: None, body: data.to_vec() });
        }
        let text = std::str::from_utf8(data).map_err(|_| RecoverError::malformed("key text is not UTF-8"))?;
        Self::parse_text(text)
    }

    fn parse_text(text: &str) -> Result<Self> {
        let mut label: Option<String> = None;
        let mut body = Vec::new();
        let mut closed = false;
        for line in text.lines().map(str::trim) {
            if let Some(begin) = line.strip_prefix("-----BEGIN ").and_then(|l| l.strip_suffix("-----")) {
                if label.is_some() {
                    return Err(RecoverError::malformed("nested BEGIN line"));
                }
                label = Some(begin.to_string());
            } else if let Some(end) = line.strip_prefix("-----END ").and_then(|l| l.strip_suffix("-----")) {
                match &label {
                    Some(begin) if begin == end => {
                        closed = true;
                        break;
                    }
                    Some(begin) => return Err(RecoverError::malformed(format!("BEGIN {} closed by END {}", begin, end))),
                    None => return Err(RecoverError::malformed("END line without BEGIN")),
                }
            } else if label.is_some() {
                if line.contains(':') {
                    return Err(RecoverError::malformed("encrypted or annotated PEM is not supported"));
                }
                body.extend(line.bytes().filter(|b| !b.is_ascii_whitespace()));
            }
        }
        if label.is_none() {
            return Err(RecoverError::malformed("no BEGIN line"));
        }
        if !closed {
            return Err(RecoverError::malformed("missing END line"));
        }
        Ok(Self { binary: false, label, body })
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn der(&self) -> Result<Vec<u8>> {
        if self.binary {
            Ok(self.body.clone())
        } else {
            base64::decode(&self.body).map_err(|e| RecoverError::malformed(format!("bad base64: {}", e)))
        }
    }

    pub fn decode(&self) -> Result<KeyMaterial> {
        let der = self.der()?;
        match self.label() {
            Some(LABEL_PUBLIC) => parse_spki(&der).map(KeyMaterial::Public),
            Some(LABEL_RSA_PUBLIC) => parse_rsa_public(&der).map(KeyMaterial::Public),
            Some(LABEL_RSA_PRIVATE) => parse_rsa_private(&der).map(KeyMaterial::Private),
            Some(LABEL_PRIVATE) => parse_pkcs8(&der).map(KeyMaterial::Private),
            Some(other) => Err(RecoverError::malformed(format!("unsupported PEM label `{}`", other))),
            None => decode_der(&der),
        }
    }
}

/// Parses PEM text into key material.
pub fn decode(text: &str) -> Result<KeyMaterial> {
    KeyReader::new(text.as_bytes())?.decode()
}

/// Parses a DER structure of unknown kind by trying each layout in turn.
pub fn decode_der(der: &[u8]) -> Result<KeyMaterial> {
    parse_rsa_private(der)
        .or_else(|_| parse_pkcs8(der))
        .map(KeyMaterial::Private)
        .or_else(|_| parse_spki(der).or_else(|_| parse_rsa_public(der)).map(KeyMaterial::Public))
        .map_err(|_| RecoverError::malformed("unrecognized DER key structure"))
}

pub fn load<P: AsRef<Path>>(path: P) -> Result<KeyMaterial> {
    let data = fs::read(path)?;
    KeyReader::new(&data)?.decode()
}

fn parse_rsa_public(der: &[u8]) -> Result<PublicKey> {
    let mut outer = DerReader::new(der);
    let mut seq = outer.sequence()?;
    let key = PublicKey { n: seq.integer()?, e: seq.integer()? };
    seq.finish()?;
    outer.finish()?;
    if key.n.is_zero() || key.e.is_zero() {
        return Err(RecoverError::malformed("zero modulus or exponent"));
    }
    Ok(key)
}

fn parse_spki(der: &[u8]) -> Result<PublicKey> {
    let mut outer = DerReader::new(der);
    let mut seq = outer.sequence()?;
    seq.rsa_algorithm()?;
    let key = parse_rsa_public(seq.bit_string()?)?;
    seq.finish()?;
    outer.finish()?;
    Ok(key)
}

fn parse_rsa_private(der: &[u8]) -> Result<PrivateKey> {
    let mut outer = DerReader::new(der);
    let mut seq = outer.sequence()?;
    let version = seq.integer()?;
    if !version.is_zero() {
        return Err(RecoverError::malformed(format!("unsupported private key version {} (multi-prime?)", version)));
    }
    let key = PrivateKey {
        n: seq.integer()?,
        e: seq.integer()?,
        d: seq.integer()?,
        p: seq.integer()?,
        q: seq.integer()?,
        dp: seq.integer()?,
        dq: seq.integer()?,
        qinv: seq.integer()?,
    };
    seq.finish()?;
    outer.finish()?;
    if &key.p * &key.q != key.n {
        return Err(RecoverError::malformed("prime factors do not multiply to the modulus"));
    }
    Ok(key)
}

fn parse_pkcs8(der: &[u8]) -> Result<PrivateKey> {
    let mut outer = DerReader::new(der);
    let mut seq = outer.sequence()?;
    if !seq.integer()?.is_zero() {
        return Err(RecoverError::malformed("unsupported PrivateKeyInfo version"));
    }
    seq.rsa_algorithm()?;
    let key = parse_rsa_private(seq.octet_string()?)?;
    seq.optional(TAG_CONTEXT_0)?;
    seq.finish()?;
    outer.finish()?;
    Ok(key)
}

//! The subset of DER needed for RSA keys: INTEGER, BIT STRING,
//! OCTET STRING, NULL, OBJECT IDENTIFIER and SEQUENCE.

use num_bigint::BigUint;

use crate::rsa::error::{RecoverError, Result};

pub const TAG_INTEGER: u8 = 0x02;
pub const TAG_BIT_STRING: u8 = 0x03;
pub const TAG_OCTET_STRING: u8 = 0x04;
pub const TAG_NULL: u8 = 0x05;
pub const TAG_OID: u8 = 0x06;
pub const TAG_SEQUENCE: u8 = 0x30;
pub const TAG_CONTEXT_0: u8 = 0xa0;

/// Encoded `rsaEncryption` object identifier, 1.2.840.113549.1.1.1.
pub const RSA_ENCRYPTION_OID: [u8; 9] = [0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x01];

fn push_length(out: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        out.push(len as u8);
        return;
    }
    let bytes = len.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    out.push(0x80 | (bytes.len() - skip) as u8);
    out.extend_from_slice(&bytes[skip..]);
}

pub fn tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len() + 6);
    out.push(tag);
    push_length(&mut out, content.len());
    out.extend_from_slice(content);
    out
}

/// Positive INTEGER: big-endian magnitude, with a leading zero byte when
/// the top bit would otherwise read as a sign.
pub fn integer(value: &BigUint) -> Vec<u8> {
    let mut content = value.to_bytes_be();
    if content[0] & 0x80 != 0 {
        content.insert(0, 0);
    }
    tlv(TAG_INTEGER, &content)
}

pub fn small_integer(value: u8) -> Vec<u8> {
    integer(&BigUint::from(value))
}

pub fn sequence(items: &[Vec<u8>]) -> Vec<u8> {
    tlv(TAG_SEQUENCE, &items.concat())
}

pub fn bit_string(content: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(content.len() + 1);
    body.push(0);
    body.extend_from_slice(content);
    tlv(TAG_BIT_STRING, &body)
}

pub fn octet_string(content: &[u8]) -> Vec<u8> {
    tlv(TAG_OCTET_STRING, content)
}

/// `AlgorithmIdentifier { rsaEncryption, NULL }`
pub fn rsa_algorithm() -> Vec<u8> {
    sequence(&[tlv(TAG_OID, &RSA_ENCRYPTION_OID), tlv(TAG_NULL, &[])])
}

/// Cursor over a DER buffer.
pub struct DerReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> DerReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn byte(&mut self) -> Result<u8> {
        let b = *self.data.get(self.pos).ok_or_else(|| RecoverError::malformed("unexpected end of data"))?;
        self.pos += 1;
        Ok(b)
    }

    fn length(&mut self) -> Result<usize> {
        let first = self.byte()?;
        if first < 0x80 {
            return Ok(first as usize);
        }
        let count = (first & 0x7f) as usize;
        if count == 0 {
            return Err(RecoverError::malformed("indefinite length"));
        }
        if count > std::mem::size_of::<usize>() {
            return Err(RecoverError::malformed("length field too large"));
        }
        let mut len = 0usize;
        for i in 0..count {
            let b = self.byte()?;
            if i == 0 && b == 0 {
                return Err(RecoverError::malformed("non-minimal length"));
            }
            len = (len << 8) | b as usize;
        }
        if len < 0x80 {
            return Err(RecoverError::malformed("non-minimal length"));
        }
        Ok(len)
    }

    /// Reads one element with the given tag and returns its content.
    pub fn read(&mut self, tag: u8) -> Result<&'a [u8]> {
        let found = self.byte()?;
        if found != tag {
            return Err(RecoverError::malformed(format!("expected tag {:#04x}, found {:#04x}", tag, found)));
        }
        let len = self.length()?;
        let remaining = self.data.len() - self.pos;
        if len > remaining {
            return Err(RecoverError::malformed(format!("length {} exceeds remaining {} bytes", len, remaining)));
        }
        let content = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(content)
    }

    /// Reads the next element only if it carries `tag`.
    pub fn optional(&mut self, tag: u8) -> Result<Option<&'a [u8]>> {
        match self.data.get(self.pos) {
            Some(&found) if found == tag => self.read(tag).map(Some),
            _ => Ok(None),
        }
    }

    pub fn sequence(&mut self) -> Result<DerReader<'a>> {
        Ok(DerReader::new(self.read(TAG_SEQUENCE)?))
    }

    pub fn integer(&mut self) -> Result<BigUint> {
        let content = self.read(TAG_INTEGER)?;
        match content {
            [] => Err(RecoverError::malformed("empty integer")),
            [first, ..] if first & 0x80 != 0 => Err(RecoverError::malformed("negative integer")),
            [0, second, ..] if second & 0x80 == 0 => Err(RecoverError::malformed("non-minimal integer")),
            _ => Ok(BigUint::from_bytes_be(content)),
        }
    }

    pub fn bit_string(&mut self) -> Result<&'a [u8]> {
        match self.read(TAG_BIT_STRING)? {
            [0, rest @ ..] => Ok(rest),
            _ => Err(RecoverError::malformed("bit string with unused bits")),
        }
    }

    pub fn octet_string(&mut self) -> Result<&'a [u8]> {
        self.read(TAG_OCTET_STRING)
    }

    /// Checks an `AlgorithmIdentifier` names rsaEncryption.
    pub fn rsa_algorithm(&mut self) -> Result<()> {
        let mut alg = self.sequence()?;
        if alg.read(TAG_OID)? != RSA_ENCRYPTION_OID {
            return Err(RecoverError::malformed("algorithm is not rsaEncryption"));
        }
        if !alg.is_empty() {
            alg.read(TAG_NULL)?;
        }
        alg.finish()
    }

    /// Fails unless every byte has been consumed.
    pub fn finish(&self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(RecoverError::malformed(format!("{} trailing bytes", self.data.len() - self.pos)))
        }
    }
}

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fmt;

/// Width of every digest produced by a [`Digester`], in bytes.
pub const DIGEST_LEN: usize = 32;

/// Fixed-width salted digest of one record.
///
/// Ordering is lexicographic over the raw bytes, which matches ordering over
/// the lowercase hex rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    pub const fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(DIGEST_LEN * 2);
        for byte in self.0 {
            use std::fmt::Write as _;
            let _ = write!(&mut out, "{:02x}", byte);
        }
        out
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Hashes serialized record bytes together with a salt.
///
/// The salt is appended after the record bytes: `H(bytes || salt)`.
pub trait Digester {
    fn digest(&self, bytes: &[u8], salt: &str) -> Digest;

    fn algorithm(&self) -> HashAlgorithm;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Digester;

impl Digester for Sha256Digester {
    fn digest(&self, bytes: &[u8], salt: &str) -> Digest {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        hasher.update(salt.as_bytes());
        Digest(hasher.finalize().into())
    }

    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Sha256
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Blake3Digester;

impl Digester for Blake3Digester {
    fn digest(&self, bytes: &[u8], salt: &str) -> Digest {
        let mut hasher = blake3::Hasher::new();
        hasher.update(bytes);
        hasher.update(salt.as_bytes());
        Digest(*hasher.finalize().as_bytes())
    }

    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Blake3
    }
}

/// Digest algorithm selectable per run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Blake3,
}

impl HashAlgorithm {
    pub const fn as_str(self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Blake3 => "blake3",
        }
    }

    pub fn digester(self) -> Box<dyn Digester + Send + Sync> {
        match self {
            HashAlgorithm::Sha256 => Box::new(Sha256Digester),
            HashAlgorithm::Blake3 => Box::new(Blake3Digester),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

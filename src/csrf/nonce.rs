//! Nonce generation and pluggable random sources.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};

/// Number of random bytes in a nonce.
pub const NONCE_BYTES: usize = 16;

/// Default random source name.
pub const DEFAULT_RANDOM_SOURCE: &str = "os";

/// A source of cryptographically strong random bytes.
pub trait RandomSource: Send + Sync + fmt::Debug {
    fn fill_bytes(&self, dest: &mut [u8]);
}

/// Reads directly from the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill_bytes(&self, dest: &mut [u8]) {
        OsRng.fill_bytes(dest);
    }
}

/// Uses the per-thread generator, reseeded from the OS.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn fill_bytes(&self, dest: &mut [u8]) {
        rand::thread_rng().fill_bytes(dest);
    }
}

/// A single shared CSPRNG seeded once from the OS.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

impl RandomSource for SeededRandom {
    fn fill_bytes(&self, dest: &mut [u8]) {
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .fill_bytes(dest);
    }
}

/// Returned when a random source name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown random source '{0}' (expected one of: os, thread, std)")]
pub struct UnknownRandomSource(pub String);

/// Select a random source by name.
pub fn random_source(name: &str) -> Result<Arc<dyn RandomSource>, UnknownRandomSource> {
    match name.trim().to_ascii_lowercase().as_str() {
        "os" => Ok(Arc::new(OsRandom)),
        "thread" => Ok(Arc::new(ThreadRandom)),
        "std" => Ok(Arc::new(SeededRandom::from_entropy())),
        _ => Err(UnknownRandomSource(name.to_string())),
    }
}

/// A single-use token rendered as uppercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonceToken(String);

impl NonceToken {
    pub fn generate(source: &dyn RandomSource) -> Self {
        let mut bytes = [0u8; NONCE_BYTES];
        source.fill_bytes(&mut bytes);
        Self(hex::encode_upper(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NonceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<NonceToken> for String {
    fn from(token: NonceToken) -> Self {
        token.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Fixed(u8);

    impl RandomSource for Fixed {
        fn fill_bytes(&self, dest: &mut [u8]) {
            dest.fill(self.0);
        }
    }

    #[test]
    fn test_token_shape() {
        for name in ["os", "thread", "std"] {
            let source = random_source(name).unwrap();
            let token = NonceToken::generate(source.as_ref());
            assert_eq!(token.as_str().len(), 2 * NONCE_BYTES);
            assert!(token
                .as_str()
                .chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
        }
    }

    #[test]
    fn test_tokens_differ() {
        let source = random_source(DEFAULT_RANDOM_SOURCE).unwrap();
        let a = NonceToken::generate(source.as_ref());
        let b = NonceToken::generate(source.as_ref());
        assert_ne!(a, b);
    }

    #[test]
    fn test_uppercase_hex_rendering() {
        let token = NonceToken::generate(&Fixed(0xab));
        assert_eq!(token.as_str(), "AB".repeat(NONCE_BYTES));
    }

    #[test]
    fn test_unknown_source() {
        assert_eq!(
            random_source("SHA1PRNG").unwrap_err(),
            UnknownRandomSource("SHA1PRNG".into())
        );
        assert!(random_source(" OS ").is_ok());
    }
}

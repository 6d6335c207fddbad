use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

/// Characters a generated short code may contain. All are path-safe.
const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub const DEFAULT_CODE_LENGTH: usize = 7;
pub const MIN_CODE_LENGTH: usize = 4;
pub const MAX_CODE_LENGTH: usize = 32;

/// Source of candidate short codes.
///
/// Generators never touch storage; uniqueness is confirmed by the store
/// when the code is inserted.
pub trait TokenGenerator: Send + Sync + 'static {
    fn generate(&self) -> String;
}

/// Random alphanumeric codes of a fixed length.
///
/// At the default length of 7 there are 62^7 (about 3.5 × 10^12) codes.
#[derive(Debug, Clone)]
pub struct RandomTokenGenerator {
    length: usize,
}

impl RandomTokenGenerator {
    /// `length` is clamped to `MIN_CODE_LENGTH..=MAX_CODE_LENGTH`.
    pub fn new(length: usize) -> Self {
        Self {
            length: length.clamp(MIN_CODE_LENGTH, MAX_CODE_LENGTH),
        }
    }
}

impl Default for RandomTokenGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_LENGTH)
    }
}

impl TokenGenerator for RandomTokenGenerator {
    fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..self.length)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect()
    }
}

/// Deterministic codes like `"t000000"`, `"t000001"`, ...
///
/// Used wherever predictable codes are wanted, mainly tests.
#[derive(Debug)]
pub struct SequenceGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl SequenceGenerator {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl TokenGenerator for SequenceGenerator {
    fn generate(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{}{:06}", self.prefix, n)
    }
}

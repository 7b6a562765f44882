use super::{EmbeddingVector, DEFAULT_DIMENSION, MAX_INPUT_CHARS};

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// Turns text into a fixed-dimension vector.
///
/// Implementations must be pure: identical text always yields an identical
/// vector.
pub trait TextVectorizer: Send + Sync {
    /// Number of components in every produced vector
    fn dimension(&self) -> usize;

    /// Embed `text`; never fails, empty text yields the zero vector
    fn embed(&self, text: &str) -> EmbeddingVector;
}

/// Hashed term-frequency vectorizer
#[derive(Debug, Clone)]
pub struct HashingVectorizer {
    dimension: usize,
    max_input_chars: usize,
}

impl HashingVectorizer {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
            max_input_chars: MAX_INPUT_CHARS,
        }
    }

    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self
    }
}

impl Default for HashingVectorizer {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

impl TextVectorizer for HashingVectorizer {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> EmbeddingVector {
        let cleaned: String = text
            .chars()
            .take(self.max_input_chars)
            .flat_map(char::to_lowercase)
            .map(|c| {
                if c.is_alphanumeric() || c.is_whitespace() {
                    c
                } else {
                    ' '
                }
            })
            .collect();

        let mut vector = EmbeddingVector::zeros(self.dimension);
        for token in cleaned.split_whitespace() {
            vector.increment(bucket(token, self.dimension));
        }
        vector.normalize();
        vector
    }
}

/// Embed `text` with the hashing vectorizer at dimension `dimension`
pub fn embed(text: &str, dimension: usize) -> EmbeddingVector {
    HashingVectorizer::new(dimension).embed(text)
}

/// 32-bit FNV-1a over UTF-16 code units
fn fnv1a(token: &str) -> u32 {
    token.encode_utf16().fold(FNV_OFFSET_BASIS, |hash, unit| {
        (hash ^ u32::from(unit)).wrapping_mul(FNV_PRIME)
    })
}

/// Slot for a token; the hash is read as a signed 32-bit value and its
/// magnitude reduced modulo the dimension
fn bucket(token: &str, dimension: usize) -> usize {
    (fnv1a(token) as i32).unsigned_abs() as usize % dimension
}

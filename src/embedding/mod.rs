//! Text embedding for incident similarity.
//!
//! The default [`HashingVectorizer`] is a deterministic bag-of-words proxy:
//! tokens are hashed (32-bit FNV-1a) into a fixed number of buckets, counted,
//! and the result is L2-normalized. Hash collisions are accepted. Any model
//! honoring the [`TextVectorizer`] contract can replace it without touching
//! the similarity ranking.

mod vector;
mod vectorizer;

pub use vector::EmbeddingVector;
pub use vectorizer::{embed, HashingVectorizer, TextVectorizer};

/// Canonical embedding dimension
pub const DEFAULT_DIMENSION: usize = 768;

/// Input is truncated to this many characters before tokenizing
pub const MAX_INPUT_CHARS: usize = 8000;

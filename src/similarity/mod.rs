//! Nearest-neighbor ranking over stored incident embeddings.

mod index;

pub use index::{Candidate, Neighbor, SimilarityIndex, MAX_K};

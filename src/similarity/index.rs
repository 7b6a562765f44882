use crate::embedding::EmbeddingVector;
use serde::Serialize;
use uuid::Uuid;

/// Upper bound callers clamp `k` to
pub const MAX_K: usize = 20;

/// Stored incident vector considered for ranking
#[derive(Debug, Clone)]
pub struct Candidate {
    pub id: Uuid,
    pub vector: Option<EmbeddingVector>,
}

impl Candidate {
    pub fn new(id: Uuid, vector: Option<EmbeddingVector>) -> Self {
        Self { id, vector }
    }
}

/// Ranked hit; lower score means more similar
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Neighbor {
    pub id: Uuid,
    pub score: f32,
}

/// Stateless ranking by cosine distance
pub struct SimilarityIndex;

impl SimilarityIndex {
    /// Clamp a requested result count to `[1, MAX_K]`
    pub fn clamp_k(k: usize) -> usize {
        k.clamp(1, MAX_K)
    }

    /// Rank `candidates` against `query`, ascending by `1 - dot(query, v)`.
    ///
    /// Candidates without a vector, or whose dimension differs from the
    /// query, are skipped. Ties keep input order. At most `k` entries are
    /// returned.
    pub fn rank(query: &EmbeddingVector, candidates: &[Candidate], k: usize) -> Vec<Neighbor> {
        let mut scored: Vec<Neighbor> = candidates
            .iter()
            .filter_map(|candidate| {
                let vector = candidate.vector.as_ref()?;
                if vector.dimension() != query.dimension() {
                    tracing::debug!(
                        incident_id = %candidate.id,
                        expected = query.dimension(),
                        actual = vector.dimension(),
                        "Skipping candidate with mismatched embedding dimension"
                    );
                    return None;
                }
                Some(Neighbor {
                    id: candidate.id,
                    score: query.cosine_distance(vector),
                })
            })
            .collect();

        // sort_by is stable, so equal scores keep candidate order
        scored.sort_by(|a, b| a.score.total_cmp(&b.score));
        scored.truncate(k);
        scored
    }
}

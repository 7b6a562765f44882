use serde::{Deserialize, Serialize};

/// Fixed-dimension embedding, unit length unless derived from empty text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmbeddingVector(Vec<f32>);

impl EmbeddingVector {
    /// All-zero vector of the given dimension
    pub fn zeros(dimension: usize) -> Self {
        Self(vec![0.0; dimension])
    }

    /// Wrap raw components, replacing non-finite values with zero
    pub fn from_components(components: Vec<f32>) -> Self {
        let mut vector = Self(components);
        vector.sanitize();
        vector
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }

    /// Euclidean norm
    pub fn norm(&self) -> f32 {
        self.0.iter().map(|v| v * v).sum::<f32>().sqrt()
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|v| *v == 0.0)
    }

    pub fn dot(&self, other: &EmbeddingVector) -> f32 {
        self.0.iter().zip(other.0.iter()).map(|(a, b)| a * b).sum()
    }

    /// `1 - dot(a, b)`; cosine distance when both vectors are unit length
    pub fn cosine_distance(&self, other: &EmbeddingVector) -> f32 {
        1.0 - self.dot(other)
    }

    /// Scale to unit length; a zero vector is left unchanged
    pub(crate) fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 && norm.is_finite() {
            for v in self.0.iter_mut() {
                *v /= norm;
            }
        }
        self.sanitize();
    }

    fn sanitize(&mut self) {
        for v in self.0.iter_mut() {
            if !v.is_finite() {
                *v = 0.0;
            }
        }
    }

    pub(crate) fn increment(&mut self, slot: usize) {
        self.0[slot] += 1.0;
    }
}

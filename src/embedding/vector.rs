use serde::Serialize;

/// Fixed-length image embedding produced by the [`EmbeddingExtractor`](super::EmbeddingExtractor).
///
/// Vectors are never mutated after creation; transformations return a new value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EmbeddingVector(Vec<f32>);

impl EmbeddingVector {
    pub(crate) fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    /// Wraps raw values without going through an extractor (tests and fixtures only).
    #[cfg(any(test, feature = "mock"))]
    pub fn from_raw(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    /// Euclidean (L2) norm.
    pub fn norm(&self) -> f32 {
        self.0
            .iter()
            .map(|&x| f64::from(x) * f64::from(x))
            .sum::<f64>()
            .sqrt() as f32
    }

    /// Returns a unit-length copy; a zero vector stays zero.
    pub fn l2_normalized(&self) -> Self {
        let norm = self.norm();
        if norm > 0.0 {
            Self(self.0.iter().map(|x| x / norm).collect())
        } else {
            self.clone()
        }
    }

    /// First `len` components (or all of them if the vector is shorter).
    pub fn preview(&self, len: usize) -> Vec<f32> {
        self.0.iter().take(len).copied().collect()
    }
}

impl AsRef<[f32]> for EmbeddingVector {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

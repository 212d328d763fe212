use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Binary authenticity verdict.
pub enum Label {
    Authentic,
    Fake,
}

impl Label {
    /// `Authentic` iff `value > threshold` (strict).
    pub fn from_threshold(value: f32, threshold: f32) -> Self {
        if value > threshold {
            Label::Authentic
        } else {
            Label::Fake
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Authentic => "authentic",
            Label::Fake => "fake",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Similarity of the query to one reference image.
pub struct SimilarityEntry {
    /// Reference identifier.
    pub id: String,
    /// Cosine similarity in `[-1, 1]`.
    pub similarity: f32,
}

impl SimilarityEntry {
    pub fn new(id: impl Into<String>, similarity: f32) -> Self {
        Self {
            id: id.into(),
            similarity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How a score was derived.
pub enum ScorePolicy {
    /// Max cosine similarity against the reference set, as a percentage.
    Reference,
    /// Sigmoid of the embedding norm; used when no references exist.
    NormHeuristic,
    /// Random score from the configured range; extractor unavailable.
    Fallback,
}

impl ScorePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScorePolicy::Reference => "reference",
            ScorePolicy::NormHeuristic => "norm_heuristic",
            ScorePolicy::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for ScorePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Result of scoring one query embedding.
pub struct ScoreOutcome {
    /// Integer score in `0..=100`.
    pub score: u8,
    pub label: Label,
    /// Top-K references by descending similarity (empty for the heuristic path).
    pub ranked: Vec<SimilarityEntry>,
    /// Value compared against the threshold: max similarity, or the sigmoid probability.
    pub confidence: f32,
    pub policy: ScorePolicy,
}

impl ScoreOutcome {
    /// Max similarity when scored against references.
    pub fn max_similarity(&self) -> Option<f32> {
        match self.policy {
            ScorePolicy::Reference => Some(self.confidence),
            _ => None,
        }
    }
}

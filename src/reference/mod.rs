//! Reference set: embeddings of known-authentic images.
//!
//! The set is built once from configured sources, requires a real extractor,
//! and is immutable afterwards. [`ReferenceSetLoader`] defers the build to the
//! first request and shares the result.


use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, info};

use crate::embedding::decode::decode_reference;
use crate::embedding::{EmbeddingError, EmbeddingExtractor, EmbeddingVector};

const REFERENCE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Where a reference image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceSource {
    /// Image file on disk; the path as given becomes the reference id.
    Path(PathBuf),
    /// In-memory image bytes with an explicit id.
    Bytes { id: String, bytes: Vec<u8> },
}

impl ReferenceSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        ReferenceSource::Path(path.into())
    }

    pub fn bytes(id: impl Into<String>, bytes: Vec<u8>) -> Self {
        ReferenceSource::Bytes {
            id: id.into(),
            bytes,
        }
    }

    pub fn id(&self) -> String {
        match self {
            ReferenceSource::Path(path) => path.display().to_string(),
            ReferenceSource::Bytes { id, .. } => id.clone(),
        }
    }

    pub fn read(&self) -> Result<Vec<u8>, EmbeddingError> {
        match self {
            ReferenceSource::Path(path) => {
                std::fs::read(path).map_err(|source| EmbeddingError::ReadFailed {
                    path: path.clone(),
                    source,
                })
            }
            ReferenceSource::Bytes { bytes, .. } => Ok(bytes.clone()),
        }
    }
}

/// Lists image files in `dir` as sources, sorted by path.
pub fn sources_from_dir(dir: &Path) -> Result<Vec<ReferenceSource>, EmbeddingError> {
    let read_failed = |source| EmbeddingError::ReadFailed {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_failed)? {
        let path = entry.map_err(read_failed)?.path();
        let is_image = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| REFERENCE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
        if path.is_file() && is_image {
            paths.push(path);
        }
    }
    paths.sort();

    Ok(paths.into_iter().map(ReferenceSource::Path).collect())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceEmbedding {
    id: String,
    embedding: EmbeddingVector,
}

impl ReferenceEmbedding {
    pub fn new(id: impl Into<String>, embedding: EmbeddingVector) -> Self {
        Self {
            id: id.into(),
            embedding,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn embedding(&self) -> &EmbeddingVector {
        &self.embedding
    }
}

/// Ordered, immutable collection of reference embeddings sharing one dimension.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceSet {
    entries: Vec<ReferenceEmbedding>,
}

impl ReferenceSet {
    pub fn new(entries: Vec<ReferenceEmbedding>) -> Result<Self, EmbeddingError> {
        if let Some(first) = entries.first() {
            let expected = first.embedding.dim();
            if let Some(bad) = entries.iter().find(|e| e.embedding.dim() != expected) {
                return Err(EmbeddingError::DimensionMismatch {
                    expected,
                    actual: bad.embedding.dim(),
                });
            }
        }
        Ok(Self { entries })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceEmbedding> {
        self.entries.iter()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.id()).collect()
    }
}

/// Embeds every source with `extractor`, in order.
///
/// Fails with [`EmbeddingError::ExtractorUnavailable`] in fallback mode: random
/// reference embeddings would make every comparison meaningless. A reference
/// that does not decode fails with [`EmbeddingError::InvalidReference`]; the
/// upload byte cap does not apply to references.
pub fn build_reference_set(
    extractor: &EmbeddingExtractor,
    sources: &[ReferenceSource],
) -> Result<ReferenceSet, EmbeddingError> {
    extractor.require_real()?;

    let mut entries = Vec::with_capacity(sources.len());
    for source in sources {
        let id = source.id();
        let bytes = source.read()?;
        let image = decode_reference(&bytes).map_err(|e| match e {
            EmbeddingError::InvalidImage { reason } => EmbeddingError::InvalidReference {
                id: id.clone(),
                reason,
            },
            other => other,
        })?;
        let embedding = extractor.extract_image(&image)?;
        debug!(reference = %id, dim = embedding.dim(), "Embedded reference image");
        entries.push(ReferenceEmbedding::new(id, embedding));
    }

    let set = ReferenceSet::new(entries)?;
    info!(references = set.len(), "Reference set built");
    Ok(set)
}

/// Builds the reference set on first use and caches it for the process lifetime.
///
/// A failed build is not cached; the next call retries.
#[derive(Debug, Default)]
pub struct ReferenceSetLoader {
    sources: Vec<ReferenceSource>,
    cell: OnceCell<Arc<ReferenceSet>>,
}

impl ReferenceSetLoader {
    pub fn new(sources: Vec<ReferenceSource>) -> Self {
        Self {
            sources,
            cell: OnceCell::new(),
        }
    }

    /// Loader whose set is already built.
    pub fn preloaded(set: ReferenceSet) -> Self {
        Self {
            sources: Vec::new(),
            cell: OnceCell::with_value(Arc::new(set)),
        }
    }

    pub fn get_or_load(
        &self,
        extractor: &EmbeddingExtractor,
    ) -> Result<Arc<ReferenceSet>, EmbeddingError> {
        self.cell
            .get_or_try_init(|| build_reference_set(extractor, &self.sources).map(Arc::new))
            .cloned()
    }

    pub fn get(&self) -> Option<Arc<ReferenceSet>> {
        self.cell.get().cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn sources(&self) -> &[ReferenceSource] {
        &self.sources
    }
}

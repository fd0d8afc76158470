//! On-disk cache for the embedding index, keyed by a corpus fingerprint.

use super::index::EmbeddingIndex;
use crate::actors::traits::Embedder;
use crate::error::AppError;
use crate::models::Passage;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Serialized form of a built index.
#[derive(Debug, Serialize, Deserialize)]
pub struct PersistedIndex {
    pub fingerprint: String,
    pub model_id: String,
    pub dimension: usize,
    pub vectors: Vec<Vec<f32>>,
}

/// SHA-256 over the embedding model id and every passage text.
///
/// Any edit, insertion, removal or reordering of passages changes the fingerprint, as
/// does switching embedding model.
pub fn corpus_fingerprint(passages: &[Passage], model_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(model_id.as_bytes());
    for passage in passages {
        hasher.update([0u8]);
        hasher.update(passage.text.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Clone)]
pub struct IndexCache {
    path: PathBuf,
}

impl IndexCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the cached index when its fingerprint matches, otherwise builds and saves.
    ///
    /// A missing, unreadable, corrupt or stale cache triggers a rebuild. Failing to
    /// write the fresh cache only logs a warning.
    pub async fn load_or_build(
        &self,
        passages: Vec<Passage>,
        embedder: &dyn Embedder,
    ) -> Result<EmbeddingIndex, AppError> {
        let fingerprint = corpus_fingerprint(&passages, embedder.model_id());

        match self.read() {
            Ok(Some(persisted)) if persisted.fingerprint == fingerprint => {
                match EmbeddingIndex::from_parts(passages.clone(), persisted.vectors, persisted.model_id) {
                    Ok(index) => {
                        info!("Loaded embedding index from cache {:?}", self.path);
                        return Ok(index);
                    }
                    Err(e) => warn!("Cached index at {:?} is inconsistent, rebuilding: {}", self.path, e),
                }
            }
            Ok(Some(_)) => info!("Cached index at {:?} is stale, rebuilding", self.path),
            Ok(None) => info!("No cached index at {:?}, building", self.path),
            Err(e) => warn!("Ignoring unreadable index cache {:?}: {}", self.path, e),
        }

        let index = EmbeddingIndex::build(passages, embedder).await?;
        if let Err(e) = self.write(&index, fingerprint) {
            warn!("Failed to persist embedding index to {:?}: {}", self.path, e);
        }
        Ok(index)
    }

    fn read(&self) -> Result<Option<PersistedIndex>, AppError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn write(&self, index: &EmbeddingIndex, fingerprint: String) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let persisted = PersistedIndex {
            fingerprint,
            model_id: index.model_id().to_string(),
            dimension: index.dimension(),
            vectors: index.vectors().to_vec(),
        };
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec(&persisted)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passages(texts: &[&str]) -> Vec<Passage> {
        texts
            .iter()
            .enumerate()
            .map(|(id, t)| Passage {
                id,
                text: t.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_fingerprint_tracks_text_order_and_model() {
        let base = corpus_fingerprint(&passages(&["a", "b"]), "m1");
        assert_eq!(base, corpus_fingerprint(&passages(&["a", "b"]), "m1"));
        assert_ne!(base, corpus_fingerprint(&passages(&["b", "a"]), "m1"));
        assert_ne!(base, corpus_fingerprint(&passages(&["ab"]), "m1"));
        assert_ne!(base, corpus_fingerprint(&passages(&["a", "b"]), "m2"));
    }
}

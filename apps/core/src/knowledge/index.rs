//! Embedding Index - one vector per passage, brute-force cosine search.

use crate::actors::traits::Embedder;
use crate::error::AppError;
use crate::models::Passage;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{info, instrument};

/// A passage returned by a query together with its cosine similarity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPassage {
    pub passage: Passage,
    pub score: f32,
}

/// Immutable after construction: safe to share behind an `Arc` across sessions.
#[derive(Debug, Clone)]
pub struct EmbeddingIndex {
    passages: Vec<Passage>,
    vectors: Vec<Vec<f32>>,
    dimension: usize,
    model_id: String,
}

impl EmbeddingIndex {
    /// Embeds every passage exactly once.
    ///
    /// All-or-nothing: any embedding failure, empty vector or dimension mismatch
    /// yields [`AppError::IndexBuild`] and no index.
    #[instrument(skip_all, fields(passages = passages.len(), model = embedder.model_id()))]
    pub async fn build(passages: Vec<Passage>, embedder: &dyn Embedder) -> Result<Self, AppError> {
        let texts: Vec<String> = passages.iter().map(|p| p.text.clone()).collect();
        let vectors = embedder
            .embed_batch(&texts)
            .await
            .map_err(|e| AppError::IndexBuild(format!("Embedding failed: {}", e)))?;

        let index = Self::from_parts(passages, vectors, embedder.model_id().to_string())?;
        info!(
            "Built embedding index: {} passages, dimension {}",
            index.len(),
            index.dimension
        );
        Ok(index)
    }

    /// Assembles an index from precomputed vectors aligned by passage id.
    pub fn from_parts(
        passages: Vec<Passage>,
        vectors: Vec<Vec<f32>>,
        model_id: String,
    ) -> Result<Self, AppError> {
        if passages.len() != vectors.len() {
            return Err(AppError::IndexBuild(format!(
                "Expected {} embeddings, got {}",
                passages.len(),
                vectors.len()
            )));
        }
        if let Some((pos, passage)) = passages.iter().enumerate().find(|(i, p)| p.id != *i) {
            return Err(AppError::IndexBuild(format!(
                "Passage ids must be dense: position {} holds id {}",
                pos, passage.id
            )));
        }

        let dimension = vectors.first().map(Vec::len).unwrap_or(0);
        if dimension == 0 && !vectors.is_empty() {
            return Err(AppError::IndexBuild("Embedding backend returned an empty vector".to_string()));
        }
        if let Some(bad) = vectors.iter().position(|v| v.len() != dimension) {
            return Err(AppError::IndexBuild(format!(
                "Passage {} has dimension {}, expected {}",
                bad,
                vectors[bad].len(),
                dimension
            )));
        }

        Ok(Self {
            passages,
            vectors,
            dimension,
            model_id,
        })
    }

    /// Returns the `top_k` most similar passages, best first, ties by ascending id.
    ///
    /// `top_k` larger than the corpus returns the whole corpus.
    pub fn query(&self, query_vector: &[f32], top_k: usize) -> Result<Vec<ScoredPassage>, AppError> {
        if top_k == 0 {
            return Err(AppError::Validation("top_k must be at least 1".to_string()));
        }
        if query_vector.len() != self.dimension {
            return Err(AppError::Validation(format!(
                "Query vector has dimension {}, index expects {}",
                query_vector.len(),
                self.dimension
            )));
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(id, v)| (id, cosine_similarity(query_vector, v)))
            .collect();

        scored.sort_by(|(id_a, score_a), (id_b, score_b)| {
            score_b
                .partial_cmp(score_a)
                .unwrap_or(Ordering::Equal)
                .then(id_a.cmp(id_b))
        });

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(id, score)| ScoredPassage {
                passage: self.passages[id].clone(),
                score,
            })
            .collect())
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn passages(&self) -> &[Passage] {
        &self.passages
    }

    pub fn passage(&self, id: usize) -> Option<&Passage> {
        self.passages.get(id)
    }

    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }
}

/// Cosine similarity; 0.0 for mismatched, empty or zero-norm vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}

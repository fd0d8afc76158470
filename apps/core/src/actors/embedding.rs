use crate::actors::llm::http_client;
use crate::actors::messages::AppError;
use crate::actors::traits::Embedder;
use crate::config::{EmbeddingProvider, QuestConfig};
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use lru::LruCache;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub const FASTEMBED_MODEL_ID: &str = "all-MiniLM-L6-v2";

/// Local sentence embeddings through FastEmbed (ONNX, `all-MiniLM-L6-v2`, 384 dims).
///
/// Inference is CPU-bound, so every call runs on tokio's blocking pool.
#[derive(Clone)]
pub struct FastEmbedder {
    model: Arc<TextEmbedding>,
}

impl FastEmbedder {
    /// Loads the model, downloading it into `cache_dir` on first use.
    pub fn try_new(cache_dir: PathBuf) -> Result<Self, AppError> {
        let mut options = InitOptions::new(EmbeddingModel::AllMiniLML6V2);
        options.show_download_progress = false;
        options.cache_dir = cache_dir;

        let model = TextEmbedding::try_new(options)
            .map_err(|e| AppError::Config(format!("Failed to load embedding model: {}", e)))?;
        info!("Embedding model loaded successfully");
        Ok(Self {
            model: Arc::new(model),
        })
    }
}

#[async_trait]
impl Embedder for FastEmbedder {
    fn model_id(&self) -> &str {
        FASTEMBED_MODEL_ID
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::BackendUnavailable("No embedding generated".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        let model = Arc::clone(&self.model);
        let texts = texts.to_vec();
        tokio::task::spawn_blocking(move || model.embed(texts, None))
            .await
            .map_err(|e| AppError::Internal(format!("Embedding task failed: {}", e)))?
            .map_err(|e| AppError::BackendUnavailable(format!("Embedding failed: {}", e)))
    }
}

#[derive(Serialize)]
struct OllamaEmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

/// Embeddings served by Ollama's `/api/embeddings`.
#[derive(Clone)]
pub struct OllamaEmbedder {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
        let res = self
            .client
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&OllamaEmbeddingRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::BackendUnavailable(format!(
                "Embedding request failed with status {}: {}",
                status, body
            )));
        }

        let body: OllamaEmbeddingResponse = res
            .json()
            .await
            .map_err(|e| AppError::BackendUnavailable(format!("Malformed embedding response: {}", e)))?;
        if body.embedding.is_empty() {
            return Err(AppError::BackendUnavailable("Empty embedding returned".to_string()));
        }
        Ok(body.embedding)
    }
}

/// Memoizes query embeddings: users repeat themselves, backends are slow.
pub struct CachedEmbedder<E: Embedder> {
    inner: E,
    cache: Mutex<LruCache<String, Vec<f32>>>,
}

impl<E: Embedder> CachedEmbedder<E> {
    pub const CACHE_SIZE: NonZeroUsize = match NonZeroUsize::new(1000) {
        Some(size) => size,
        None => panic!("Cache size must be non-zero"),
    };

    pub fn new(inner: E) -> Self {
        Self::with_capacity(inner, Self::CACHE_SIZE)
    }

    pub fn with_capacity(inner: E, capacity: NonZeroUsize) -> Self {
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }
}

#[async_trait]
impl<E: Embedder> Embedder for CachedEmbedder<E> {
    fn model_id(&self) -> &str {
        self.inner.model_id()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
        if let Some(embedding) = self.cache.lock().await.get(text) {
            debug!("Cache hit for query: '{}'", text);
            return Ok(embedding.clone());
        }

        debug!("Cache miss for query: '{}'", text);
        let embedding = self.inner.embed(text).await?;
        self.cache.lock().await.put(text.to_string(), embedding.clone());
        Ok(embedding)
    }

    // Corpus batches bypass the cache: they are embedded once per build.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        self.inner.embed_batch(texts).await
    }
}

/// Builds the configured embedding backend, wrapped in the query cache.
pub fn embedder_from_config(config: &QuestConfig) -> Result<Arc<dyn Embedder>, AppError> {
    match config.embed_provider {
        EmbeddingProvider::FastEmbed => {
            let embedder = FastEmbedder::try_new(config.paths().embeddings_dir())?;
            Ok(Arc::new(CachedEmbedder::new(embedder)))
        }
        EmbeddingProvider::Ollama => {
            info!("Using Ollama embeddings model {}", config.embed_model);
            let embedder = OllamaEmbedder::new(
                config.embed_base_url.clone(),
                config.embed_model.clone(),
                config.backend_timeout,
            )?;
            Ok(Arc::new(CachedEmbedder::new(embedder)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct CountingEmbedder {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        fn model_id(&self) -> &str {
            "counting"
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![text.len() as f32, 1.0])
        }
    }

    #[tokio::test]
    async fn test_cached_embedder_hits_backend_once_per_text() {
        let calls = Arc::new(AtomicUsize::new(0));
        let embedder = CachedEmbedder::new(CountingEmbedder {
            calls: calls.clone(),
        });

        let first = embedder.embed("hello").await.unwrap();
        let second = embedder.embed("hello").await.unwrap();
        embedder.embed("other").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(embedder.model_id(), "counting");
    }

    #[tokio::test]
    async fn test_cached_embedder_evicts_least_recent() {
        let calls = Arc::new(AtomicUsize::new(0));
        let embedder = CachedEmbedder::with_capacity(
            CountingEmbedder {
                calls: calls.clone(),
            },
            NonZeroUsize::new(1).unwrap(),
        );

        embedder.embed("a").await.unwrap();
        embedder.embed("b").await.unwrap();
        embedder.embed("a").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_ollama_embedder_success() {
        let mock_server = MockServer::start().await;
        let embedder =
            OllamaEmbedder::new(mock_server.uri(), "nomic-embed-text", Duration::from_secs(5))
                .unwrap();

        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .and(body_partial_json(json!({"model": "nomic-embed-text", "prompt": "love"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"embedding": [0.5, 0.25, 0.0]})),
            )
            .mount(&mock_server)
            .await;

        let vector = embedder.embed("love").await.unwrap();
        assert_eq!(vector, vec![0.5, 0.25, 0.0]);
    }

    #[tokio::test]
    async fn test_ollama_embedder_error_status() {
        let mock_server = MockServer::start().await;
        let embedder =
            OllamaEmbedder::new(mock_server.uri(), "nomic-embed-text", Duration::from_secs(5))
                .unwrap();

        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
            .mount(&mock_server)
            .await;

        let result = embedder.embed("love").await;
        match result {
            Err(AppError::BackendUnavailable(msg)) => assert!(msg.contains("model not found")),
            other => panic!("Expected BackendUnavailable, got {:?}", other),
        }
    }
}

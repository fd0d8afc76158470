use crate::actors::messages::AppError;
use crate::actors::session::{GuidanceAgent, SessionHandle};
use crate::actors::traits::{Completer, Embedder};
use crate::brain::{EmotionalState, IntentClassifier};
use crate::config::QuestConfig;
use crate::knowledge::{CorpusStore, EmbeddingIndex, IndexCache};
use crate::models::ChatMessage;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Owns the shared index and backends, and routes turns to per-session actors.
///
/// This is the primary entry point for callers (the CLI, or a web layer). The index is
/// built at most once; sessions share it read-only.
pub struct QuestSupervisor {
    config: QuestConfig,
    embedder: Arc<dyn Embedder>,
    completer: Arc<dyn Completer>,
    classifier: IntentClassifier,
    index: OnceCell<Arc<EmbeddingIndex>>,
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl QuestSupervisor {
    /// Creates a supervisor without touching the corpus yet.
    ///
    /// Fails on invalid configuration or an unreadable lexicon override.
    pub fn new(
        config: QuestConfig,
        embedder: Arc<dyn Embedder>,
        completer: Arc<dyn Completer>,
    ) -> Result<Self, AppError> {
        config.check()?;
        let classifier = config.classifier()?;
        Ok(Self {
            config,
            embedder,
            completer,
            classifier,
            index: OnceCell::new(),
            sessions: RwLock::new(HashMap::new()),
        })
    }

    /// Creates a supervisor and loads or builds the index before returning.
    ///
    /// `CorpusLoad` and `IndexBuild` errors abort startup.
    #[instrument(skip_all, fields(corpus = ?config.corpus_path))]
    pub async fn bootstrap(
        config: QuestConfig,
        embedder: Arc<dyn Embedder>,
        completer: Arc<dyn Completer>,
    ) -> Result<Self, AppError> {
        let supervisor = Self::new(config, embedder, completer)?;
        let index = supervisor.index().await?;
        info!("Supervisor ready with {} passages", index.len());
        Ok(supervisor)
    }

    /// The shared index, built on first use.
    ///
    /// Concurrent callers wait on a single build. A failed build is not cached, so a later
    /// call retries.
    pub async fn index(&self) -> Result<Arc<EmbeddingIndex>, AppError> {
        self.index
            .get_or_try_init(|| self.build_index())
            .await
            .cloned()
    }

    async fn build_index(&self) -> Result<Arc<EmbeddingIndex>, AppError> {
        let passages = CorpusStore::load(&self.config.corpus_path)?;
        let cache = IndexCache::new(self.config.index_cache_path());
        let index = cache
            .load_or_build(passages, self.embedder.as_ref())
            .await
            .map_err(|e| {
                error!("Index build failed: {}", e);
                e
            })?;
        Ok(Arc::new(index))
    }

    pub fn config(&self) -> &QuestConfig {
        &self.config
    }

    /// Starts a fresh session actor and returns its id.
    #[instrument(skip(self))]
    pub async fn open_session(&self) -> Result<String, AppError> {
        let index = self.index().await?;
        let agent = GuidanceAgent::new(
            index,
            Arc::clone(&self.embedder),
            Arc::clone(&self.completer),
            self.classifier.clone(),
            self.config.model.clone(),
            self.config.backend_timeout,
        );
        let session_id = Uuid::new_v4().to_string();
        self.sessions
            .write()
            .await
            .insert(session_id.clone(), SessionHandle::spawn(agent));
        info!("Opened session {}", session_id);
        Ok(session_id)
    }

    async fn session(&self, session_id: &str) -> Result<SessionHandle, AppError> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| AppError::Validation(format!("Unknown session: {}", session_id)))
    }

    /// Runs one turn on a session. Backend trouble comes back as the apology text.
    #[instrument(skip(self, message))]
    pub async fn chat(&self, session_id: &str, message: &str) -> Result<String, AppError> {
        self.session(session_id).await?.chat(message).await
    }

    #[instrument(skip(self))]
    pub async fn reset(&self, session_id: &str) -> Result<(), AppError> {
        self.session(session_id).await?.reset().await
    }

    pub async fn history(&self, session_id: &str) -> Result<Vec<ChatMessage>, AppError> {
        self.session(session_id).await?.history().await
    }

    pub async fn emotional_state(
        &self,
        session_id: &str,
    ) -> Result<Option<EmotionalState>, AppError> {
        self.session(session_id).await?.emotional_state().await
    }

    /// Stops a session actor and forgets its id.
    #[instrument(skip(self))]
    pub async fn close_session(&self, session_id: &str) -> Result<(), AppError> {
        let handle = self
            .sessions
            .write()
            .await
            .remove(session_id)
            .ok_or_else(|| AppError::Validation(format!("Unknown session: {}", session_id)))?;
        handle.shutdown().await?;
        info!("Closed session {}", session_id);
        Ok(())
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Stops every session actor.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) {
        let handles: Vec<SessionHandle> = self
            .sessions
            .write()
            .await
            .drain()
            .map(|(_, handle)| handle)
            .collect();
        let count = handles.len();
        let results = join_all(handles.iter().map(|h| h.shutdown())).await;
        for result in results {
            if let Err(e) = result {
                warn!("Session did not shut down cleanly: {}", e);
            }
        }
        info!("Supervisor shut down {} session(s)", count);
    }
}

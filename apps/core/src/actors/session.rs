use crate::actors::messages::{ActorError, AppError, SessionMessage};
use crate::actors::traits::{Completer, Embedder};
use crate::brain::{
    clean_quote, extract_count, scrub_casual, EmotionalState, Intent, IntentClassifier,
    PromptComposer,
};
use crate::knowledge::EmbeddingIndex;
use crate::models::{ChatMessage, ModelConfig, Passage};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, warn};

/// The reply given whenever a backend fails or times out during a turn.
pub const APOLOGY: &str = "I'm having trouble right now, please try again.";

/// One conversation: history, emotional context and the per-turn pipeline.
///
/// The agent owns its context exclusively; backends and the index are shared.
pub struct GuidanceAgent {
    index: Arc<EmbeddingIndex>,
    embedder: Arc<dyn Embedder>,
    completer: Arc<dyn Completer>,
    classifier: IntentClassifier,
    composer: PromptComposer,
    model: ModelConfig,
    backend_timeout: Duration,
    history: Vec<ChatMessage>,
    emotional_state: Option<EmotionalState>,
}

impl GuidanceAgent {
    pub fn new(
        index: Arc<EmbeddingIndex>,
        embedder: Arc<dyn Embedder>,
        completer: Arc<dyn Completer>,
        classifier: IntentClassifier,
        model: ModelConfig,
        backend_timeout: Duration,
    ) -> Self {
        Self {
            index,
            embedder,
            completer,
            classifier,
            composer: PromptComposer::new(),
            model,
            backend_timeout,
            history: Vec::new(),
            emotional_state: None,
        }
    }

    /// Runs one turn and returns the reply.
    ///
    /// Backend failures never escape: the user gets [`APOLOGY`] and the history still
    /// records both sides of the turn.
    #[instrument(skip(self, message), fields(history_len = self.history.len()))]
    pub async fn chat(&mut self, message: &str) -> String {
        self.history.push(ChatMessage::user(message));

        let reply = match self.respond(message).await {
            Ok(reply) => reply,
            Err(e) if e.is_backend_failure() => {
                warn!("Backend failure during turn: {}", e);
                APOLOGY.to_string()
            }
            Err(e) => {
                error!("Turn failed: {}", e);
                APOLOGY.to_string()
            }
        };

        self.history.push(ChatMessage::assistant(reply.clone()));
        reply
    }

    async fn respond(&mut self, message: &str) -> Result<String, AppError> {
        let classification = self.classifier.classify(message);
        if let Some(state) = classification.emotional_state {
            self.emotional_state = Some(state);
        }
        info!(
            intent = %classification.intent,
            emotional_state = ?self.emotional_state,
            "Classified message"
        );

        if !classification.intent.needs_retrieval() {
            let payload = self
                .composer
                .compose(message, Intent::Casual, &[], None, 0);
            let raw = self.complete(payload.system, payload.user).await?;
            return Ok(scrub_casual(&raw, self.classifier.lexicon()));
        }

        let count = extract_count(message);
        let query = self.embed(message).await?;
        let passages: Vec<Passage> = self
            .index
            .query(&query, count)?
            .into_iter()
            .map(|scored| scored.passage)
            .collect();
        debug!("Retrieved {} passage(s) for {} requested", passages.len(), count);

        let payload = self.composer.compose(
            message,
            classification.intent,
            &passages,
            self.emotional_state,
            count,
        );
        let raw = self.complete(payload.system, payload.user).await?;
        Ok(clean_quote(&raw))
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
        timeout(self.backend_timeout, self.embedder.embed(text)).await?
    }

    async fn complete(&self, system: String, user: String) -> Result<String, AppError> {
        timeout(
            self.backend_timeout,
            self.completer.complete(
                system,
                user,
                Some(self.model.model_id.clone()),
                Some(self.model.temperature),
            ),
        )
        .await?
    }

    /// Clears history and emotional context.
    pub fn reset(&mut self) {
        self.history.clear();
        self.emotional_state = None;
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn emotional_state(&self) -> Option<EmotionalState> {
        self.emotional_state
    }
}

/// A handle to a running session actor.
///
/// The actor drains its mailbox one message at a time, so concurrent callers of
/// [`SessionHandle::chat`] on the same session are served strictly in order.
#[derive(Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionMessage>,
}

impl SessionHandle {
    /// Spawns the actor owning `agent` and returns its handle.
    pub fn spawn(agent: GuidanceAgent) -> Self {
        let (sender, receiver) = mpsc::channel(32);
        let runner = SessionRunner { receiver, agent };
        tokio::spawn(async move { runner.run().await });
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> SessionMessage,
    ) -> Result<T, AppError> {
        let (send, recv) = oneshot::channel();
        self.sender
            .send(build(send))
            .await
            .map_err(|_| AppError::Actor(ActorError::SessionClosed("Session actor closed".to_string())))?;
        recv.await.map_err(|_| {
            AppError::Actor(ActorError::SessionClosed(
                "Session actor failed to respond".to_string(),
            ))
        })
    }

    pub async fn chat(&self, content: impl Into<String>) -> Result<String, AppError> {
        let content = content.into();
        self.request(|responder| SessionMessage::Chat { content, responder })
            .await
    }

    pub async fn reset(&self) -> Result<(), AppError> {
        self.request(|responder| SessionMessage::Reset { responder })
            .await
    }

    pub async fn history(&self) -> Result<Vec<ChatMessage>, AppError> {
        self.request(|responder| SessionMessage::History { responder })
            .await
    }

    pub async fn emotional_state(&self) -> Result<Option<EmotionalState>, AppError> {
        self.request(|responder| SessionMessage::EmotionalState { responder })
            .await
    }

    /// Asks the actor to stop once the messages already queued are handled.
    pub async fn shutdown(&self) -> Result<(), AppError> {
        self.sender
            .send(SessionMessage::Shutdown)
            .await
            .map_err(|_| AppError::Actor(ActorError::SessionClosed("Session actor closed".to_string())))
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

// --- Actor Runner (Internal Logic) ---
struct SessionRunner {
    receiver: mpsc::Receiver<SessionMessage>,
    agent: GuidanceAgent,
}

impl SessionRunner {
    async fn run(mut self) {
        debug!("Session actor started");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                SessionMessage::Chat { content, responder } => {
                    let reply = self.agent.chat(&content).await;
                    let _ = responder.send(reply);
                }
                SessionMessage::Reset { responder } => {
                    self.agent.reset();
                    let _ = responder.send(());
                }
                SessionMessage::History { responder } => {
                    let _ = responder.send(self.agent.history().to_vec());
                }
                SessionMessage::EmotionalState { responder } => {
                    let _ = responder.send(self.agent.emotional_state());
                }
                SessionMessage::Shutdown => break,
            }
        }
        debug!("Session actor stopped");
    }
}

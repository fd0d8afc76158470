use crate::brain::EmotionalState;
use crate::models::ChatMessage;
use serde::Serialize;
use tokio::sync::oneshot;

/// Defines errors that can occur within the actor system.
#[derive(Debug, thiserror::Error, Serialize, Clone)]
pub enum ActorError {
    /// The session actor is gone (shut down or panicked).
    #[error("Session closed: {0}")]
    SessionClosed(String),
    /// A generic internal error within an actor.
    #[error("Internal system error: {0}")]
    Internal(String),
}

// Re-export AppError for convenience
pub use crate::error::AppError;

/// Messages that can be sent to a `SessionActor`.
///
/// The actor handles them one at a time, so turns on a session never overlap.
#[derive(Debug)]
pub enum SessionMessage {
    /// A user turn; the responder receives the reply (or the apology).
    Chat {
        content: String,
        responder: oneshot::Sender<String>,
    },
    /// Clears history and emotional context.
    Reset { responder: oneshot::Sender<()> },
    /// A snapshot of the conversation so far.
    History {
        responder: oneshot::Sender<Vec<ChatMessage>>,
    },
    /// The most recently detected emotional state.
    EmotionalState {
        responder: oneshot::Sender<Option<EmotionalState>>,
    },
    /// Stops the actor after the messages already queued.
    Shutdown,
}

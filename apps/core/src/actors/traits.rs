use crate::actors::messages::AppError;
use async_trait::async_trait;

/// Defines the public interface for an embedding backend.
///
/// This trait abstracts the specific implementation, allowing local (FastEmbed) or
/// remote (Ollama) models to be used interchangeably by the index and the agent.
#[async_trait]
pub trait Embedder: Send + Sync + 'static {
    /// Identifier of the underlying model, part of the index fingerprint.
    fn model_id(&self) -> &str;

    /// Embeds a single text into a fixed-dimension vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError>;

    /// Embeds several texts, preserving order. Backends with native batching override this.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}

/// Defines the public interface for a completion backend.
///
/// One call is one single-turn completion: a system instruction plus a user instruction.
#[async_trait]
pub trait Completer: Send + Sync + 'static {
    /// Generates a complete text response.
    ///
    /// `model` and `temperature` override the backend defaults when provided.
    async fn complete(
        &self,
        system_prompt: String,
        user_prompt: String,
        model: Option<String>,
        temperature: Option<f32>,
    ) -> Result<String, AppError>;
}

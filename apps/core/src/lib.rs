//! Spiritual Quest guidance core.
//!
//! "The Brain" behind the Hidden Words companion: it routes each message to small talk
//! or to retrieval, pulls the closest passages from the corpus, and shapes the prompt
//! sent to the completion backend.

pub mod actors;
pub mod brain;
pub mod config;
pub mod error;
pub mod fs_manager;
pub mod knowledge;
pub mod models;
pub mod preflight;
pub mod telemetry;

pub use actors::session::{GuidanceAgent, SessionHandle, APOLOGY};
pub use actors::supervisor::QuestSupervisor;
pub use config::QuestConfig;
pub use error::AppError;

#[cfg(test)]
mod tests;

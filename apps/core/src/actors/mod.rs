//! Backends, per-session actors and the supervisor that routes between them.

pub mod embedding;
pub mod llm;
pub mod messages;
pub mod session;
pub mod supervisor;
pub mod traits;

//! Brain Module - message understanding and prompt shaping.
//!
//! Provides:
//! - Intent classification (casual / emotional / explicit request)
//! - Quote count extraction
//! - Prompt composition for the completion backend
//! - Post-processing of completion output

pub mod composer;
pub mod intent;
pub mod lexicon;
pub mod postprocess;
pub mod quote_count;

pub use composer::{PromptComposer, PromptPayload};
pub use intent::{Intent, IntentClassifier, IntentPrecedence, IntentResult};
pub use lexicon::{EmotionEntry, EmotionalState, LexiconTables};
pub use postprocess::{clean_quote, scrub_casual};
pub use quote_count::extract_count;

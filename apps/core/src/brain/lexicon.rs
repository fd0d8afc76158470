//! Keyword tables driving intent routing and reply scrubbing.
//!
//! All phrases are matched as lower-case substrings. The tables ship with built-in
//! defaults and can be replaced wholesale from a JSON document.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Named emotional states the classifier can detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionalState {
    Joy,
    Peace,
    Love,
    Gratitude,
    Sadness,
    Anxiety,
    Embarrassment,
    Anger,
    Confusion,
    Struggle,
    Hope,
}

impl EmotionalState {
    pub fn label(&self) -> &'static str {
        match self {
            EmotionalState::Joy => "joy",
            EmotionalState::Peace => "peace",
            EmotionalState::Love => "love",
            EmotionalState::Gratitude => "gratitude",
            EmotionalState::Sadness => "sadness",
            EmotionalState::Anxiety => "anxiety",
            EmotionalState::Embarrassment => "embarrassment",
            EmotionalState::Anger => "anger",
            EmotionalState::Confusion => "confusion",
            EmotionalState::Struggle => "struggle",
            EmotionalState::Hope => "hope",
        }
    }

    /// Positive states get an uplifting acknowledgement, the rest a comforting one.
    pub fn is_positive(&self) -> bool {
        matches!(
            self,
            EmotionalState::Joy
                | EmotionalState::Peace
                | EmotionalState::Love
                | EmotionalState::Gratitude
                | EmotionalState::Hope
        )
    }
}

impl fmt::Display for EmotionalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Trigger phrases for one emotional state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionEntry {
    pub state: EmotionalState,
    pub phrases: Vec<String>,
}

/// The complete set of routing and scrubbing vocabularies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconTables {
    /// Phrases that mark an explicit request for a quote or guidance.
    pub explicit_request: Vec<String>,
    /// Emotional states in priority order; the first state with a matching phrase wins.
    pub emotional_states: Vec<EmotionEntry>,
    /// Lines of a casual reply containing any of these are dropped.
    pub devotional_markers: Vec<String>,
}

fn owned(phrases: &[&str]) -> Vec<String> {
    phrases.iter().map(|p| p.to_string()).collect()
}

impl Default for LexiconTables {
    fn default() -> Self {
        let emotional_states = vec![
            EmotionEntry {
                state: EmotionalState::Joy,
                phrases: owned(&[
                    "happy",
                    "joyful",
                    "uplifting",
                    "good mood",
                    "feeling good",
                    "feeling great",
                    "feeling wonderful",
                    "feeling up",
                ]),
            },
            EmotionEntry {
                state: EmotionalState::Peace,
                phrases: owned(&["peaceful", "calm", "serene", "tranquil", "at peace"]),
            },
            EmotionEntry {
                state: EmotionalState::Love,
                phrases: owned(&["loving", "feeling love", "full of love", "loved"]),
            },
            EmotionEntry {
                state: EmotionalState::Gratitude,
                phrases: owned(&["grateful", "thankful", "blessed", "appreciative"]),
            },
            EmotionEntry {
                state: EmotionalState::Sadness,
                phrases: owned(&[
                    "feeling down",
                    "sad",
                    "depressed",
                    "unhappy",
                    "lonely",
                    "nobody loves me",
                    "not loved",
                ]),
            },
            EmotionEntry {
                state: EmotionalState::Anxiety,
                phrases: owned(&["anxious", "worried", "stressed", "nervous", "afraid", "scared"]),
            },
            EmotionEntry {
                state: EmotionalState::Embarrassment,
                phrases: owned(&["embarrassed", "ashamed", "humiliated", "self-conscious"]),
            },
            EmotionEntry {
                state: EmotionalState::Anger,
                phrases: owned(&["angry", "mad", "frustrated", "irritated", "annoyed"]),
            },
            EmotionEntry {
                state: EmotionalState::Confusion,
                phrases: owned(&[
                    "confused",
                    "lost",
                    "uncertain",
                    "unsure",
                    "don't know what to do",
                ]),
            },
            EmotionEntry {
                state: EmotionalState::Struggle,
                phrases: owned(&["struggling", "difficult", "hard", "challenging", "tough"]),
            },
            EmotionEntry {
                state: EmotionalState::Hope,
                phrases: owned(&[
                    "hopeful",
                    "looking for",
                    "seeking",
                    "want to find",
                    "need guidance",
                ]),
            },
        ];

        Self {
            explicit_request: owned(&[
                "quote",
                "hidden words",
                "spiritual guidance",
                "what does it say",
                "share wisdom",
                "teachings",
                "quotation",
                "retrieve",
                "get",
                "find",
                "show me",
            ]),
            emotional_states,
            devotional_markers: owned(&[
                "hidden words",
                "spiritual",
                "quote",
                "o son of",
                "o friend",
            ]),
        }
    }
}

impl LexiconTables {
    /// Loads tables from a JSON file; sections absent from the file keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Cannot read lexicon file {:?}: {}", path, e))
        })?;
        let mut tables: LexiconTables = serde_json::from_str(&raw)?;
        tables.normalize();
        Ok(tables)
    }

    /// Lower-cases every phrase and drops blanks so matching stays a plain substring test.
    pub fn normalize(&mut self) {
        fn clean(phrases: &mut Vec<String>) {
            for phrase in phrases.iter_mut() {
                *phrase = phrase.trim().to_lowercase();
            }
            phrases.retain(|p| !p.is_empty());
        }
        clean(&mut self.explicit_request);
        clean(&mut self.devotional_markers);
        for entry in &mut self.emotional_states {
            clean(&mut entry.phrases);
        }
    }

    /// First explicit-request phrase contained in `lowered`.
    pub fn match_explicit(&self, lowered: &str) -> Option<&str> {
        self.explicit_request
            .iter()
            .find(|p| lowered.contains(p.as_str()))
            .map(String::as_str)
    }

    /// First emotional state (in table order) with a phrase contained in `lowered`.
    pub fn match_emotion(&self, lowered: &str) -> Option<(EmotionalState, &str)> {
        self.emotional_states.iter().find_map(|entry| {
            entry
                .phrases
                .iter()
                .find(|p| lowered.contains(p.as_str()))
                .map(|p| (entry.state, p.as_str()))
        })
    }

    /// True if `lowered` contains a devotional marker.
    pub fn has_devotional_marker(&self, lowered: &str) -> bool {
        self.devotional_markers
            .iter()
            .any(|m| lowered.contains(m.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_state_order_is_tie_break() {
        let tables = LexiconTables::default();
        // "sad" (sadness) and "anxious" (anxiety): sadness comes first in the table.
        let (state, phrase) = tables.match_emotion("sad and anxious").unwrap();
        assert_eq!(state, EmotionalState::Sadness);
        assert_eq!(phrase, "sad");
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"explicit_request": ["  Verse Please "]}}"#).unwrap();

        let tables = LexiconTables::from_json_file(file.path()).unwrap();
        assert_eq!(tables.explicit_request, vec!["verse please".to_string()]);
        assert_eq!(tables.emotional_states.len(), 11);
        assert!(tables.has_devotional_marker("the hidden words say"));
    }

    #[test]
    fn test_missing_lexicon_file_is_config_error() {
        let err = LexiconTables::from_json_file(Path::new("/nonexistent/lexicon.json"))
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}

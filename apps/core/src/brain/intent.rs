//! Intent Classification using keyword lexicons.
//!
//! Decides whether a message is small talk, emotional sharing, or an explicit request
//! for a passage. Pure substring matching over lower-cased text, no model involved.

use super::lexicon::{EmotionalState, LexiconTables};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Detected intent type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Small talk, answered without any retrieval
    Casual,
    /// The user shared a recognizable emotional state
    Emotional,
    /// The user asked for a quote, the Hidden Words or guidance
    ExplicitRequest,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Intent {
    /// Returns a human-readable label for the intent
    pub fn label(&self) -> &'static str {
        match self {
            Intent::Casual => "casual",
            Intent::Emotional => "emotional",
            Intent::ExplicitRequest => "explicit_request",
        }
    }

    /// Whether answering this intent goes through the embedding index.
    pub fn needs_retrieval(&self) -> bool {
        !matches!(self, Intent::Casual)
    }
}

/// Which lexicon wins when a message matches both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentPrecedence {
    /// "I'm sad, can you give me a quote" is an explicit request.
    #[default]
    ExplicitFirst,
    /// "I'm sad, can you give me a quote" is emotional.
    EmotionalFirst,
}

impl FromStr for IntentPrecedence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "explicit_first" => Ok(IntentPrecedence::ExplicitFirst),
            "emotional_first" => Ok(IntentPrecedence::EmotionalFirst),
            other => Err(format!("unknown intent precedence '{}'", other)),
        }
    }
}

/// Result of intent classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentResult {
    /// Detected intent
    pub intent: Intent,
    /// Emotional state found in the message, whatever the winning intent
    pub emotional_state: Option<EmotionalState>,
    /// The lexicon phrase that decided the intent
    pub matched_trigger: Option<String>,
}

/// Intent classifier over configurable lexicon tables
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    lexicon: Arc<LexiconTables>,
    precedence: IntentPrecedence,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new(Arc::new(LexiconTables::default()), IntentPrecedence::default())
    }
}

impl IntentClassifier {
    pub fn new(lexicon: Arc<LexiconTables>, precedence: IntentPrecedence) -> Self {
        Self {
            lexicon,
            precedence,
        }
    }

    pub fn lexicon(&self) -> &LexiconTables {
        &self.lexicon
    }

    /// Classify the intent of a message
    pub fn classify(&self, message: &str) -> IntentResult {
        let lowered = message.trim().to_lowercase();

        if lowered.is_empty() {
            return IntentResult {
                intent: Intent::Casual,
                emotional_state: None,
                matched_trigger: None,
            };
        }

        let explicit = self.lexicon.match_explicit(&lowered);
        let emotion = self.lexicon.match_emotion(&lowered);
        let emotional_state = emotion.map(|(state, _)| state);

        let explicit_result = explicit.map(|trigger| IntentResult {
            intent: Intent::ExplicitRequest,
            emotional_state,
            matched_trigger: Some(trigger.to_string()),
        });
        let emotional_result = emotion.map(|(state, phrase)| IntentResult {
            intent: Intent::Emotional,
            emotional_state: Some(state),
            matched_trigger: Some(phrase.to_string()),
        });

        let decided = match self.precedence {
            IntentPrecedence::ExplicitFirst => explicit_result.or(emotional_result),
            IntentPrecedence::EmotionalFirst => emotional_result.or(explicit_result),
        };

        decided.unwrap_or(IntentResult {
            intent: Intent::Casual,
            emotional_state: None,
            matched_trigger: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_request_detection() {
        let classifier = IntentClassifier::default();

        let result = classifier.classify("can you share a quote about patience");
        assert_eq!(result.intent, Intent::ExplicitRequest);
        assert_eq!(result.matched_trigger.as_deref(), Some("quote"));

        let result = classifier.classify("What do the Hidden Words say about love?");
        assert_eq!(result.intent, Intent::ExplicitRequest);
    }

    #[test]
    fn test_emotional_detection() {
        let classifier = IntentClassifier::default();

        let result = classifier.classify("I'm feeling really anxious today");
        assert_eq!(result.intent, Intent::Emotional);
        assert_eq!(result.emotional_state, Some(EmotionalState::Anxiety));
    }

    #[test]
    fn test_casual_detection() {
        let classifier = IntentClassifier::default();

        let result = classifier.classify("hey, how's it going?");
        assert_eq!(result.intent, Intent::Casual);
        assert_eq!(result.emotional_state, None);

        let result = classifier.classify("   ");
        assert_eq!(result.intent, Intent::Casual);
    }

    #[test]
    fn test_explicit_request_wins_by_default() {
        let classifier = IntentClassifier::default();

        let result = classifier.classify("I'm sad, can you give me a quote about it");
        assert_eq!(result.intent, Intent::ExplicitRequest);
        assert_eq!(result.emotional_state, Some(EmotionalState::Sadness));
    }

    #[test]
    fn test_emotional_first_precedence() {
        let classifier = IntentClassifier::new(
            Arc::new(LexiconTables::default()),
            IntentPrecedence::EmotionalFirst,
        );

        let result = classifier.classify("I'm sad, can you give me a quote about it");
        assert_eq!(result.intent, Intent::Emotional);
        assert_eq!(result.matched_trigger.as_deref(), Some("sad"));
    }

    #[test]
    fn test_precedence_parsing() {
        assert_eq!(
            "Emotional_First".parse::<IntentPrecedence>().unwrap(),
            IntentPrecedence::EmotionalFirst
        );
        assert!("loudest".parse::<IntentPrecedence>().is_err());
    }
}

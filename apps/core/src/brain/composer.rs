//! Prompt Composer - builds the instruction pair sent to the completion backend.
//!
//! Casual turns get a strict small-talk instruction with no passages at all. Wisdom
//! turns get the retrieved passages and a quote budget that never exceeds what was
//! actually retrieved.

use super::intent::Intent;
use super::lexicon::EmotionalState;
use super::quote_count::MAX_QUOTES;
use crate::models::Passage;
use serde::{Deserialize, Serialize};

/// The system and user instructions for one completion call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptPayload {
    pub system: String,
    pub user: String,
    /// Number of passages the backend was asked to quote.
    pub quotes_requested: usize,
}

const CASUAL_SYSTEM_PROMPT: &str = "You are a normal, friendly person having a casual conversation. \
Keep it light and natural.

ABSOLUTE RULES:
- Respond only with everyday conversation.
- Never share quotes, scripture, prayers or spiritual guidance.
- Never mention The Hidden Words or anything spiritual.
- If the user shares a feeling, offer plain human empathy and ask about it.";

#[derive(Debug, Clone, Default)]
pub struct PromptComposer;

impl PromptComposer {
    pub fn new() -> Self {
        Self
    }

    /// Builds the payload for one turn.
    ///
    /// `passages` is the retrieved set; it is ignored for casual turns.
    pub fn compose(
        &self,
        message: &str,
        intent: Intent,
        passages: &[Passage],
        emotional_state: Option<EmotionalState>,
        quote_count: usize,
    ) -> PromptPayload {
        match intent {
            Intent::Casual => self.compose_casual(message),
            Intent::Emotional | Intent::ExplicitRequest => {
                self.compose_wisdom(message, passages, emotional_state, quote_count)
            }
        }
    }

    fn compose_casual(&self, message: &str) -> PromptPayload {
        PromptPayload {
            system: CASUAL_SYSTEM_PROMPT.to_string(),
            user: message.to_string(),
            quotes_requested: 0,
        }
    }

    fn compose_wisdom(
        &self,
        message: &str,
        passages: &[Passage],
        emotional_state: Option<EmotionalState>,
        quote_count: usize,
    ) -> PromptPayload {
        // Never ask for more passages than were retrieved.
        let quotes = quote_count.clamp(1, MAX_QUOTES).min(passages.len());
        let state_label = emotional_state.map(|s| s.label()).unwrap_or("none");

        let acknowledgement = match emotional_state {
            Some(state) if state.is_positive() => format!(
                "The user feels {}. Begin by warmly acknowledging that feeling.",
                state
            ),
            Some(state) => format!(
                "The user is experiencing {}. Begin by acknowledging that feeling with empathy.",
                state
            ),
            None => "No particular emotional state was detected; do not invent one.".to_string(),
        };

        let system = if quotes == 0 {
            format!(
                "You are a gentle companion.\n\
                 1. {}\n\
                 2. No passages are available for this request. Do not quote, paraphrase or invent any scripture.\n\
                 3. Offer a short, kind reply in ordinary language.",
                acknowledgement
            )
        } else {
            format!(
                "You are a spiritual guide sharing wisdom from The Hidden Words.\n\
                 1. {}\n\
                 2. Share exactly {} passage(s), chosen only from the passages supplied by the user message, \
                 copied verbatim and without verse numbers.\n\
                 3. If more than one passage is shared, separate them with a blank line.\n\
                 4. Add no explanation or commentary unless explicitly asked.\n\
                 5. Afterwards, return to a normal conversational tone.",
                acknowledgement, quotes
            )
        };

        let mut user = format!(
            "Message: {}\nEmotional state: {}\n",
            message.trim(),
            state_label
        );
        if quotes > 0 {
            user.push_str("Relevant passages:\n");
            for passage in passages.iter().take(MAX_QUOTES) {
                user.push_str(&passage.text);
                user.push_str("\n\n");
            }
            user.push_str(&format!(
                "Please reply naturally with {} of these passage(s), removing any verse numbers.",
                quotes
            ));
        } else {
            user.push_str("Relevant passages: none");
        }

        PromptPayload {
            system,
            user,
            quotes_requested: quotes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passages(n: usize) -> Vec<Passage> {
        (0..n)
            .map(|id| Passage {
                id,
                text: format!("{} O Son of Being! passage number {}", id + 1, id),
            })
            .collect()
    }

    #[test]
    fn test_casual_prompt_has_no_passages() {
        let payload =
            PromptComposer::new().compose("hi there", Intent::Casual, &passages(3), None, 1);

        assert_eq!(payload.quotes_requested, 0);
        assert_eq!(payload.user, "hi there");
        assert!(!payload.system.contains("O Son of Being"));
        assert!(!payload.user.contains("O Son of Being"));
        assert!(payload.system.contains("Never share quotes"));
    }

    #[test]
    fn test_wisdom_prompt_embeds_message_state_and_passages() {
        let payload = PromptComposer::new().compose(
            "I feel lonely, any quote?",
            Intent::ExplicitRequest,
            &passages(2),
            Some(EmotionalState::Sadness),
            2,
        );

        assert_eq!(payload.quotes_requested, 2);
        assert!(payload.system.contains("exactly 2 passage(s)"));
        assert!(payload.system.contains("sadness"));
        assert!(payload.user.contains("Message: I feel lonely, any quote?"));
        assert!(payload.user.contains("Emotional state: sadness"));
        assert!(payload.user.contains("passage number 0"));
        assert!(payload.user.contains("passage number 1"));
    }

    #[test]
    fn test_quote_count_is_capped_by_retrieved_passages() {
        let payload = PromptComposer::new().compose(
            "five quotes please",
            Intent::ExplicitRequest,
            &passages(2),
            None,
            5,
        );

        assert_eq!(payload.quotes_requested, 2);
        assert!(payload.system.contains("exactly 2 passage(s)"));
        assert!(payload.user.contains("Emotional state: none"));
    }

    #[test]
    fn test_no_passages_requests_no_quotes() {
        let payload = PromptComposer::new().compose(
            "I'm worried",
            Intent::Emotional,
            &[],
            Some(EmotionalState::Anxiety),
            1,
        );

        assert_eq!(payload.quotes_requested, 0);
        assert!(payload.system.contains("Do not quote"));
        assert!(payload.user.contains("Relevant passages: none"));
    }
}

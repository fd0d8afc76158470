//! Shared test doubles: a deterministic embedder, a scripted completer and a small corpus.

use crate::actors::messages::{ActorError, AppError};
use crate::actors::traits::{Completer, Embedder};
use crate::config::QuestConfig;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::{sleep, Duration};

/// Ten numbered passages, separated by blank lines the way the real corpus is.
pub const CORPUS: &str = "\
1 O Son of Spirit! My first counsel is this: Possess a pure, kindly and radiant heart.

2 O Son of Spirit! The best beloved of all things in My sight is Justice.

3 O Son of Man! I loved thy creation, hence I created thee. Wherefore, do thou love Me.

4 O Son of Being! Love Me, that I may love thee. If thou lovest Me not, My love can in no wise reach thee.

5 O Son of Being! Walk in My statutes for love of Me and deny thyself that which thou desirest.

6 O Son of Man! Rejoice in the gladness of thine heart, that thou mayest be worthy to meet Me.

7 O Son of Man! Be patient in adversity and sorrow, for patience is the gate of peace.

8 O Friend! In the garden of thy heart plant naught but the rose of love.

9 O Son of Dust! Blind thine eyes, that thou mayest behold My beauty.

10 O Son of Spirit! There is no peace for thee save by renouncing thyself and turning unto Me.
";

pub const CORPUS_LEN: usize = 10;

/// Writes [`CORPUS`] into `dir` and returns its path.
pub fn write_corpus(dir: &Path) -> PathBuf {
    let path = dir.join("hidden_words.txt");
    std::fs::write(&path, CORPUS).expect("Failed to write corpus");
    path
}

/// A config rooted in `dir` with the fixture corpus and a short backend timeout.
pub fn test_config(dir: &Path) -> QuestConfig {
    let mut config = QuestConfig::with_data_dir(dir.join("data"));
    config.corpus_path = write_corpus(dir);
    config.backend_timeout = Duration::from_millis(500);
    config
}

/// Corpus passage texts with their verse numbers stripped.
pub fn clean_corpus_texts() -> Vec<String> {
    crate::knowledge::CorpusStore::parse(CORPUS)
        .into_iter()
        .map(|p| crate::brain::clean_quote(&p.text))
        .collect()
}

const VOCABULARY: [&str; 10] = [
    "love", "heart", "peace", "patien", "justice", "spirit", "being", "man", "dust", "friend",
];

/// Bag-of-keywords embedder: deterministic, no model download.
pub struct KeywordEmbedder {
    pub calls: Arc<AtomicUsize>,
    pub fail: bool,
    pub delay: Option<Duration>,
}

impl KeywordEmbedder {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            fail: false,
            delay: None,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn vector(text: &str) -> Vec<f32> {
        let lowered = text.to_lowercase();
        let mut vector: Vec<f32> = VOCABULARY
            .iter()
            .map(|word| lowered.matches(word).count() as f32)
            .collect();
        // Constant component keeps every vector non-zero.
        vector.push(0.5);
        vector
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    fn model_id(&self) -> &str {
        "keyword-test"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            sleep(delay).await;
        }
        if self.fail {
            return Err(AppError::BackendUnavailable("Mock embedder down".to_string()));
        }
        Ok(Self::vector(text))
    }
}

/// One recorded completion call.
#[derive(Debug, Clone)]
pub struct PromptCall {
    pub system: String,
    pub user: String,
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

pub const CASUAL_REPLY: &str = "Hey! Nice to hear from you.\n\
The Hidden Words have a lot to say about that.\n\
How has your week been?";

/// Completer that behaves like an obedient model.
///
/// Wisdom prompts are answered with the first N supplied passages, verse numbers and all,
/// so the post-processor has something to strip. Casual prompts get [`CASUAL_REPLY`],
/// which leaks one devotional line.
pub struct ScriptedCompleter {
    pub calls: Arc<Mutex<Vec<PromptCall>>>,
    pub fail: bool,
    pub delay: Option<Duration>,
}

impl ScriptedCompleter {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            fail: false,
            delay: None,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }

    pub fn recorded(&self) -> Vec<PromptCall> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(user: &str) -> String {
        let Some((_, rest)) = user.split_once("Relevant passages:\n") else {
            return CASUAL_REPLY.to_string();
        };
        let Some((block, tail)) = rest.split_once("Please reply naturally with ") else {
            return "I hear you.".to_string();
        };
        let count: usize = tail
            .split_whitespace()
            .next()
            .and_then(|n| n.parse().ok())
            .unwrap_or(1);
        block
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .take(count)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[async_trait]
impl Completer for ScriptedCompleter {
    async fn complete(
        &self,
        system_prompt: String,
        user_prompt: String,
        model: Option<String>,
        temperature: Option<f32>,
    ) -> Result<String, AppError> {
        self.calls.lock().unwrap().push(PromptCall {
            system: system_prompt,
            user: user_prompt.clone(),
            model,
            temperature,
        });
        if let Some(delay) = self.delay {
            sleep(delay).await;
        }
        if self.fail {
            return Err(AppError::BackendUnavailable("Mock completer down".to_string()));
        }
        Ok(Self::answer(&user_prompt))
    }
}

/// Completer whose failure is not a backend failure, to exercise the catch-all path.
pub struct BrokenCompleter;

#[async_trait]
impl Completer for BrokenCompleter {
    async fn complete(
        &self,
        _system_prompt: String,
        _user_prompt: String,
        _model: Option<String>,
        _temperature: Option<f32>,
    ) -> Result<String, AppError> {
        Err(AppError::Actor(ActorError::Internal("Mock failure".to_string())))
    }
}

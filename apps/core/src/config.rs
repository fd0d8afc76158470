use crate::actors::llm::{OLLAMA_API_BASE, OPENROUTER_API_BASE};
use crate::brain::{IntentClassifier, IntentPrecedence, LexiconTables};
use crate::error::AppError;
use crate::fs_manager::PortablePathManager;
use crate::models::ModelConfig;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use url::Url;
use validator::Validate;

/// Which completion API the agent talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    #[default]
    Ollama,
    /// Any OpenAI-compatible chat completions endpoint (OpenRouter, llama.cpp server).
    OpenAi,
}

impl LlmProvider {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            LlmProvider::Ollama => OLLAMA_API_BASE,
            LlmProvider::OpenAi => OPENROUTER_API_BASE,
        }
    }
}

impl FromStr for LlmProvider {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(LlmProvider::Ollama),
            "openai" | "openrouter" => Ok(LlmProvider::OpenAi),
            other => Err(AppError::Config(format!("Unknown LLM provider '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbeddingProvider {
    #[default]
    FastEmbed,
    Ollama,
}

impl FromStr for EmbeddingProvider {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fastembed" => Ok(EmbeddingProvider::FastEmbed),
            "ollama" => Ok(EmbeddingProvider::Ollama),
            other => Err(AppError::Config(format!(
                "Unknown embedding provider '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" | "bunyan" => Ok(LogFormat::Json),
            other => Err(AppError::Config(format!("Unknown log format '{}'", other))),
        }
    }
}

/// Runtime configuration, read from the environment (and `.env`) at startup.
#[derive(Debug, Clone, Validate)]
pub struct QuestConfig {
    pub data_dir: PathBuf,
    pub corpus_path: PathBuf,
    pub lexicon_path: Option<PathBuf>,
    pub intent_precedence: IntentPrecedence,
    pub llm_provider: LlmProvider,
    #[validate(url)]
    pub llm_base_url: String,
    pub llm_api_key: Option<String>,
    #[validate(nested)]
    pub model: ModelConfig,
    pub embed_provider: EmbeddingProvider,
    #[validate(length(min = 1))]
    pub embed_model: String,
    #[validate(url)]
    pub embed_base_url: String,
    pub backend_timeout: Duration,
    pub log_format: LogFormat,
}

impl Default for QuestConfig {
    fn default() -> Self {
        Self::with_data_dir("./data")
    }
}

fn var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>, AppError>
where
    T::Err: std::fmt::Display,
{
    var(name)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| AppError::Config(format!("Invalid {}='{}': {}", name, raw, e)))
        })
        .transpose()
}

impl QuestConfig {
    /// Defaults rooted at `data_dir`: local Ollama chat, FastEmbed embeddings.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let paths = PortablePathManager::new(data_dir.clone());
        Self {
            corpus_path: paths.default_corpus_path(),
            data_dir,
            lexicon_path: None,
            intent_precedence: IntentPrecedence::default(),
            llm_provider: LlmProvider::default(),
            llm_base_url: OLLAMA_API_BASE.to_string(),
            llm_api_key: None,
            model: ModelConfig::default(),
            embed_provider: EmbeddingProvider::default(),
            embed_model: "nomic-embed-text".to_string(),
            embed_base_url: OLLAMA_API_BASE.to_string(),
            backend_timeout: Duration::from_secs(30),
            log_format: LogFormat::default(),
        }
    }

    /// Loads `.env` if present, then reads every `QUEST_*` variable over the defaults.
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenv::dotenv();
        Self::from_current_env()
    }

    /// Same as [`QuestConfig::from_env`] without touching `.env`.
    pub fn from_current_env() -> Result<Self, AppError> {
        let data_dir = var("QUEST_DATA_DIR").unwrap_or_else(|| "./data".to_string());
        let mut config = Self::with_data_dir(data_dir);

        if let Some(path) = var("QUEST_CORPUS_PATH") {
            config.corpus_path = PathBuf::from(path);
        }
        config.lexicon_path = var("QUEST_LEXICON_PATH").map(PathBuf::from);
        if let Some(precedence) = parse_var::<IntentPrecedence>("QUEST_INTENT_PRECEDENCE")? {
            config.intent_precedence = precedence;
        }

        if let Some(provider) = parse_var::<LlmProvider>("QUEST_LLM_PROVIDER")? {
            config.llm_provider = provider;
        }
        config.llm_base_url = var("QUEST_LLM_BASE_URL")
            .unwrap_or_else(|| config.llm_provider.default_base_url().to_string());
        config.llm_api_key = var("QUEST_LLM_API_KEY").or_else(|| var("OPENROUTER_API_KEY"));
        if let Some(model) = var("QUEST_LLM_MODEL") {
            config.model.model_id = model;
        }
        if let Some(temperature) = parse_var::<f32>("QUEST_TEMPERATURE")? {
            config.model.temperature = temperature;
        }

        if let Some(provider) = parse_var::<EmbeddingProvider>("QUEST_EMBED_PROVIDER")? {
            config.embed_provider = provider;
        }
        if let Some(model) = var("QUEST_EMBED_MODEL") {
            config.embed_model = model;
        }
        if let Some(url) = var("QUEST_EMBED_BASE_URL") {
            config.embed_base_url = url;
        }

        if let Some(secs) = parse_var::<u64>("QUEST_BACKEND_TIMEOUT_SECS")? {
            if secs == 0 {
                return Err(AppError::Config(
                    "QUEST_BACKEND_TIMEOUT_SECS must be at least 1".to_string(),
                ));
            }
            config.backend_timeout = Duration::from_secs(secs);
        }
        if let Some(format) = parse_var::<LogFormat>("QUEST_LOG_FORMAT")? {
            config.log_format = format;
        }

        config.check()?;
        info!(
            "Configuration loaded: llm={:?} model={} embed={:?}",
            config.llm_provider, config.model.model_id, config.embed_provider
        );
        Ok(config)
    }

    /// Validates field constraints and that both base URLs parse.
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()?;
        Url::parse(&self.llm_base_url)?;
        Url::parse(&self.embed_base_url)?;
        Ok(())
    }

    pub fn paths(&self) -> PortablePathManager {
        PortablePathManager::new(self.data_dir.clone())
    }

    pub fn index_cache_path(&self) -> PathBuf {
        self.paths().index_cache_path(&self.corpus_path)
    }

    /// The built-in lexicon, or the JSON override when one is configured.
    pub fn load_lexicon(&self) -> Result<LexiconTables, AppError> {
        match &self.lexicon_path {
            Some(path) => LexiconTables::from_json_file(path),
            None => Ok(LexiconTables::default()),
        }
    }

    pub fn classifier(&self) -> Result<IntentClassifier, AppError> {
        Ok(IntentClassifier::new(
            Arc::new(self.load_lexicon()?),
            self.intent_precedence,
        ))
    }
}

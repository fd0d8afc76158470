//! Preflight Check System
//!
//! Health checks run before the agent bootstraps. Only the corpus check is critical;
//! an unreachable backend still lets the agent start (turns will apologize).

use crate::actors::llm::http_client;
use crate::config::{EmbeddingProvider, LlmProvider, QuestConfig};
use crate::knowledge::CorpusStore;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

// --- Constants ---
const BACKEND_HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of a single check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub message: String,
    pub details: Option<String>,
}

impl CheckResult {
    fn pass(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            message: message.to_string(),
            details: None,
        }
    }

    fn fail(name: &str, message: &str, details: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            message: message.to_string(),
            details,
        }
    }
}

/// Complete preflight check report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreflightReport {
    pub all_passed: bool,
    pub checks: Vec<CheckResult>,
    pub ready_to_start: bool,
    pub summary: String,
}

impl PreflightReport {
    fn from_checks(checks: Vec<CheckResult>) -> Self {
        let all_passed = checks.iter().all(|c| c.passed);
        let critical_passed = checks
            .iter()
            .filter(|c| is_critical_check(&c.name))
            .all(|c| c.passed);

        let summary = if all_passed {
            "All checks passed. System ready.".to_string()
        } else if critical_passed {
            "Some non-critical checks failed. System can start with warnings.".to_string()
        } else {
            "Critical checks failed. System cannot start.".to_string()
        };

        Self {
            all_passed,
            checks,
            ready_to_start: critical_passed,
            summary,
        }
    }

    pub fn check(&self, name: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.name == name)
    }
}

/// Performs all preflight checks, including backend reachability.
pub async fn run_preflight_checks(config: &QuestConfig) -> PreflightReport {
    info!("Running preflight checks");

    let mut checks = vec![check_directories(config), check_corpus(config)];
    checks.push(check_llm_backend(config).await);
    if config.embed_provider == EmbeddingProvider::Ollama {
        checks.push(check_embedding_backend(config).await);
    }

    let report = PreflightReport::from_checks(checks);
    log_report(&report);
    report
}

/// Quick check - local files only, no network
pub fn quick_preflight_check(config: &QuestConfig) -> PreflightReport {
    PreflightReport::from_checks(vec![check_directories(config), check_corpus(config)])
}

fn log_report(report: &PreflightReport) {
    for check in &report.checks {
        if check.passed {
            info!("  [ok] {}: {}", check.name, check.message);
        } else {
            warn!("  [fail] {}: {}", check.name, check.message);
            if let Some(details) = &check.details {
                warn!("      Details: {}", details);
            }
        }
    }
    info!("Summary: {}", report.summary);
}

fn is_critical_check(name: &str) -> bool {
    matches!(name, "corpus")
}

// --- Individual Checks ---

fn check_directories(config: &QuestConfig) -> CheckResult {
    match config.paths().init() {
        Ok(()) => CheckResult::pass(
            "directories",
            &format!("Data directory ready at {:?}", config.data_dir),
        ),
        Err(e) => CheckResult::fail(
            "directories",
            "Failed to create data directories",
            Some(e.to_string()),
        ),
    }
}

fn check_corpus(config: &QuestConfig) -> CheckResult {
    match CorpusStore::load(&config.corpus_path) {
        Ok(passages) => CheckResult::pass(
            "corpus",
            &format!("{} passages in {:?}", passages.len(), config.corpus_path),
        ),
        Err(e) => CheckResult::fail("corpus", "Corpus unusable", Some(e.to_string())),
    }
}

async fn check_llm_backend(config: &QuestConfig) -> CheckResult {
    let base = config.llm_base_url.trim_end_matches('/');
    let url = match config.llm_provider {
        LlmProvider::Ollama => format!("{}/api/tags", base),
        LlmProvider::OpenAi => format!("{}/models", base),
    };
    probe("llm_backend", &url, config.llm_api_key.as_deref()).await
}

async fn check_embedding_backend(config: &QuestConfig) -> CheckResult {
    let url = format!("{}/api/tags", config.embed_base_url.trim_end_matches('/'));
    probe("embedding_backend", &url, None).await
}

async fn probe(name: &str, url: &str, api_key: Option<&str>) -> CheckResult {
    let client = match http_client(BACKEND_HEALTH_TIMEOUT) {
        Ok(client) => client,
        Err(e) => return CheckResult::fail(name, "HTTP client unavailable", Some(e.to_string())),
    };

    let mut request = client.get(url);
    if let Some(key) = api_key {
        request = request.bearer_auth(key);
    }

    match request.send().await {
        Ok(res) if res.status().is_success() => {
            CheckResult::pass(name, &format!("Reachable at {}", url))
        }
        Ok(res) => CheckResult::fail(
            name,
            &format!("Unexpected status {}", res.status()),
            Some(url.to_string()),
        ),
        Err(e) => CheckResult::fail(name, "Not reachable", Some(e.to_string())),
    }
}

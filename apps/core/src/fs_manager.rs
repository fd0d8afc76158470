use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// File layout under the configured data directory.
///
/// ```text
/// {data}/hidden_words.txt        default corpus
/// {data}/models/embeddings       FastEmbed ONNX cache
/// {data}/index/hidden_words.json persisted embedding index
/// ```
#[derive(Debug, Clone)]
pub struct PortablePathManager {
    root: PathBuf,
}

impl PortablePathManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root data directory.
    pub fn data_dir(&self) -> &Path {
        &self.root
    }

    /// Directory for downloaded model files.
    pub fn models_dir(&self) -> PathBuf {
        self.root.join("models")
    }

    /// Cache directory used by the local embedding model.
    pub fn embeddings_dir(&self) -> PathBuf {
        self.models_dir().join("embeddings")
    }

    /// Directory holding persisted embedding indexes.
    pub fn index_dir(&self) -> PathBuf {
        self.root.join("index")
    }

    /// Location of the persisted index for a corpus file.
    pub fn index_cache_path(&self, corpus_path: &Path) -> PathBuf {
        let stem = corpus_path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("corpus");
        self.index_dir().join(format!("{}.json", stem))
    }

    /// Corpus used when none is configured.
    pub fn default_corpus_path(&self) -> PathBuf {
        self.root.join("hidden_words.txt")
    }

    /// Creates the data, models and index directories if they are missing.
    pub fn init(&self) -> Result<(), std::io::Error> {
        for dir in [self.root.clone(), self.models_dir(), self.index_dir()] {
            if !dir.exists() {
                info!("Creating directory: {:?}", dir);
                fs::create_dir_all(&dir)?;
            }
        }
        Ok(())
    }
}

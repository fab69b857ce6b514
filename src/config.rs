use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::RagError;

/// Top-level configuration for one pipeline run.
///
/// Loaded from a YAML file; every field has a default so a missing file or a
/// partial file is fine. The file path comes from `RAGLINE_CONFIG` when set,
/// otherwise `./ragline.yml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub qdrant: QdrantConfig,
    pub ollama: OllamaConfig,
    pub corpus: CorpusConfig,
    pub retrieval: RetrievalConfig,
    pub prompt: PromptConfig,
    pub generate: GenerateConfig,
    pub logging: LoggingConfig,
}

/// Vector index connection and collection shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QdrantConfig {
    /// REST endpoint (default: http://localhost:6333)
    pub url: String,
    /// Collection name
    pub collection: String,
    /// Vector dimensionality; must match the embedding model's output
    pub vector_size: usize,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6333".to_string(),
            collection: "ragline".to_string(),
            vector_size: 4096,
        }
    }
}

/// Ollama-style API endpoint and model names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// API base (default: http://127.0.0.1:11434/api)
    pub base_url: String,
    pub embedding_model: String,
    pub completion_model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434/api".to_string(),
            embedding_model: "mistral:latest".to_string(),
            completion_model: "mistral:latest".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Plain-text input file, paragraphs separated by a blank line
    pub path: PathBuf,
    /// Embedding requests in flight at once; chunk order is preserved
    pub embed_concurrency: usize,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("corpus.txt"),
            embed_concurrency: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of nearest neighbors to retrieve
    pub top_k: usize,
    /// Query text; the first CLI argument overrides this
    pub query: Option<String>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 9,
            query: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// System prompt interpolated ahead of the retrieved context
    pub system: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system: "You are a helpful assistant. Answer using only the provided context."
                .to_string(),
        }
    }
}

/// Optional final generation step. Off by default: the run then ends by
/// printing the assembled prompt.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GenerateConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for the append-only log file (ragline.log)
    pub dir: PathBuf,
    /// Default tracing filter; RUST_LOG overrides it
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, RagError> {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, RagError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        serde_yaml::from_str(&contents)
            .map_err(|e| RagError::Config(format!("{}: {}", path.display(), e)))
    }
}

fn config_path() -> PathBuf {
    if let Ok(path) = env::var("RAGLINE_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("ragline.yml")
}

//! Client for an Ollama-style embedding and text-generation API.

pub mod ollama;
pub mod types;

pub use ollama::OllamaClient;

use async_trait::async_trait;

use crate::errors::RagError;

/// Embedding backend seam. The pipeline only needs this one operation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed one text into a fixed-length vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError>;
}

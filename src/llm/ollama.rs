use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::OllamaConfig;
use crate::errors::RagError;

use super::types::{EmbedRequest, GenerateFragment, GenerateRequest};
use super::Embedder;

#[derive(Clone)]
pub struct OllamaClient {
    base_url: String,
    client: Client,
    embedding_model: String,
    completion_model: String,
}

impl OllamaClient {
    pub fn new(config: &OllamaConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
            embedding_model: config.embedding_model.clone(),
            completion_model: config.completion_model.clone(),
        }
    }

    /// Embed a single text. The endpoint returns a batch shape; the first
    /// row is used.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError> {
        let url = format!("{}/embed", self.base_url);
        let body = EmbedRequest {
            model: &self.embedding_model,
            input: text,
        };

        let res = self.client.post(&url).json(&body).send().await?;
        let status = res.status();
        if !status.is_success() {
            let message = res.text().await.unwrap_or_default();
            return Err(RagError::Service {
                service: "embedding",
                status: status.as_u16(),
                message,
            });
        }

        let payload: Value = res
            .json()
            .await
            .map_err(|e| RagError::invalid_response("embedding", e.to_string()))?;
        parse_embedding(&payload)
    }

    /// Generate a completion for the prompt, accumulating the streamed
    /// fragments until one signals completion. The rest of the stream is
    /// not drained.
    pub async fn complete(&self, prompt: &str) -> Result<String, RagError> {
        let url = format!("{}/generate", self.base_url);
        let body = GenerateRequest {
            model: &self.completion_model,
            prompt,
        };

        let mut res = self.client.post(&url).json(&body).send().await?;
        let status = res.status();
        if !status.is_success() {
            let message = res.text().await.unwrap_or_default();
            return Err(RagError::Service {
                service: "completion",
                status: status.as_u16(),
                message,
            });
        }

        let mut decoder = FragmentDecoder::new();
        while !decoder.is_done() {
            match res.chunk().await? {
                Some(bytes) => decoder.push(&bytes)?,
                None => break,
            }
        }
        decoder.finish()
    }
}

#[async_trait]
impl Embedder for OllamaClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError> {
        OllamaClient::embed(self, text).await
    }
}

fn parse_embedding(payload: &Value) -> Result<Vec<f32>, RagError> {
    let rows = payload
        .get("embeddings")
        .and_then(Value::as_array)
        .ok_or_else(|| RagError::invalid_response("embedding", "missing embeddings field"))?;
    let first = rows
        .first()
        .ok_or_else(|| RagError::invalid_response("embedding", "empty embeddings list"))?;
    let values = first
        .as_array()
        .ok_or_else(|| RagError::invalid_response("embedding", "embedding is not an array"))?;

    values
        .iter()
        .map(|v| {
            v.as_f64().map(|f| f as f32).ok_or_else(|| {
                RagError::invalid_response("embedding", "embedding contains a non-numeric value")
            })
        })
        .collect()
}

/// Incremental decoder for the newline-delimited generation stream.
///
/// Transport chunks do not align with line boundaries, so partial lines are
/// buffered. Once a fragment carries the completion flag, later input is
/// ignored.
#[derive(Default)]
struct FragmentDecoder {
    buf: String,
    text: String,
    done: bool,
}

impl FragmentDecoder {
    fn new() -> Self {
        Self::default()
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn push(&mut self, bytes: &[u8]) -> Result<(), RagError> {
        if self.done {
            return Ok(());
        }
        self.buf.push_str(&String::from_utf8_lossy(bytes));

        while let Some(pos) = self.buf.find('\n') {
            let line: String = self.buf.drain(..=pos).collect();
            self.apply_line(line.trim())?;
            if self.done {
                break;
            }
        }
        Ok(())
    }

    fn apply_line(&mut self, line: &str) -> Result<(), RagError> {
        if self.done || line.is_empty() {
            return Ok(());
        }
        let fragment: GenerateFragment = serde_json::from_str(line)
            .map_err(|e| RagError::invalid_response("completion", e.to_string()))?;
        self.text.push_str(&fragment.response);
        if fragment.done {
            self.done = true;
        }
        Ok(())
    }

    fn finish(mut self) -> Result<String, RagError> {
        if !self.done {
            let rest = std::mem::take(&mut self.buf);
            self.apply_line(rest.trim())?;
        }
        Ok(self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_embedding_takes_the_first_row() {
        let payload = json!({ "embeddings": [[0.1, 0.2, 0.3], [9.0, 9.0, 9.0]] });
        let embedding = parse_embedding(&payload).unwrap();
        assert_eq!(embedding.len(), 3);
        assert!((embedding[1] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn parse_embedding_rejects_missing_field() {
        let payload = json!({ "model": "mistral:latest" });
        let result = parse_embedding(&payload);
        assert!(matches!(result, Err(RagError::InvalidResponse { .. })));
    }

    #[test]
    fn parse_embedding_rejects_empty_list() {
        let payload = json!({ "embeddings": [] });
        let result = parse_embedding(&payload);
        assert!(matches!(result, Err(RagError::InvalidResponse { .. })));
    }

    #[test]
    fn parse_embedding_rejects_non_numeric_values() {
        let payload = json!({ "embeddings": [[0.1, "oops", 0.3]] });
        let result = parse_embedding(&payload);
        assert!(matches!(result, Err(RagError::InvalidResponse { .. })));
    }

    #[test]
    fn decoder_accumulates_fragments_in_order() {
        let mut decoder = FragmentDecoder::new();
        decoder
            .push(b"{\"response\":\"Hello\",\"done\":false}\n")
            .unwrap();
        decoder
            .push(b"{\"response\":\" world\",\"done\":true}\n")
            .unwrap();
        assert!(decoder.is_done());
        assert_eq!(decoder.finish().unwrap(), "Hello world");
    }

    #[test]
    fn decoder_ignores_lines_after_the_terminal_fragment() {
        let mut decoder = FragmentDecoder::new();
        decoder
            .push(b"{\"response\":\"done\",\"done\":true}\n{\"response\":\"extra\",\"done\":false}\n")
            .unwrap();
        decoder.push(b"{\"response\":\"more\"}\n").unwrap();
        assert_eq!(decoder.finish().unwrap(), "done");
    }

    #[test]
    fn decoder_handles_lines_split_across_chunks() {
        let mut decoder = FragmentDecoder::new();
        decoder.push(b"{\"response\":\"par").unwrap();
        decoder.push(b"tial\",\"done\":false}\n").unwrap();
        decoder.push(b"{\"response\":\"!\",\"done\":true}\n").unwrap();
        assert_eq!(decoder.finish().unwrap(), "partial!");
    }

    #[test]
    fn decoder_flushes_a_trailing_line_without_newline() {
        let mut decoder = FragmentDecoder::new();
        decoder.push(b"{\"response\":\"tail\",\"done\":true}").unwrap();
        assert_eq!(decoder.finish().unwrap(), "tail");
    }

    #[test]
    fn decoder_rejects_non_json_lines() {
        let mut decoder = FragmentDecoder::new();
        let result = decoder.push(b"not json\n");
        assert!(matches!(result, Err(RagError::InvalidResponse { .. })));
    }

    #[tokio::test]
    #[ignore]
    async fn live_embed_against_local_ollama() {
        let client = OllamaClient::new(&crate::config::OllamaConfig::default());
        let embedding = client.embed("Why is the sky blue?").await.unwrap();
        assert!(!embedding.is_empty());
    }
}

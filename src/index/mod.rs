//! Vector index abstraction and the Qdrant-backed implementation.
//!
//! The pipeline talks to the index through the `VectorIndex` trait:
//! idempotent collection setup, batch upsert by id, and similarity search
//! returning payloads score-descending.

#[cfg(test)]
pub mod memory;
pub mod qdrant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::RagError;

/// Distance metric of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum Distance {
    Cosine,
    Dot,
    Euclid,
}

impl Distance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Distance::Cosine => "Cosine",
            Distance::Dot => "Dot",
            Distance::Euclid => "Euclid",
        }
    }
}

impl std::fmt::Display for Distance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested shape of a collection: name, dimensionality, metric.
#[derive(Debug, Clone)]
pub struct CollectionSchema {
    pub name: String,
    pub vector_size: usize,
    pub distance: Distance,
}

/// Payload stored alongside each vector; comes back verbatim in search hits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkPayload {
    pub id: u64,
    pub text: String,
}

/// One point to upsert: positional id, embedding vector, payload.
#[derive(Debug, Clone)]
pub struct PointRecord {
    pub id: u64,
    pub vector: Vec<f32>,
    pub payload: ChunkPayload,
}

/// One similarity search hit, score-descending within a result set.
#[derive(Debug, Clone)]
pub struct ScoredPoint {
    pub id: u64,
    pub score: f32,
    pub payload: Option<ChunkPayload>,
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Create the collection if absent. An existing collection is validated
    /// against the requested schema; a size or metric mismatch is fatal.
    async fn ensure_collection(&self, schema: &CollectionSchema) -> Result<(), RagError>;

    /// Insert or replace points by id as one batch. A failure aborts the
    /// whole batch and propagates.
    async fn upsert(&self, collection: &str, points: &[PointRecord]) -> Result<(), RagError>;

    /// Return up to `limit` nearest neighbors, highest score first, with
    /// their stored payloads.
    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredPoint>, RagError>;
}

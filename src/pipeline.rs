//! Ingestion and retrieval orchestration.
//!
//! `RagPipeline` is the one context object threading the embedding client,
//! the vector index, and the configuration through the run; nothing here is
//! process-global.

use futures_util::stream::{self, StreamExt};

use crate::config::Config;
use crate::corpus::Chunk;
use crate::errors::RagError;
use crate::index::{ChunkPayload, CollectionSchema, Distance, PointRecord, VectorIndex};
use crate::llm::Embedder;

pub struct RagPipeline<E, V> {
    embedder: E,
    index: V,
    config: Config,
}

impl<E: Embedder, V: VectorIndex> RagPipeline<E, V> {
    pub fn new(embedder: E, index: V, config: Config) -> Self {
        Self {
            embedder,
            index,
            config,
        }
    }

    #[cfg(test)]
    pub fn index(&self) -> &V {
        &self.index
    }

    fn schema(&self) -> CollectionSchema {
        CollectionSchema {
            name: self.config.qdrant.collection.clone(),
            vector_size: self.config.qdrant.vector_size,
            distance: Distance::Cosine,
        }
    }

    /// Create the collection if it does not exist yet; an existing one must
    /// match the configured dimensionality and metric.
    pub async fn prepare_collection(&self) -> Result<(), RagError> {
        self.index.ensure_collection(&self.schema()).await
    }

    /// Embed all chunks and upsert them as one batch. Returns the number of
    /// points written.
    pub async fn ingest(&self, chunks: &[Chunk]) -> Result<usize, RagError> {
        let points = self.embed_chunks(chunks).await?;
        self.index
            .upsert(&self.config.qdrant.collection, &points)
            .await?;
        for point in &points {
            tracing::info!(
                "inserted point id {} text {:?}",
                point.payload.id,
                point.payload.text
            );
        }
        Ok(points.len())
    }

    /// Embed the query and validate its dimensionality.
    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>, RagError> {
        let vector = self.embedder.embed(query).await?;
        self.check_dimensions(&vector)?;
        Ok(vector)
    }

    /// Similarity search; returns the stored texts highest score first.
    pub async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<String>, RagError> {
        let hits = self
            .index
            .search(&self.config.qdrant.collection, vector, limit)
            .await?;
        tracing::info!("{} relevant points found", hits.len());
        for hit in &hits {
            tracing::info!("search hit id {} score {}", hit.id, hit.score);
        }
        Ok(hits
            .into_iter()
            .filter_map(|hit| hit.payload.map(|p| p.text))
            .collect())
    }

    /// Embed a query and retrieve the top-`limit` stored texts for it.
    pub async fn retrieve(&self, query: &str, limit: usize) -> Result<Vec<String>, RagError> {
        let vector = self.embed_query(query).await?;
        self.search(&vector, limit).await
    }

    /// Embedding requests run with bounded, order-preserving concurrency;
    /// ids were assigned at load time so completion order does not matter.
    async fn embed_chunks(&self, chunks: &[Chunk]) -> Result<Vec<PointRecord>, RagError> {
        let concurrency = self.config.corpus.embed_concurrency.max(1);
        let results: Vec<Result<PointRecord, RagError>> = stream::iter(chunks)
            .map(|chunk| async move {
                let vector = self.embedder.embed(&chunk.text).await?;
                self.check_dimensions(&vector)?;
                Ok(PointRecord {
                    id: chunk.id,
                    vector,
                    payload: ChunkPayload {
                        id: chunk.id,
                        text: chunk.text.clone(),
                    },
                })
            })
            .buffered(concurrency)
            .collect()
            .await;
        results.into_iter().collect()
    }

    fn check_dimensions(&self, vector: &[f32]) -> Result<(), RagError> {
        let expected = self.config.qdrant.vector_size;
        if vector.len() != expected {
            return Err(RagError::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

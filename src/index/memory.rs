//! In-memory `VectorIndex` used by unit tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::RagError;

use super::{ChunkPayload, CollectionSchema, PointRecord, ScoredPoint, VectorIndex};

#[derive(Default)]
pub struct InMemoryIndex {
    collections: Mutex<Vec<CollectionSchema>>,
    points: Mutex<BTreeMap<u64, (Vec<f32>, ChunkPayload)>>,
    creations: AtomicUsize,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn creation_count(&self) -> usize {
        self.creations.load(Ordering::SeqCst)
    }

    pub fn point_count(&self) -> usize {
        self.points.lock().unwrap().len()
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn ensure_collection(&self, schema: &CollectionSchema) -> Result<(), RagError> {
        let mut collections = self.collections.lock().unwrap();
        if let Some(existing) = collections.iter().find(|c| c.name == schema.name) {
            if existing.vector_size != schema.vector_size || existing.distance != schema.distance {
                return Err(RagError::CollectionMismatch {
                    collection: schema.name.clone(),
                    found: format!("size {} distance {}", existing.vector_size, existing.distance),
                    requested: format!("size {} distance {}", schema.vector_size, schema.distance),
                });
            }
            return Ok(());
        }
        collections.push(schema.clone());
        self.creations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn upsert(&self, _collection: &str, points: &[PointRecord]) -> Result<(), RagError> {
        let mut stored = self.points.lock().unwrap();
        for point in points {
            stored.insert(point.id, (point.vector.clone(), point.payload.clone()));
        }
        Ok(())
    }

    async fn search(
        &self,
        _collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredPoint>, RagError> {
        let stored = self.points.lock().unwrap();
        let mut hits: Vec<ScoredPoint> = stored
            .iter()
            .map(|(id, (candidate, payload))| ScoredPoint {
                id: *id,
                score: cosine_similarity(vector, candidate),
                payload: Some(payload.clone()),
            })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(limit);
        Ok(hits)
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

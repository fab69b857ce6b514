//! Qdrant REST API implementation of `VectorIndex`.
//!
//! Responses arrive wrapped in the `{ "result": ..., "status": "ok" }`
//! envelope. Upserts are issued with `wait=true` so a search directly after
//! ingestion observes the new points.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::QdrantConfig;
use crate::errors::RagError;

use super::{ChunkPayload, CollectionSchema, PointRecord, ScoredPoint, VectorIndex};

#[derive(Clone)]
pub struct QdrantIndex {
    base_url: String,
    client: Client,
}

#[derive(Deserialize)]
struct Envelope<T> {
    result: T,
}

#[derive(Deserialize)]
struct ExistsResult {
    exists: bool,
}

#[derive(Deserialize)]
struct CollectionInfo {
    config: CollectionConfig,
}

#[derive(Deserialize)]
struct CollectionConfig {
    params: CollectionParams,
}

#[derive(Deserialize)]
struct CollectionParams {
    vectors: VectorParams,
}

#[derive(Deserialize)]
struct VectorParams {
    size: usize,
    distance: String,
}

#[derive(Deserialize)]
struct SearchHit {
    id: u64,
    score: f32,
    payload: Option<ChunkPayload>,
}

impl QdrantIndex {
    pub fn new(config: &QdrantConfig) -> Self {
        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    async fn collection_exists(&self, name: &str) -> Result<bool, RagError> {
        let url = format!("{}/collections/{}/exists", self.base_url, name);
        let res = self.client.get(&url).send().await?;
        let body: Envelope<ExistsResult> = decode(res).await?;
        Ok(body.result.exists)
    }

    async fn live_schema(&self, name: &str) -> Result<VectorParams, RagError> {
        let url = format!("{}/collections/{}", self.base_url, name);
        let res = self.client.get(&url).send().await?;
        let body: Envelope<CollectionInfo> = decode(res).await?;
        Ok(body.result.config.params.vectors)
    }

    async fn create_collection(&self, schema: &CollectionSchema) -> Result<(), RagError> {
        let url = format!("{}/collections/{}", self.base_url, schema.name);
        let body = json!({
            "vectors": {
                "size": schema.vector_size,
                "distance": schema.distance.as_str(),
            }
        });
        let res = self.client.put(&url).json(&body).send().await?;
        check_status(res).await
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn ensure_collection(&self, schema: &CollectionSchema) -> Result<(), RagError> {
        if self.collection_exists(&schema.name).await? {
            let live = self.live_schema(&schema.name).await?;
            if live.size != schema.vector_size || live.distance != schema.distance.as_str() {
                return Err(RagError::CollectionMismatch {
                    collection: schema.name.clone(),
                    found: format!("size {} distance {}", live.size, live.distance),
                    requested: format!("size {} distance {}", schema.vector_size, schema.distance),
                });
            }
            tracing::info!("collection '{}' already exists", schema.name);
            return Ok(());
        }

        tracing::info!("creating collection '{}'", schema.name);
        self.create_collection(schema).await
    }

    async fn upsert(&self, collection: &str, points: &[PointRecord]) -> Result<(), RagError> {
        let url = format!(
            "{}/collections/{}/points?wait=true",
            self.base_url, collection
        );
        let body = json!({
            "points": points
                .iter()
                .map(|p| json!({
                    "id": p.id,
                    "vector": p.vector,
                    "payload": p.payload,
                }))
                .collect::<Vec<_>>(),
        });
        let res = self.client.put(&url).json(&body).send().await?;
        check_status(res).await
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredPoint>, RagError> {
        let url = format!("{}/collections/{}/points/search", self.base_url, collection);
        let body = json!({
            "vector": vector,
            "limit": limit,
            "with_payload": true,
        });
        let res = self.client.post(&url).json(&body).send().await?;
        let body: Envelope<Vec<SearchHit>> = decode(res).await?;
        Ok(body
            .result
            .into_iter()
            .map(|hit| ScoredPoint {
                id: hit.id,
                score: hit.score,
                payload: hit.payload,
            })
            .collect())
    }
}

async fn check_status(res: reqwest::Response) -> Result<(), RagError> {
    let status = res.status();
    if status.is_success() {
        return Ok(());
    }
    let message = res.text().await.unwrap_or_default();
    Err(RagError::Service {
        service: "index",
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: serde::de::DeserializeOwned>(res: reqwest::Response) -> Result<T, RagError> {
    let status = res.status();
    if !status.is_success() {
        let message = res.text().await.unwrap_or_default();
        return Err(RagError::Service {
            service: "index",
            status: status.as_u16(),
            message,
        });
    }
    res.json()
        .await
        .map_err(|e| RagError::invalid_response("index", e.to_string()))
}

mod config;
mod corpus;
mod errors;
mod index;
mod llm;
mod logging;
mod pipeline;
mod prompt;

use std::env;

use anyhow::Context;

use crate::config::Config;
use crate::index::qdrant::QdrantIndex;
use crate::llm::OllamaClient;
use crate::pipeline::RagPipeline;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    logging::init(&config.logging);

    let query = env::args()
        .nth(1)
        .or_else(|| config.retrieval.query.clone())
        .context("No query given: pass one as the first argument or set retrieval.query")?;

    let client = OllamaClient::new(&config.ollama);
    let index = QdrantIndex::new(&config.qdrant);
    let pipeline = RagPipeline::new(client.clone(), index, config.clone());

    logging::phase("CHECKING COLLECTION", pipeline.prepare_collection()).await?;

    let chunks = logging::phase("READING CORPUS", async {
        corpus::load_corpus(&config.corpus.path)
    })
    .await?;
    tracing::info!(
        "{} chunks loaded from {}",
        chunks.len(),
        config.corpus.path.display()
    );

    logging::phase("EMBEDDING AND UPSERTING", pipeline.ingest(&chunks)).await?;

    let contexts = logging::phase(
        "EMBEDDING QUERY AND SEARCHING",
        pipeline.retrieve(&query, config.retrieval.top_k),
    )
    .await?;

    let completion_prompt = prompt::assemble(&config.prompt.system, &contexts);
    tracing::info!("completion prompt:\n{}", completion_prompt);
    println!("{}", completion_prompt);

    if config.generate.enabled {
        let answer =
            logging::phase("GENERATING COMPLETION", client.complete(&completion_prompt)).await?;
        println!("{}", answer);
    }

    Ok(())
}

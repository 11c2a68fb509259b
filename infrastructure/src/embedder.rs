use crate::completion_client::CompletionClient;
use domain::models::Embedding;
use futures::stream::{self, StreamExt};
use shared::types::Result;

const BATCH_SIZE: usize = 32;
const CONCURRENCY: usize = 8;

#[derive(Clone)]
pub struct EmbeddingInput {
    pub id: String,
    pub path: String,
    pub text: String,
}

/// Turns document chunks into vectors through the completion service's
/// embedding endpoint, a batch at a time.
pub struct Embedder {
    client: CompletionClient,
}

impl Embedder {
    pub fn new(client: CompletionClient) -> Self {
        Self { client }
    }

    pub async fn generate_embeddings(&self, inputs: &[EmbeddingInput]) -> Result<Vec<Embedding>> {
        let mut embeddings = Vec::with_capacity(inputs.len());
        for batch in inputs.chunks(BATCH_SIZE) {
            eprintln!("Embedding {} chunks...", batch.len());
            let batch_embeddings = self.generate_batch(batch).await?;
            embeddings.extend(batch_embeddings);
        }
        Ok(embeddings)
    }

    async fn generate_batch(&self, inputs: &[EmbeddingInput]) -> Result<Vec<Embedding>> {
        let futures: Vec<_> = inputs
            .iter()
            .map(|input| {
                let client = &self.client;
                async move {
                    let vector = client.generate_embedding(&input.text).await?;
                    Ok(Embedding {
                        id: input.id.clone(),
                        vector,
                        text: input.text.clone(),
                        path: input.path.clone(),
                    }) as Result<Embedding>
                }
            })
            .collect();

        let results = stream::iter(futures)
            .buffer_unordered(CONCURRENCY)
            .collect::<Vec<_>>()
            .await;

        results.into_iter().collect()
    }
}

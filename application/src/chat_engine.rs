use domain::backend::{ChatEngine, ChatReply};
use domain::models::{Message, Role};
use infrastructure::completion_client::CompletionClient;
use infrastructure::config::Config;
use infrastructure::document_scanner::{DocumentScan, DocumentScanner};
use infrastructure::embedder::{Embedder, EmbeddingInput};
use infrastructure::embedding_storage::EmbeddingStorage;
use infrastructure::search::SearchEngine;
use shared::types::Result;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

const TOP_K: usize = 12;

pub const NO_CONTEXT_ANSWER: &str = "No relevant information found in the indexed documents.";

/// Local retrieval/chat engine over a document directory: incremental
/// embedding index in SQLite, cosine retrieval, one grounded completion call
/// per query.
pub struct DocumentChatEngine {
    scanner: DocumentScanner,
    storage: Mutex<EmbeddingStorage>,
    embedder: Embedder,
    client: CompletionClient,
    model: String,
    temperature: f32,
}

impl DocumentChatEngine {
    pub fn new(docs_path: &str, db_path: &str, client: CompletionClient, config: &Config) -> Result<Self> {
        Ok(Self {
            scanner: DocumentScanner::new(docs_path),
            storage: Mutex::new(EmbeddingStorage::new(db_path)?),
            embedder: Embedder::new(client.clone()),
            client,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    fn storage(&self) -> Result<MutexGuard<'_, EmbeddingStorage>> {
        self.storage
            .lock()
            .map_err(|_| anyhow::anyhow!("embedding storage lock poisoned"))
    }

    /// Index new and changed documents. Unchanged files (same content hash)
    /// are skipped, files gone from disk are pruned from the index. Returns
    /// the number of chunks embedded.
    ///
    /// Planning only reads the store; old vectors and hashes are replaced in
    /// a single transaction after the embedding calls succeed, so a failed
    /// pass leaves the documents pending for the next one.
    pub async fn build_index(&self) -> Result<usize> {
        let scans = self.scanner.scan_documents()?;
        eprintln!("Scanning {} documents...", scans.len());

        let plan = {
            let mut storage = self.storage()?;
            let scanned: HashSet<String> = scans.iter().map(|s| s.path.clone()).collect();
            let pruned = prune_removed(&mut storage, &scanned)?;
            if pruned > 0 {
                eprintln!("Pruned {pruned} removed documents from the index");
            }
            plan_reindex(&storage, scans)?
        };

        if plan.inputs.is_empty() {
            return Ok(0);
        }

        eprintln!("Generating embeddings for {} chunks...", plan.inputs.len());
        let embeddings = self.embedder.generate_embeddings(&plan.inputs).await?;
        self.storage()?
            .replace_documents(&plan.documents, embeddings)?;
        eprintln!("Indexing complete - {} chunks processed", plan.inputs.len());
        Ok(plan.inputs.len())
    }

    pub fn indexed_chunks(&self) -> Result<usize> {
        self.storage()?.chunk_count()
    }

    async fn answer(&self, query: &str) -> Result<ChatReply> {
        let query_embedding = self.client.generate_embedding(query).await?;
        let all_embeddings = self.storage()?.get_all_embeddings()?;
        let passages =
            SearchEngine::find_relevant_passages(&query_embedding, &all_embeddings, TOP_K);

        if passages.is_empty() {
            return Ok(ChatReply {
                response: NO_CONTEXT_ANSWER.to_string(),
            });
        }

        let context = passages.join("\n\n");
        let system = format!(
            "You are an assistant answering questions from a document library. \
             Base your answer only on the provided excerpts; say so when they \
             don't cover the question.\n\nExcerpts:\n{context}"
        );
        let messages = vec![
            Message::new(Role::System, system),
            Message::new(Role::User, query),
        ];
        let response = self
            .client
            .chat(&self.model, self.temperature, &messages)
            .await?;
        Ok(ChatReply { response })
    }
}

impl ChatEngine for DocumentChatEngine {
    async fn chat(&self, query: &str) -> Result<ChatReply> {
        self.answer(query).await
    }
}

/// Chunks to embed plus the (path, hash) pairs to record once they are in.
struct ReindexPlan {
    inputs: Vec<EmbeddingInput>,
    documents: Vec<(String, String)>,
}

fn plan_reindex(storage: &EmbeddingStorage, scans: Vec<DocumentScan>) -> Result<ReindexPlan> {
    let mut plan = ReindexPlan {
        inputs: Vec::new(),
        documents: Vec::new(),
    };
    for scan in scans {
        if scan.hash.is_empty() || scan.chunks.is_empty() {
            continue;
        }
        let previous = storage.get_document_hash(&scan.path)?;
        if previous.as_deref() == Some(scan.hash.as_str()) {
            continue;
        }

        eprintln!("Processing {}...", scan.path);
        for chunk in scan.chunks {
            plan.inputs.push(EmbeddingInput {
                id: format!("{}:{}", chunk.path, chunk.start_offset),
                path: chunk.path,
                text: chunk.text,
            });
        }
        plan.documents.push((scan.path, scan.hash));
    }
    Ok(plan)
}

fn prune_removed(storage: &mut EmbeddingStorage, scanned: &HashSet<String>) -> Result<usize> {
    let mut pruned = 0;
    for path in storage.stored_document_paths()? {
        if !scanned.contains(&path) {
            storage.remove_document(&path)?;
            pruned += 1;
        }
    }
    Ok(pruned)
}

use domain::models::Embedding;
use rusqlite::{params, Connection, Result as SqlResult};
use shared::types::Result;
use std::path::Path;

/// SQLite-backed store for document chunk embeddings plus per-file hashes
/// used for incremental reindexing.
pub struct EmbeddingStorage {
    conn: Connection,
}

impl EmbeddingStorage {
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        if let Some(parent) = db_path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(db_path)?;
        Self::setup_db(&conn)?;
        Ok(Self { conn })
    }

    /// In-memory store, used by tests.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::setup_db(&conn)?;
        Ok(Self { conn })
    }

    fn setup_db(conn: &Connection) -> SqlResult<()> {
        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA temp_store=MEMORY;
            CREATE TABLE IF NOT EXISTS embeddings (
                id TEXT PRIMARY KEY,
                vector BLOB NOT NULL,
                text TEXT NOT NULL,
                path TEXT NOT NULL DEFAULT ''
            );
            CREATE INDEX IF NOT EXISTS idx_embeddings_path ON embeddings(path);
            CREATE TABLE IF NOT EXISTS document_meta (
                path TEXT PRIMARY KEY,
                hash TEXT NOT NULL
            );
        ",
        )
    }

    /// Replace the stored state for a set of documents in one transaction:
    /// old chunk rows for each path go away, the new embeddings land, and
    /// the content hashes are recorded together with them. A failure leaves
    /// the previous state intact, so the next index pass retries the same
    /// documents instead of skipping them.
    pub fn replace_documents(
        &mut self,
        documents: &[(String, String)],
        embeddings: Vec<Embedding>,
    ) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            for (path, _) in documents {
                tx.execute("DELETE FROM embeddings WHERE path = ?1", params![path])?;
            }
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO embeddings (id, vector, text, path) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for emb in &embeddings {
                stmt.execute(params![
                    emb.id,
                    vector_to_bytes(&emb.vector),
                    emb.text,
                    emb.path
                ])?;
            }
        }
        for (path, hash) in documents {
            tx.execute(
                "INSERT OR REPLACE INTO document_meta (path, hash) VALUES (?1, ?2)",
                params![path, hash],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Drop a document's chunks and hash, e.g. when the file no longer
    /// exists on disk.
    pub fn remove_document(&mut self, path: &str) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM embeddings WHERE path = ?1", params![path])?;
        tx.execute("DELETE FROM document_meta WHERE path = ?1", params![path])?;
        tx.commit()?;
        Ok(())
    }

    pub fn get_all_embeddings(&self) -> Result<Vec<Embedding>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, vector, text, path FROM embeddings")?;
        let rows = stmt.query_map([], |row| {
            let id: String = row.get(0)?;
            let blob: Vec<u8> = row.get(1)?;
            let text: String = row.get(2)?;
            let path: String = row.get(3)?;
            Ok(Embedding {
                id,
                vector: bytes_to_vector(&blob),
                text,
                path,
            })
        })?;
        let mut embeddings = Vec::new();
        for row in rows {
            embeddings.push(row?);
        }
        Ok(embeddings)
    }

    pub fn get_document_hash(&self, path: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT hash FROM document_meta WHERE path = ?1")?;
        let mut rows = stmt.query(params![path])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    pub fn stored_document_paths(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT path FROM document_meta")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        let mut paths = Vec::new();
        for row in rows {
            paths.push(row?);
        }
        Ok(paths)
    }

    pub fn chunk_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM embeddings", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn vector_to_bytes(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * 4);
    for value in vector {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

fn bytes_to_vector(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

pub mod completion_client;
pub mod config;
pub mod document_scanner;
pub mod embedder;
pub mod embedding_storage;
pub mod search;

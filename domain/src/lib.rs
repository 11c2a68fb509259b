pub mod backend;
pub mod envelope;
pub mod extension;
pub mod models;
pub mod phrases;

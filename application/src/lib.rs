pub mod chat_engine;
pub mod response_service;
pub mod summary_service;

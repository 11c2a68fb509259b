use crate::models::Message;
use shared::types::Result;

/// Outbound port for the remote chat-completion service: one request,
/// first choice's text back.
pub trait CompletionBackend: Send + Sync {
    fn complete(
        &self,
        model: &str,
        temperature: f32,
        messages: Vec<Message>,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

impl<B: CompletionBackend> CompletionBackend for &B {
    fn complete(
        &self,
        model: &str,
        temperature: f32,
        messages: Vec<Message>,
    ) -> impl std::future::Future<Output = Result<String>> + Send {
        (**self).complete(model, temperature, messages)
    }
}

/// Answer returned by the retrieval/chat engine.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub response: String,
}

/// Outbound port for the document retrieval/chat engine: a query string in,
/// a textual answer out. No streaming, no citations.
pub trait ChatEngine: Send + Sync {
    fn chat(&self, query: &str) -> impl std::future::Future<Output = Result<ChatReply>> + Send;
}

impl<E: ChatEngine> ChatEngine for &E {
    fn chat(&self, query: &str) -> impl std::future::Future<Output = Result<ChatReply>> + Send {
        (**self).chat(query)
    }
}

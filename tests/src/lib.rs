//! Cross-layer tests for the response generators and summary helpers,
//! running against in-memory mock backends.

use anyhow::anyhow;
use domain::backend::{ChatEngine, ChatReply, CompletionBackend};
use domain::models::Message;
use shared::types::Result;
use std::sync::Mutex;

/// Recorded completion request: model, temperature, messages.
pub type SeenRequest = (String, f32, Vec<Message>);

/// Completion backend that either replies with a fixed string or fails,
/// recording every request it sees.
pub struct MockBackend {
    reply: Option<String>,
    seen: Mutex<Vec<SeenRequest>>,
}

impl MockBackend {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl CompletionBackend for MockBackend {
    async fn complete(
        &self,
        model: &str,
        temperature: f32,
        messages: Vec<Message>,
    ) -> Result<String> {
        self.seen
            .lock()
            .unwrap()
            .push((model.to_string(), temperature, messages));
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(anyhow!("backend unavailable")),
        }
    }
}

/// Chat engine that always fails.
pub struct FailingEngine;

impl ChatEngine for FailingEngine {
    async fn chat(&self, _query: &str) -> Result<ChatReply> {
        Err(anyhow!("index unavailable"))
    }
}

/// Chat engine that answers every query with a canned string.
pub struct CannedEngine(pub String);

impl ChatEngine for CannedEngine {
    async fn chat(&self, _query: &str) -> Result<ChatReply> {
        Ok(ChatReply {
            response: self.0.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use application::response_service::{compose_prompt, ResponseService};
    use application::summary_service::{
        SummaryService, BULLET_MODEL, BULLET_TEMPERATURE, SUMMARY_FALLBACK, SUMMARY_PERSONA,
    };
    use domain::envelope::{Envelope, EnvelopeKind, ResponseError};
    use domain::models::{History, Role};
    use domain::phrases::{
        initial_message, thanks_phrase, INITIAL_MESSAGE_PHRASES, THANKS_PHRASES,
    };
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn scenario_history() -> History {
        History::from_messages(vec![
            Message::new(Role::System, "hi"),
            Message::new(Role::User, "help me plan"),
            Message::new(Role::Assistant, "sure, what's the topic?"),
        ])
    }

    #[tokio::test]
    async fn short_history_is_an_error_for_all_settings() {
        let backend = MockBackend::replying("never used");
        let service = ResponseService::new(&backend);

        let one_entry = History::from_messages(vec![Message::new(Role::System, "hi")]);

        for history in [History::new(), one_entry] {
            for model in ["gpt-4", "gpt-3.5-turbo", "unknown-model"] {
                for temperature in [0.0, 0.5, 1.0] {
                    for prompt in ["", "persona", "another persona"] {
                        let envelope =
                            service.generate(prompt, &history, model, temperature).await;
                        assert_eq!(envelope.kind, EnvelopeKind::Error);
                        assert_eq!(
                            envelope.content,
                            "Sorry, the conversation history is not long enough to generate a response."
                        );

                        let err = service
                            .try_generate(prompt, &history, model, temperature)
                            .await
                            .unwrap_err();
                        assert!(matches!(err, ResponseError::HistoryTooShort));
                    }
                }
            }
        }
        // The backend must never be reached for short histories.
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn valid_history_returns_the_backend_reply() {
        let backend = MockBackend::replying("S");
        let service = ResponseService::new(&backend);
        let envelope = service
            .generate("persona", &scenario_history(), "gpt-4", 0.5)
            .await;
        assert_eq!(envelope, Envelope::response("S"));
        assert_eq!(
            serde_json::to_string(&envelope).unwrap(),
            r#"{"type":"response","content":"S"}"#
        );
    }

    #[tokio::test]
    async fn backend_failure_maps_to_the_upstream_message() {
        let backend = MockBackend::failing();
        let service = ResponseService::new(&backend);
        let err = service
            .try_generate("persona", &scenario_history(), "gpt-4", 0.5)
            .await
            .unwrap_err();
        assert!(matches!(err, ResponseError::Upstream(_)));

        let envelope = service
            .generate("persona", &scenario_history(), "gpt-4", 0.5)
            .await;
        assert_eq!(
            envelope.content,
            "Sorry, there was an error generating the response."
        );
    }

    #[tokio::test]
    async fn scenario_request_interpolates_each_quoted_message_once() {
        let backend = MockBackend::replying("ok");
        let service = ResponseService::new(&backend);
        service
            .generate("persona", &scenario_history(), "gpt-4", 0.5)
            .await;

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        let (model, temperature, messages) = &requests[0];
        assert_eq!(model, "gpt-4");
        assert_eq!(*temperature, 0.5);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content.matches("help me plan").count(), 1);
        assert_eq!(
            messages[0].content.matches("sure, what's the topic?").count(),
            1
        );
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "sure, what's the topic?");
    }

    #[tokio::test]
    async fn retrieved_context_is_appended_under_the_fixed_heading() {
        let backend = MockBackend::replying("grounded answer");
        let service = ResponseService::new(&backend);
        let engine = CannedEngine("indexed facts".to_string());

        let envelope = service
            .generate_with_context(&engine, "persona", &scenario_history(), "gpt-4", 0.5)
            .await;
        assert_eq!(envelope, Envelope::response("grounded answer"));

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        let plain = compose_prompt("persona", &scenario_history()).unwrap();
        assert_eq!(
            requests[0].2[0].content,
            format!("{}\n### Relevant data from documents: indexed facts", plain.system)
        );
    }

    #[tokio::test]
    async fn retrieval_failure_lands_in_the_generic_branch() {
        let backend = MockBackend::replying("never reached");
        let service = ResponseService::new(&backend);
        let err = service
            .try_generate_with_context(&FailingEngine, "persona", &scenario_history(), "gpt-4", 0.5)
            .await
            .unwrap_err();
        assert!(matches!(err, ResponseError::Unknown(_)));

        let envelope = service
            .generate_with_context(&FailingEngine, "persona", &scenario_history(), "gpt-4", 0.5)
            .await;
        assert_eq!(envelope.content, "An unexpected error occurred.");
        // The completion call never happens when retrieval fails.
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn bullet_transform_failure_returns_the_original_content() {
        let service = SummaryService::new(MockBackend::failing());
        let content = "  your idea, exactly as written \u{00e9}\u{00a0} ";
        let out = service.transform_bullets(content).await;
        assert_eq!(out, content);
    }

    #[tokio::test]
    async fn bullet_transform_uses_the_fixed_model_and_temperature() {
        let backend = MockBackend::replying(" - a\n - b\n - c \n");
        let service = SummaryService::new(&backend);
        let out = service.transform_bullets("some reply").await;
        assert_eq!(out, "- a\n - b\n - c");

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        let (model, temperature, messages) = &requests[0];
        assert_eq!(model, BULLET_MODEL);
        assert_eq!(*temperature, BULLET_TEMPERATURE);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.ends_with("some reply"));
    }

    #[tokio::test]
    async fn summary_failure_returns_the_fixed_apology() {
        let service = SummaryService::new(MockBackend::failing());
        let out = service.generate_summary("gpt-4", 0.3, "summarize this").await;
        assert_eq!(out, SUMMARY_FALLBACK);
    }

    #[tokio::test]
    async fn summary_request_carries_the_fixed_persona() {
        let backend = MockBackend::replying("a summary");
        let service = SummaryService::new(&backend);
        let out = service.generate_summary("gpt-4", 0.3, "summarize this").await;
        assert_eq!(out, "a summary");

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        let messages = &requests[0].2;
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, SUMMARY_PERSONA);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "summarize this");
    }

    #[test]
    fn phrase_pickers_stay_in_their_fixed_sets() {
        assert_eq!(
            THANKS_PHRASES,
            [
                "Thank you!",
                "Thanks a lot!",
                "I appreciate it!",
                "Many thanks!"
            ]
        );
        assert_eq!(
            INITIAL_MESSAGE_PHRASES,
            [
                "Hello! How can I assist you today?",
                "Hi! How can I help?",
                "Hey! What's on your mind?"
            ]
        );

        let mut rng = StdRng::seed_from_u64(1234);
        for _ in 0..2000 {
            assert!(THANKS_PHRASES.contains(&thanks_phrase(&mut rng)));
            assert!(INITIAL_MESSAGE_PHRASES.contains(&initial_message(&mut rng)));
        }
    }
}

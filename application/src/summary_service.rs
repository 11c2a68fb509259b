use domain::backend::CompletionBackend;
use domain::models::{Message, Role};

pub const SUMMARY_PERSONA: &str =
    "You are an expert at summarizing information effectively and making others feel understood";
pub const SUMMARY_FALLBACK: &str = "Sorry, I couldn't generate a summary at the moment.";

pub const BULLET_MODEL: &str = "gpt-4";
pub const BULLET_TEMPERATURE: f32 = 0.2;

/// Summary helpers: each is one completion call with graceful degradation
/// instead of an error envelope.
pub struct SummaryService<B: CompletionBackend> {
    backend: B,
}

impl<B: CompletionBackend> SummaryService<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// One completion call under a fixed summarizer persona. Falls back to a
    /// fixed apology on any failure.
    pub async fn generate_summary(
        &self,
        model: &str,
        temperature: f32,
        summary_prompt: &str,
    ) -> String {
        let messages = vec![
            Message::new(Role::System, SUMMARY_PERSONA),
            Message::new(Role::User, summary_prompt),
        ];
        match self.backend.complete(model, temperature, messages).await {
            Ok(summary) => summary,
            Err(e) => {
                eprintln!("Summary generation failed: {e}");
                SUMMARY_FALLBACK.to_string()
            }
        }
    }

    /// Compress content into three brief bullet points. On any failure the
    /// original content comes back unchanged.
    pub async fn transform_bullets(&self, content: &str) -> String {
        let prompt = format!(
            "Summarize the following content in 3 brief bullet points while retaining the \
             structure and conversational tone (using wording like 'you' and 'your idea'):\n{content}"
        );
        let messages = vec![Message::new(Role::System, prompt)];
        match self
            .backend
            .complete(BULLET_MODEL, BULLET_TEMPERATURE, messages)
            .await
        {
            Ok(bullets) => bullets.trim().to_string(),
            Err(e) => {
                eprintln!("Bullet transform failed: {e}");
                content.to_string()
            }
        }
    }
}

use domain::backend::{ChatEngine, CompletionBackend};
use domain::envelope::{Envelope, ResponseError};
use domain::models::{History, Message, Role, MIN_HISTORY_LEN};

/// System prompt plus the user message it will be sent with.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedPrompt {
    pub system: String,
    pub user: String,
}

/// Build the composite system prompt from a template and the conversation
/// history. The transcript section skips the two entries quoted above it, so
/// each quoted message appears exactly once in the result.
pub fn compose_prompt(prompt: &str, history: &History) -> Result<ComposedPrompt, ResponseError> {
    if history.len() < MIN_HISTORY_LEN {
        return Err(ResponseError::HistoryTooShort);
    }

    let messages = history.messages();
    let first_user_idx = messages
        .iter()
        .position(|m| m.role == Role::User)
        .unwrap_or(1);
    let last_idx = messages.len() - 1;

    let first_message = &messages[first_user_idx].content;
    let last_message = &messages[last_idx].content;

    let transcript = messages
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != first_user_idx && *i != last_idx)
        .map(|(_, m)| format!("{}: {}", m.role.as_str(), m.content))
        .collect::<Vec<_>>()
        .join("\n");

    let system = format!(
        "{prompt}\n\
         ### The original message: {first_message}. \n\
         ### Your latest message to me: {last_message}. \n\
         ### Previous conversation history for context:\n{transcript}"
    );

    Ok(ComposedPrompt {
        system,
        user: last_message.clone(),
    })
}

/// Formats a prompt from conversation history and drives the remote
/// completion service. Every failure collapses to the fixed envelope shape;
/// the tagged error stays available through the `try_` variants.
pub struct ResponseService<B: CompletionBackend> {
    backend: B,
}

impl<B: CompletionBackend> ResponseService<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub async fn try_generate(
        &self,
        prompt: &str,
        history: &History,
        model: &str,
        temperature: f32,
    ) -> Result<String, ResponseError> {
        let composed = compose_prompt(prompt, history)?;
        self.complete(model, temperature, composed).await
    }

    pub async fn generate(
        &self,
        prompt: &str,
        history: &History,
        model: &str,
        temperature: f32,
    ) -> Envelope {
        match self.try_generate(prompt, history, model, temperature).await {
            Ok(content) => Envelope::response(content),
            Err(err) => {
                eprintln!("Response generation failed: {err}");
                Envelope::from(&err)
            }
        }
    }

    /// Same as `try_generate`, with indexed document context fetched from the
    /// chat engine and appended to the composite prompt first. A retrieval
    /// failure is not an upstream completion failure; it lands in the
    /// generic branch.
    pub async fn try_generate_with_context<E: ChatEngine>(
        &self,
        engine: &E,
        prompt: &str,
        history: &History,
        model: &str,
        temperature: f32,
    ) -> Result<String, ResponseError> {
        let mut composed = compose_prompt(prompt, history)?;

        let reply = engine
            .chat(&composed.user)
            .await
            .map_err(|e| ResponseError::Unknown(e.to_string()))?;
        composed
            .system
            .push_str(&format!("\n### Relevant data from documents: {}", reply.response));

        self.complete(model, temperature, composed).await
    }

    pub async fn generate_with_context<E: ChatEngine>(
        &self,
        engine: &E,
        prompt: &str,
        history: &History,
        model: &str,
        temperature: f32,
    ) -> Envelope {
        match self
            .try_generate_with_context(engine, prompt, history, model, temperature)
            .await
        {
            Ok(content) => Envelope::response(content),
            Err(err) => {
                eprintln!("Response generation failed: {err}");
                Envelope::from(&err)
            }
        }
    }

    async fn complete(
        &self,
        model: &str,
        temperature: f32,
        composed: ComposedPrompt,
    ) -> Result<String, ResponseError> {
        let messages = vec![
            Message::new(Role::System, composed.system),
            Message::new(Role::User, composed.user),
        ];
        self.backend
            .complete(model, temperature, messages)
            .await
            .map_err(|e| ResponseError::Upstream(e.to_string()))
    }
}

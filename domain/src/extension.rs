use crate::models::History;

/// Extension points the assistant exposes but does not implement: stage-aware
/// prompting, response grading, and end-of-conversation reporting. Defaults
/// do nothing; integrations override what they need.
pub trait SessionHooks {
    /// Extra prompt context for a named conversation stage.
    fn stage_prompt(&self, _stage: &str) -> Option<String> {
        None
    }

    /// Grade an assistant reply against the user's input and the idea under
    /// discussion.
    fn grade_response(
        &self,
        _user_input: &str,
        _assistant_message: &str,
        _idea: &str,
    ) -> Option<String> {
        None
    }

    /// Final report summarizing the conversation with a recommendation.
    fn final_report(&self, _history: &History) -> Option<String> {
        None
    }
}

/// No-op hooks used when no integration overrides anything.
pub struct NoHooks;

impl SessionHooks for NoHooks {}

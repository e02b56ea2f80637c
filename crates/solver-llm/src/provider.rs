use serde::{Deserialize, Serialize};

use crate::error::LlmError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Sampling parameters shared by every backend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplingConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            top_p: 0.95,
            max_tokens: 1024,
        }
    }
}

pub trait LlmProvider: Send + Sync {
    /// Send messages to the backend and return the assistant text.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached or the response is invalid.
    fn chat(&self, messages: &[Message]) -> impl Future<Output = Result<String, LlmError>> + Send;

    /// Single-turn completion: `system_prompt` as the system message, `prompt` as the user turn.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`LlmProvider::chat`].
    fn complete(
        &self,
        prompt: &str,
        system_prompt: &str,
    ) -> impl Future<Output = Result<String, LlmError>> + Send {
        let messages = vec![Message::system(system_prompt), Message::user(prompt)];
        async move { self.chat(&messages).await }
    }

    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }

    #[test]
    fn message_constructors() {
        let sys = Message::system("be terse");
        assert_eq!(sys.role, Role::System);
        assert_eq!(sys.content, "be terse");
        let user = Message::user("hi");
        assert_eq!(user.role, Role::User);
    }

    #[test]
    fn sampling_defaults() {
        let s = SamplingConfig::default();
        assert!((s.temperature - 0.1).abs() < f32::EPSILON);
        assert!((s.top_p - 0.95).abs() < f32::EPSILON);
        assert_eq!(s.max_tokens, 1024);
    }
}

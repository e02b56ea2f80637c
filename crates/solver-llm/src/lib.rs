//! LLM backend abstraction, OpenAI-compatible and Gemini adapters, and the
//! question classifier that drives backend selection.

pub mod any;
pub mod backends;
pub mod classifier;
pub mod error;
pub mod gemini;
pub mod http;
#[cfg(feature = "mock")]
pub mod mock;
pub mod openai;
pub mod provider;

pub use any::AnyProvider;
pub use backends::BackendSet;
pub use classifier::QuestionKind;
pub use error::LlmError;
pub use provider::{LlmProvider, Message, Role, SamplingConfig};

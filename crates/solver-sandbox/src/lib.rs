//! Code block extraction and timed subprocess execution.

pub mod config;
pub mod executor;
pub mod language;
pub mod runner;

pub use config::SandboxConfig;
pub use executor::{CodeBlock, ExecutionResult, SandboxError, extract_code_blocks};
pub use language::Language;
pub use runner::{BlockOutcome, CodeRunner, NO_CODE_BLOCKS};

use std::sync::LazyLock;

use regex::Regex;

use crate::language::Language;

/// A snippet pulled out of a larger text, tagged with its (lowercased) language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub language: String,
    pub code: String,
}

/// Outcome of running one snippet.
///
/// `success` is true only when the interpreter exited zero within the timeout.
/// `output` holds the trimmed stdout (plus annotated stderr) or the error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub success: bool,
    pub output: String,
}

impl ExecutionResult {
    #[must_use]
    pub fn ok(output: String) -> Self {
        Self {
            success: true,
            output,
        }
    }

    #[must_use]
    pub fn failed(err: &SandboxError) -> Self {
        Self {
            success: false,
            output: err.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("Setup error: {0}")]
    Setup(std::io::Error),

    #[error("Execution error: {0}")]
    Spawn(std::io::Error),

    #[error("Execution timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    #[error("Execution failed: {stderr}")]
    Failed { stderr: String },

    #[error("Unsupported language: {tag}")]
    Unsupported { tag: String },
}

static FENCED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(\w+)?\s*([\s\S]*?)\s*```").unwrap());

/// Extract code blocks in source order.
///
/// Fenced blocks win; a missing fence tag means Python. Without any fence,
/// runs of 4-space or tab indented lines become blocks with a detected language.
#[must_use]
pub fn extract_code_blocks(text: &str) -> Vec<CodeBlock> {
    let fenced: Vec<CodeBlock> = FENCED_RE
        .captures_iter(text)
        .map(|caps| CodeBlock {
            language: caps
                .get(1)
                .map_or_else(|| "python".to_owned(), |m| m.as_str().to_lowercase()),
            code: caps
                .get(2)
                .map_or("", |m| m.as_str())
                .trim()
                .to_owned(),
        })
        .collect();

    if !fenced.is_empty() {
        return fenced;
    }

    extract_indented_blocks(text)
}

fn extract_indented_blocks(text: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        if let Some(stripped) = line.strip_prefix("    ").or_else(|| line.strip_prefix('\t')) {
            current.push(stripped);
        } else if !current.is_empty() {
            blocks.push(indented_block(&current));
            current.clear();
        }
    }
    if !current.is_empty() {
        blocks.push(indented_block(&current));
    }

    blocks
}

fn indented_block(lines: &[&str]) -> CodeBlock {
    let code = lines.join("\n");
    CodeBlock {
        language: Language::detect(&code).as_str().to_owned(),
        code,
    }
}

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use crate::config::SandboxConfig;
use crate::executor::{CodeBlock, ExecutionResult, SandboxError, extract_code_blocks};
use crate::language::Language;

/// Returned by [`CodeRunner::execute_and_get_result`] when the text holds no code.
pub const NO_CODE_BLOCKS: &str = "No code blocks found to execute";

/// What happened to one extracted block.
#[derive(Debug, Clone)]
pub enum BlockOutcome {
    Ran {
        language: Language,
        result: ExecutionResult,
    },
    Skipped {
        tag: String,
    },
}

impl BlockOutcome {
    /// The output of a successful, non-empty run.
    #[must_use]
    pub fn success_output(&self) -> Option<&str> {
        match self {
            Self::Ran { result, .. } if result.success && !result.output.is_empty() => {
                Some(&result.output)
            }
            _ => None,
        }
    }
}

/// Runs snippets with a local interpreter under a wall-clock limit.
///
/// No isolation beyond a throwaway file and a killed child on timeout.
#[derive(Debug, Clone)]
pub struct CodeRunner {
    timeout: Duration,
    python: String,
    node: String,
    temp_dir: Option<PathBuf>,
}

impl CodeRunner {
    #[must_use]
    pub fn new(config: &SandboxConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout),
            python: config.python.clone(),
            node: config.node.clone(),
            temp_dir: None,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Create snippet files under `dir` instead of the system temp directory.
    #[must_use]
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    fn interpreter(&self, language: Language) -> &str {
        match language {
            Language::Python => &self.python,
            Language::JavaScript => &self.node,
        }
    }

    /// Run `code`, detecting the language when no tag is given.
    pub async fn execute(&self, code: &str, language: Option<&str>) -> ExecutionResult {
        let language = match language {
            Some(tag) => match Language::from_tag(tag) {
                Some(lang) => lang,
                None => {
                    return ExecutionResult::failed(&SandboxError::Unsupported {
                        tag: tag.to_owned(),
                    });
                }
            },
            None => {
                let detected = Language::detect(code);
                tracing::debug!(language = %detected, "auto-detected language");
                detected
            }
        };

        match self.run(code, language).await {
            Ok(output) => ExecutionResult::ok(output),
            Err(e) => {
                tracing::warn!(language = %language, "code execution failed: {e}");
                ExecutionResult::failed(&e)
            }
        }
    }

    async fn run(&self, code: &str, language: Language) -> Result<String, SandboxError> {
        let source = match language {
            Language::Python => wrap_python(code),
            Language::JavaScript => code.to_owned(),
        };

        // Removed on drop, whichever way this function returns.
        let mut file = self.temp_file(language).map_err(SandboxError::Setup)?;
        file.write_all(source.as_bytes())
            .and_then(|()| file.flush())
            .map_err(SandboxError::Setup)?;

        let interpreter = self.interpreter(language);
        tracing::debug!(interpreter, path = %file.path().display(), "executing snippet");
        run_interpreter(interpreter, file.path(), self.timeout).await
    }

    fn temp_file(&self, language: Language) -> std::io::Result<tempfile::NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("snippet-").suffix(language.extension());
        match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
    }

    /// Execute every block in `text`, keeping unsupported tags as skipped entries.
    pub async fn run_blocks(&self, text: &str) -> Vec<BlockOutcome> {
        let blocks = extract_code_blocks(text);
        let total = blocks.len();
        let mut outcomes = Vec::with_capacity(total);

        for (i, CodeBlock { language, code }) in blocks.into_iter().enumerate() {
            tracing::debug!("executing code block {}/{total}", i + 1);
            match Language::from_tag(&language) {
                Some(lang) => {
                    let result = self.execute(&code, Some(lang.as_str())).await;
                    outcomes.push(BlockOutcome::Ran {
                        language: lang,
                        result,
                    });
                }
                None => outcomes.push(BlockOutcome::Skipped { tag: language }),
            }
        }

        outcomes
    }

    /// Execute every block and render one annotated paragraph per block.
    pub async fn execute_and_get_result(&self, text: &str) -> String {
        let outcomes = self.run_blocks(text).await;
        if outcomes.is_empty() {
            return NO_CODE_BLOCKS.to_owned();
        }

        outcomes
            .iter()
            .map(|outcome| match outcome {
                BlockOutcome::Ran { language, result } if result.success => {
                    format!("Result of {language} code execution:\n{}", result.output)
                }
                BlockOutcome::Ran { language, result } => {
                    format!("Error executing {language} code: {}", result.output)
                }
                BlockOutcome::Skipped { tag } => {
                    format!("Skipped execution: Unsupported language '{tag}'")
                }
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Buffer stdout, turn any exception into an `Error: ...` line, print the buffer once.
fn wrap_python(code: &str) -> String {
    let indented = code
        .split('\n')
        .map(|line| format!("    {line}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "import sys, io\n\
         _original_stdout = sys.stdout\n\
         sys.stdout = io.StringIO()\n\
         \n\
         try:\n\
         {indented}\n\
         except Exception as e:\n\
         \x20   print(f'Error: {{str(e)}}')\n\
         finally:\n\
         \x20   _output = sys.stdout.getvalue()\n\
         \x20   sys.stdout = _original_stdout\n\
         \x20   print(_output)\n"
    )
}

async fn run_interpreter(
    interpreter: &str,
    path: &Path,
    timeout: Duration,
) -> Result<String, SandboxError> {
    let mut child = Command::new(interpreter)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(SandboxError::Spawn)?;

    let stdout = child.stdout.take().map(|out| tokio::spawn(read_all(out)));
    let stderr = child.stderr.take().map(|err| tokio::spawn(read_all(err)));

    let deadline = tokio::time::Instant::now() + timeout;
    let status = tokio::select! {
        status = child.wait() => status.map_err(SandboxError::Spawn)?,
        () = tokio::time::sleep_until(deadline) => {
            let _ = child.kill().await;
            return Err(SandboxError::Timeout { timeout_secs: timeout.as_secs() });
        }
    };

    let stdout = match stdout {
        Some(task) => task.await.unwrap_or_default(),
        None => String::new(),
    };
    let stderr = match stderr {
        Some(task) => task.await.unwrap_or_default(),
        None => String::new(),
    };

    if !status.success() {
        tracing::warn!(code = ?status.code(), "snippet exited with failure");
        return Err(SandboxError::Failed { stderr });
    }

    let mut output = stdout;
    if !stderr.is_empty() {
        output.push_str("\nStderr: ");
        output.push_str(&stderr);
    }
    Ok(output.trim().to_owned())
}

async fn read_all<R: AsyncRead + Unpin>(mut reader: R) -> String {
    let mut buf = Vec::new();
    let _ = reader.read_to_end(&mut buf).await;
    String::from_utf8_lossy(&buf).into_owned()
}

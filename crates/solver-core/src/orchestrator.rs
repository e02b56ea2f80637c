use solver_bank::PatternBank;
use solver_llm::{BackendSet, LlmError, LlmProvider, Message, QuestionKind};
use solver_sandbox::{BlockOutcome, CodeRunner};

use crate::cleaner::clean;
use crate::config::Config;
use crate::ingest::FileContentMap;
use crate::prompt::{asks_for_execution, build_prompt, system_prompt};

/// Answers one question: pattern bank first, then embedded code, then a model call.
#[derive(Debug)]
pub struct Orchestrator {
    bank: PatternBank,
    backends: BackendSet,
    runner: CodeRunner,
}

impl Orchestrator {
    #[must_use]
    pub fn new(bank: PatternBank, backends: BackendSet, runner: CodeRunner) -> Self {
        Self {
            bank,
            backends,
            runner,
        }
    }

    /// Wire the default pattern bank with the backends and sandbox from `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            PatternBank::default(),
            config.backends(),
            CodeRunner::new(&config.sandbox),
        )
    }

    #[must_use]
    pub fn backends(&self) -> &BackendSet {
        &self.backends
    }

    /// Produce the answer for `question` given the extracted `files`.
    ///
    /// Every failure is folded into the returned string.
    pub async fn answer(&self, question: &str, files: &FileContentMap) -> String {
        if let Some(answer) = self.bank.handle(question) {
            tracing::debug!("answered from pattern bank");
            return answer;
        }

        if question.contains("```")
            && asks_for_execution(question)
            && let Some(output) = self.run_successful_blocks(question).await
        {
            tracing::debug!("answered by running code from the question");
            return clean(&output, question);
        }

        let kind = QuestionKind::classify(question);
        let Some(provider) = self.backends.select(kind) else {
            tracing::warn!("no AI backends available");
            return format!("Error: {}", LlmError::NoProviders);
        };

        let messages = [
            Message::system(system_prompt(kind.is_coding())),
            Message::user(build_prompt(question, files)),
        ];
        let mut reply = match provider.chat(&messages).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(backend = provider.name(), "LLM call failed: {e}");
                format!("Error: {e}")
            }
        };

        if kind.is_coding()
            && reply.contains("```")
            && asks_for_execution(question)
            && let Some(output) = self.run_successful_blocks(&reply).await
        {
            tracing::debug!("replacing model reply with executed code output");
            reply = output;
        }

        clean(&reply, question)
    }

    /// Outputs of the blocks in `text` that ran successfully, or `None` if none did.
    async fn run_successful_blocks(&self, text: &str) -> Option<String> {
        let outcomes = self.runner.run_blocks(text).await;
        let outputs: Vec<&str> = outcomes
            .iter()
            .filter_map(BlockOutcome::success_output)
            .collect();
        (!outputs.is_empty()).then(|| outputs.join("\n\n"))
    }
}

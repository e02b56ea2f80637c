use crate::any::AnyProvider;
use crate::classifier::QuestionKind;
use crate::provider::LlmProvider;

/// The configured backends, built once at startup and shared read-only.
///
/// Coding questions prefer the OpenAI-compatible backend, everything else
/// prefers Gemini; when only one backend is configured it serves both.
#[derive(Debug, Clone, Default)]
pub struct BackendSet {
    openai: Option<AnyProvider>,
    gemini: Option<AnyProvider>,
}

impl BackendSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_openai(mut self, provider: AnyProvider) -> Self {
        self.openai = Some(provider);
        self
    }

    #[must_use]
    pub fn with_gemini(mut self, provider: AnyProvider) -> Self {
        self.gemini = Some(provider);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.openai.is_none() && self.gemini.is_none()
    }

    /// Names of configured backends in preference order for general questions.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.gemini
            .iter()
            .chain(self.openai.iter())
            .map(LlmProvider::name)
            .collect()
    }

    /// Pick the backend for `kind`, or `None` when nothing is configured.
    #[must_use]
    pub fn select(&self, kind: QuestionKind) -> Option<&AnyProvider> {
        let selected = match kind {
            QuestionKind::Coding => self.openai.as_ref().or(self.gemini.as_ref()),
            QuestionKind::General => self.gemini.as_ref().or(self.openai.as_ref()),
        };
        if let Some(p) = selected {
            tracing::debug!(kind = kind.as_str(), backend = p.name(), "backend selected");
        }
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::GeminiProvider;
    use crate::openai::OpenAiProvider;

    fn openai() -> AnyProvider {
        AnyProvider::OpenAi(OpenAiProvider::new(
            "k".into(),
            crate::openai::DEFAULT_BASE_URL.into(),
            "gpt-4o".into(),
        ))
    }

    fn gemini() -> AnyProvider {
        AnyProvider::Gemini(GeminiProvider::new(
            "k".into(),
            crate::gemini::DEFAULT_BASE_URL.into(),
            "gemini-1.5-pro".into(),
        ))
    }

    #[test]
    fn empty_set_selects_nothing() {
        let set = BackendSet::new();
        assert!(set.is_empty());
        assert!(set.select(QuestionKind::Coding).is_none());
        assert!(set.select(QuestionKind::General).is_none());
    }

    #[test]
    fn both_backends_split_by_kind() {
        let set = BackendSet::new().with_openai(openai()).with_gemini(gemini());
        assert_eq!(set.select(QuestionKind::Coding).unwrap().name(), "openai");
        assert_eq!(set.select(QuestionKind::General).unwrap().name(), "gemini");
        assert_eq!(set.names(), vec!["gemini", "openai"]);
    }

    #[test]
    fn single_backend_serves_every_kind() {
        let set = BackendSet::new().with_gemini(gemini());
        assert_eq!(set.select(QuestionKind::Coding).unwrap().name(), "gemini");

        let set = BackendSet::new().with_openai(openai());
        assert_eq!(set.select(QuestionKind::General).unwrap().name(), "openai");
    }
}

/// Coarse question category used to pick the system prompt and the preferred backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    Coding,
    General,
}

const CODING_INDICATORS: &[&str] = &[
    "code",
    "function",
    "algorithm",
    "programming",
    "python",
    "javascript",
    "compute",
    "calculate",
    "implement",
    "script",
    "class",
    "method",
    "syntax",
    "compiler",
    "interpreter",
    "runtime",
    "output",
];

const DATA_INDICATORS: &[&str] = &[
    "data frame",
    "pandas",
    "csv",
    "dataset",
    "data set",
    "visualization",
    "plot",
    "graph",
    "chart",
    "analysis",
    "statistics",
    "regression",
    "prediction",
    "machine learning",
];

impl QuestionKind {
    /// Classify by counting indicator hits; ties with any coding signal go to `Coding`.
    #[must_use]
    pub fn classify(question: &str) -> Self {
        let lower = question.to_lowercase();
        let coding = score(&lower, CODING_INDICATORS);
        let data = score(&lower, DATA_INDICATORS);
        tracing::debug!(coding, data, "question classified");
        if coding > 0 && coding >= data {
            Self::Coding
        } else {
            Self::General
        }
    }

    #[must_use]
    pub fn is_coding(self) -> bool {
        self == Self::Coding
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Coding => "coding",
            Self::General => "general",
        }
    }
}

/// Number of distinct indicators present in `text`.
fn score(text: &str, indicators: &[&str]) -> usize {
    indicators.iter().filter(|i| text.contains(*i)).count()
}

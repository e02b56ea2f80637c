use std::sync::LazyLock;

use regex::Regex;

/// Languages the runner can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Python,
    JavaScript,
}

static PYTHON_FINGERPRINTS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?m)^\s*def\s+\w+\s*\(",
        r"(?m)^\s*import\s+\w+",
        r"(?m)^\s*from\s+\w+\s+import",
        r"print\(",
        r"(?m)^\s*class\s+\w+:",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static JAVASCRIPT_FINGERPRINTS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?m)^\s*function\s+\w+\s*\(",
        r"(?m)^\s*const\s+\w+\s*=",
        r"(?m)^\s*let\s+\w+\s*=",
        r"(?m)^\s*var\s+\w+\s*=",
        r"console\.log\(",
        r"(?m)^\s*export",
        r"(?m)^\s*import.*from",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

impl Language {
    /// Guess the language from syntax fingerprints. Python is checked first and is the fallback.
    #[must_use]
    pub fn detect(code: &str) -> Self {
        if PYTHON_FINGERPRINTS.iter().any(|re| re.is_match(code)) {
            return Self::Python;
        }
        if JAVASCRIPT_FINGERPRINTS.iter().any(|re| re.is_match(code)) {
            return Self::JavaScript;
        }
        Self::Python
    }

    /// Map a fence tag (`py`, `python3`, `js`, `node`, ...) to a language.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "python" | "py" | "python3" => Some(Self::Python),
            "javascript" | "js" | "node" => Some(Self::JavaScript),
            _ => None,
        }
    }

    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Python => ".py",
            Self::JavaScript => ".js",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::JavaScript => "javascript",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

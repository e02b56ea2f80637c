use regex::Regex;

use crate::error::MatchError;

/// The question text plus its lowercased form, computed once per lookup.
#[derive(Debug, Clone)]
pub struct Question<'a> {
    text: &'a str,
    lower: String,
}

impl<'a> Question<'a> {
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            lower: text.to_lowercase(),
        }
    }

    #[must_use]
    pub fn text(&self) -> &'a str {
        self.text
    }

    #[must_use]
    pub fn lower(&self) -> &str {
        &self.lower
    }
}

pub type Handler = fn(&Question<'_>) -> Result<Option<String>, MatchError>;

/// Cheap gate evaluated against the lowercased question before a handler runs.
pub enum Predicate {
    Always,
    Contains(&'static str),
    AllOf(&'static [&'static str]),
    Regex(Regex),
}

impl Predicate {
    #[must_use]
    pub fn matches(&self, lower: &str) -> bool {
        match self {
            Self::Always => true,
            Self::Contains(s) => lower.contains(s),
            Self::AllOf(all) => all.iter().all(|s| lower.contains(s)),
            Self::Regex(re) => re.is_match(lower),
        }
    }
}

impl std::fmt::Debug for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Always => write!(f, "Always"),
            Self::Contains(s) => write!(f, "Contains({s:?})"),
            Self::AllOf(all) => write!(f, "AllOf({all:?})"),
            Self::Regex(re) => write!(f, "Regex({:?})", re.as_str()),
        }
    }
}

/// One recognizable question shape.
#[derive(Debug)]
pub struct Matcher {
    pub name: &'static str,
    pub predicate: Predicate,
    pub handler: Handler,
}

impl Matcher {
    #[must_use]
    pub fn new(name: &'static str, predicate: Predicate, handler: Handler) -> Self {
        Self {
            name,
            predicate,
            handler,
        }
    }
}

/// Ordered matcher cascade. The first matcher whose predicate holds and whose
/// handler yields a non-empty answer wins.
#[derive(Debug)]
pub struct PatternBank {
    matchers: Vec<Matcher>,
}

impl Default for PatternBank {
    fn default() -> Self {
        let mut matchers = crate::assignment::matchers();
        matchers.extend(crate::general::matchers());
        matchers.extend(crate::topical::matchers());
        Self::new(matchers)
    }
}

impl PatternBank {
    #[must_use]
    pub fn new(matchers: Vec<Matcher>) -> Self {
        Self { matchers }
    }

    /// Matcher names in priority order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.matchers.iter().map(|m| m.name).collect()
    }

    /// Answer `question` from the bank, or `None` when no matcher produces an answer.
    ///
    /// Handler errors are logged and treated as "no answer".
    #[must_use]
    pub fn handle(&self, question: &str) -> Option<String> {
        if question.trim().is_empty() {
            return None;
        }
        let q = Question::new(question);

        for matcher in &self.matchers {
            if !matcher.predicate.matches(q.lower()) {
                continue;
            }
            match (matcher.handler)(&q) {
                Ok(Some(answer)) if !answer.trim().is_empty() => {
                    tracing::debug!(matcher = matcher.name, "pattern bank answered");
                    return Some(answer);
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(matcher = matcher.name, "matcher failed: {e}");
                }
            }
        }
        None
    }
}

//! Lowest tiers: embedding-similarity synthesis and analytics/log lookups.

use crate::error::MatchError;
use crate::literals::{self, lookup};
use crate::matcher::{Matcher, Predicate, Question};

type Answer = Result<Option<String>, MatchError>;

pub(crate) fn matchers() -> Vec<Matcher> {
    vec![
        Matcher::new(
            "embedding_similarity",
            Predicate::AllOf(literals::EMBEDDING_TRIGGER),
            embedding_similarity,
        ),
        Matcher::new("sales_analytics", Predicate::Always, sales_analytics),
        Matcher::new(
            "apache_log",
            Predicate::AllOf(literals::APACHE_LOG_GATE),
            apache_log,
        ),
    ]
}

#[allow(clippy::unnecessary_wraps)]
pub(crate) fn embedding_similarity(q: &Question<'_>) -> Answer {
    let lower = q.lower();
    if literals::EMBEDDING_TRIGGER.iter().all(|t| lower.contains(t)) {
        tracing::debug!("embedding similarity question");
        return Ok(Some(literals::EMBEDDING_SOLUTION.to_owned()));
    }
    Ok(None)
}

#[allow(clippy::unnecessary_wraps)]
pub(crate) fn sales_analytics(q: &Question<'_>) -> Answer {
    Ok(lookup(literals::SALES_ANALYTICS, q).map(str::to_owned))
}

#[allow(clippy::unnecessary_wraps)]
pub(crate) fn apache_log(q: &Question<'_>) -> Answer {
    let lower = q.lower();
    if !literals::APACHE_LOG_GATE.iter().all(|t| lower.contains(t)) {
        return Ok(None);
    }
    Ok(lookup(literals::APACHE_LOG, q).map(str::to_owned))
}

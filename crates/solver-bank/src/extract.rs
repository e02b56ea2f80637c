//! Literal extraction helpers shared by the handlers.

use std::str::FromStr;

use regex::Regex;

use crate::error::MatchError;

/// First capture group of the first match.
pub(crate) fn capture<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Two capture groups of the first match.
pub(crate) fn capture2<'t>(re: &Regex, text: &'t str) -> Option<(&'t str, &'t str)> {
    let caps = re.captures(text)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// Parse a captured literal. Captures come from `\d+`-style groups, so a
/// failure here means the value is out of range for `T`.
pub(crate) fn parse_num<T: FromStr>(s: &str, what: &'static str) -> Result<T, MatchError> {
    s.trim().parse().map_err(|_| MatchError::Parse {
        what,
        input: s.to_owned(),
    })
}

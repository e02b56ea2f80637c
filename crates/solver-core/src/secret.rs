use std::fmt;

use serde::Deserialize;

/// Wrapper for API keys and tokens with redacted Debug/Display.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Read a non-empty secret from the environment.
pub(crate) fn from_env(key: &str) -> Option<Secret> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(Secret::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expose_returns_inner() {
        let secret = Secret::new("sk-test");
        assert_eq!(secret.expose(), "sk-test");
    }

    #[test]
    fn debug_and_display_are_redacted() {
        let secret = Secret::new("sk-test");
        assert_eq!(format!("{secret:?}"), "[REDACTED]");
        assert_eq!(format!("{secret}"), "[REDACTED]");
    }

    #[test]
    fn deserializes_transparently() {
        #[derive(Deserialize)]
        struct Holder {
            key: Secret,
        }

        let holder: Holder = toml::from_str("key = \"abc\"").unwrap();
        assert_eq!(holder.key.expose(), "abc");
        assert_eq!(format!("{:?}", holder.key), "[REDACTED]");
    }
}

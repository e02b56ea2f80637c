use serde::Deserialize;

fn default_timeout() -> u64 {
    10
}

fn default_python() -> String {
    "python3".into()
}

fn default_node() -> String {
    "node".into()
}

/// Interpreter binaries and the wall-clock limit for one snippet.
#[derive(Debug, Clone, Deserialize)]
pub struct SandboxConfig {
    /// Seconds before the child process is killed.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_python")]
    pub python: String,
    #[serde(default = "default_node")]
    pub node: String,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            python: default_python(),
            node: default_node(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_partial_config() {
        let toml_str = r#"
            timeout = 3
            python = "/usr/bin/python3.12"
        "#;

        let config: SandboxConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.timeout, 3);
        assert_eq!(config.python, "/usr/bin/python3.12");
        assert_eq!(config.node, "node");
    }

    #[test]
    fn default_sandbox_config() {
        let config = SandboxConfig::default();
        assert_eq!(config.timeout, 10);
        assert_eq!(config.python, "python3");
        assert_eq!(config.node, "node");
    }

    #[test]
    fn empty_table_uses_defaults() {
        let config: SandboxConfig = toml::from_str("").unwrap();
        assert_eq!(config.timeout, 10);
    }
}

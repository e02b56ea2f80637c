use super::Config;
use crate::secret::{self, Secret};

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_core();
        self.apply_env_overrides_secrets();
    }

    fn apply_env_overrides_core(&mut self) {
        if let Ok(v) = std::env::var("TDS_SOLVER_OPENAI_MODEL") {
            self.llm.openai_model = v;
        }
        if let Ok(v) = std::env::var("TDS_SOLVER_GEMINI_MODEL") {
            self.llm.gemini_model = v;
        }
        if let Ok(v) = std::env::var("TDS_SOLVER_SANDBOX_TIMEOUT")
            && let Ok(secs) = v.parse::<u64>()
        {
            self.sandbox.timeout = secs;
        }
        if let Ok(v) = std::env::var("TDS_SOLVER_PYTHON") {
            self.sandbox.python = v;
        }
        if let Ok(v) = std::env::var("TDS_SOLVER_NODE") {
            self.sandbox.node = v;
        }
        if let Ok(v) = std::env::var("TDS_SOLVER_EXTRACT_MAX_CHARS")
            && let Ok(n) = v.parse::<usize>()
        {
            self.extract.max_chars = n;
        }
        if let Ok(v) = std::env::var("TDS_SOLVER_GATEWAY_BIND") {
            self.gateway.bind = v;
        }
        if let Ok(v) = std::env::var("TDS_SOLVER_GATEWAY_PORT") {
            if let Ok(port) = v.parse::<u16>() {
                self.gateway.port = port;
            } else {
                tracing::warn!("ignoring invalid TDS_SOLVER_GATEWAY_PORT value: {v}");
            }
        }
    }

    fn apply_env_overrides_secrets(&mut self) {
        if let Some(key) = secret::from_env("OPENAI_API_KEY") {
            self.secrets.openai_api_key = Some(key);
        }
        if let Some(token) = secret::from_env("AIPROXY_TOKEN") {
            self.secrets.aiproxy_token = Some(token);
        }
        if let Some(key) = secret::from_env("GEMINI_API_KEY") {
            self.secrets.gemini_api_key = Some(key);
        }
        if let Ok(v) = std::env::var("TDS_SOLVER_GATEWAY_TOKEN") {
            self.gateway.auth_token = Some(Secret::new(v));
        }
    }
}

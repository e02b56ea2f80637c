mod env;
mod types;


pub use types::*;

use std::path::Path;

use anyhow::{Context, bail};
use solver_llm::gemini::GeminiProvider;
use solver_llm::openai::OpenAiProvider;
use solver_llm::{AnyProvider, BackendSet, SamplingConfig};

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or if
    /// the resulting configuration is invalid.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error naming the first limit that is zero.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.sandbox.timeout == 0 {
            bail!("sandbox.timeout must be greater than zero");
        }
        if self.extract.max_chars == 0 {
            bail!("extract.max_chars must be greater than zero");
        }
        if self.gateway.max_body_size == 0 {
            bail!("gateway.max_body_size must be greater than zero");
        }
        Ok(())
    }

    #[must_use]
    pub fn sampling(&self) -> SamplingConfig {
        SamplingConfig {
            temperature: self.llm.temperature,
            top_p: self.llm.top_p,
            max_tokens: self.llm.max_tokens,
        }
    }

    /// Build the backend set from the resolved credentials.
    ///
    /// An AI proxy token takes precedence over a direct OpenAI key and pins the
    /// proxy endpoint and model. Backends without credentials are left out.
    #[must_use]
    pub fn backends(&self) -> BackendSet {
        let sampling = self.sampling();
        let mut set = BackendSet::new();

        if let Some(token) = &self.secrets.aiproxy_token {
            tracing::debug!(model = %self.llm.proxy_model, "OpenAI backend via AI proxy");
            let provider = OpenAiProvider::new(
                token.expose().to_owned(),
                self.llm.proxy_base_url.clone(),
                self.llm.proxy_model.clone(),
            )
            .with_sampling(sampling);
            set = set.with_openai(AnyProvider::OpenAi(provider));
        } else if let Some(key) = &self.secrets.openai_api_key {
            tracing::debug!(model = %self.llm.openai_model, "OpenAI backend via direct API");
            let provider = OpenAiProvider::new(
                key.expose().to_owned(),
                self.llm.openai_base_url.clone(),
                self.llm.openai_model.clone(),
            )
            .with_sampling(sampling);
            set = set.with_openai(AnyProvider::OpenAi(provider));
        }

        if let Some(key) = &self.secrets.gemini_api_key {
            tracing::debug!(model = %self.llm.gemini_model, "Gemini backend configured");
            let provider = GeminiProvider::new(
                key.expose().to_owned(),
                self.llm.gemini_base_url.clone(),
                self.llm.gemini_model.clone(),
            )
            .with_sampling(sampling);
            set = set.with_gemini(AnyProvider::Gemini(provider));
        }

        if set.is_empty() {
            tracing::error!("no AI backends configured");
        } else {
            tracing::debug!(backends = ?set.names(), "available backends");
        }
        set
    }
}

use serde::Deserialize;
use solver_sandbox::SandboxConfig;

use crate::secret::Secret;

pub const AIPROXY_BASE_URL: &str = "https://aiproxy.sanand.workers.dev/openai/v1";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub sandbox: SandboxConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(skip)]
    pub secrets: ResolvedSecrets,
}

fn default_openai_model() -> String {
    "gpt-4o".into()
}

fn default_proxy_model() -> String {
    "gpt-4o-mini".into()
}

fn default_openai_base_url() -> String {
    solver_llm::openai::DEFAULT_BASE_URL.into()
}

fn default_proxy_base_url() -> String {
    AIPROXY_BASE_URL.into()
}

fn default_gemini_model() -> String {
    "gemini-1.5-pro".into()
}

fn default_gemini_base_url() -> String {
    solver_llm::gemini::DEFAULT_BASE_URL.into()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_top_p() -> f32 {
    0.95
}

fn default_max_tokens() -> u32 {
    1024
}

/// Backend endpoints, models and sampling. API keys live in [`ResolvedSecrets`].
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,
    /// Model used when the OpenAI backend goes through the AI proxy.
    #[serde(default = "default_proxy_model")]
    pub proxy_model: String,
    #[serde(default = "default_proxy_base_url")]
    pub proxy_base_url: String,
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            openai_model: default_openai_model(),
            openai_base_url: default_openai_base_url(),
            proxy_model: default_proxy_model(),
            proxy_base_url: default_proxy_base_url(),
            gemini_model: default_gemini_model(),
            gemini_base_url: default_gemini_base_url(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_max_chars() -> usize {
    10_000
}

fn default_csv_max_rows() -> usize {
    100
}

fn default_csv_max_cols() -> usize {
    20
}

/// Limits for rendering uploaded files into prompt text.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ExtractConfig {
    /// Text and code files longer than this many chars are truncated.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    /// CSV tables within both limits are rendered in full, larger ones summarized.
    #[serde(default = "default_csv_max_rows")]
    pub csv_max_rows: usize,
    #[serde(default = "default_csv_max_cols")]
    pub csv_max_cols: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            csv_max_rows: default_csv_max_rows(),
            csv_max_cols: default_csv_max_cols(),
        }
    }
}

fn default_gateway_bind() -> String {
    "127.0.0.1".into()
}

fn default_gateway_port() -> u16 {
    8090
}

fn default_gateway_rate_limit() -> u32 {
    120
}

fn default_gateway_max_body() -> usize {
    10 * 1_048_576
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    #[serde(default)]
    pub auth_token: Option<Secret>,
    /// Requests per minute per client IP; 0 disables the limit.
    #[serde(default = "default_gateway_rate_limit")]
    pub rate_limit: u32,
    #[serde(default = "default_gateway_max_body")]
    pub max_body_size: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_gateway_bind(),
            port: default_gateway_port(),
            auth_token: None,
            rate_limit: default_gateway_rate_limit(),
            max_body_size: default_gateway_max_body(),
        }
    }
}

/// Backend credentials, only ever read from the environment.
#[derive(Debug, Default)]
pub struct ResolvedSecrets {
    pub openai_api_key: Option<Secret>,
    pub aiproxy_token: Option<Secret>,
    pub gemini_api_key: Option<Secret>,
}

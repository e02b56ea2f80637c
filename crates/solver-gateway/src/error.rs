use thiserror::Error;

/// Fatal gateway failures. Per-request failures become JSON error bodies instead.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("failed to bind gateway to {0}: {1}")]
    Bind(String, #[source] std::io::Error),
    #[error("gateway server error: {0}")]
    Server(String),
}

//! HTTP front end: multipart question endpoint with bearer auth, rate limit and health check.

mod error;
mod handlers;
mod router;
mod server;

pub use error::GatewayError;
pub use server::GatewayServer;

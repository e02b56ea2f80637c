//! Question answering pipeline: configuration, file ingestion, orchestration and answer cleaning.

pub mod cleaner;
pub mod config;
pub mod extractor;
pub mod ingest;
pub mod orchestrator;
pub mod prompt;
pub mod secret;

pub use config::Config;
pub use extractor::{Extractor, FileKind};
pub use ingest::{FileContentMap, IngestError, Ingestor, Upload};
pub use orchestrator::Orchestrator;
pub use secret::Secret;

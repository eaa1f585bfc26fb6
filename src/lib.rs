// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod client;
pub mod config;
pub mod error;
pub mod exporter;
pub mod models;
pub mod pipeline;
pub mod text;
pub mod utils;

pub use client::{Endpoint, TrieveClient};
pub use config::{
    Config, Credentials, DocumentsConfig, IngestionConfig, SearchConfig, ServiceConfig,
};
pub use error::{DemoError, Result};
pub use exporter::{ExportManifest, ResponseExporter};
pub use models::{Document, SearchRequest};
pub use pipeline::{
    ChunkedDocument, DemoOrchestrator, DemoStats, ProgressTracker, chunk_documents,
};
pub use text::{WordChunker, split_into_chunks};
pub use utils::Validator;

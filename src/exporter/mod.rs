// file: src/exporter/mod.rs
// description: response export module exports

pub mod json;

pub use json::{ExportManifest, ResponseExporter};

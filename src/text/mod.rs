// file: src/text/mod.rs
// description: text processing module exports
// reference: internal module structure

pub mod chunker;

pub use chunker::{WordChunker, split_into_chunks};

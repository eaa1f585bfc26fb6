// file: src/client/mod.rs
// description: search service client module exports
// reference: internal module structure

pub mod trieve;

pub use trieve::{Endpoint, TrieveClient};

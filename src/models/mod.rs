// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod document;
pub mod request;

pub use document::Document;
pub use request::{
    ChunkMetadata, CreateChunkGroupRequest, CreateChunkRequest, EventsRequest, FieldCondition,
    Filters, RecommendChunksRequest, RecommendGroupsRequest, SearchRequest,
};

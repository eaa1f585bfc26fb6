// file: src/models/request.rs
// description: JSON request bodies for the search service endpoints
// reference: https://docs.trieve.ai/api-reference

use crate::config::{DocumentsConfig, SearchConfig};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChunkMetadata {
    pub states: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CreateChunkRequest {
    /// Text content of the chunk
    pub chunk_html: String,

    pub time_stamp: String,

    pub tag_set: Vec<String>,

    pub link: String,

    /// Arbitrary metadata the service can filter on
    pub metadata: ChunkMetadata,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<String>,

    /// Ask the service to split the text itself and average the vectors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_avg: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_tracking_ids: Option<Vec<String>>,
}

impl CreateChunkRequest {
    fn base(content: String, documents: &DocumentsConfig) -> Self {
        Self {
            chunk_html: content,
            time_stamp: documents.time_stamp.clone(),
            tag_set: documents.tag_set.clone(),
            link: documents.link.clone(),
            metadata: ChunkMetadata {
                states: documents.states.clone(),
            },
            tracking_id: None,
            split_avg: None,
            group_tracking_ids: None,
        }
    }

    /// Whole document, vector averaged server-side.
    pub fn split_avg(content: String, tracking_id: &str, documents: &DocumentsConfig) -> Self {
        Self {
            tracking_id: Some(tracking_id.to_string()),
            split_avg: Some(true),
            ..Self::base(content, documents)
        }
    }

    /// One locally produced chunk belonging to a group.
    pub fn grouped(content: String, group_tracking_id: &str, documents: &DocumentsConfig) -> Self {
        Self {
            group_tracking_ids: Some(vec![group_tracking_id.to_string()]),
            ..Self::base(content, documents)
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldCondition {
    pub field: String,
    pub value: Vec<String>,
}

/// Every `must` condition has to match for a result to be returned.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Filters {
    pub must: Vec<FieldCondition>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub search_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Filters>,
}

impl SearchRequest {
    pub fn from_config(search: &SearchConfig) -> Self {
        let filters = if search.filter_values.is_empty() {
            None
        } else {
            Some(Filters {
                must: vec![FieldCondition {
                    field: search.filter_field.clone(),
                    value: search.filter_values.clone(),
                }],
            })
        };

        Self {
            query: search.query.clone(),
            search_type: search.search_type.clone(),
            filters,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecommendChunksRequest {
    pub positive_tracking_ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub negative_tracking_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecommendGroupsRequest {
    pub positive_group_tracking_ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub negative_group_tracking_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CreateChunkGroupRequest {
    pub name: String,
    pub description: String,
    pub tracking_id: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EventsRequest {
    pub page: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_split_avg_body() {
        let config = Config::default_config();
        let request = CreateChunkRequest::split_avg("bill text".to_string(), "0", &config.documents);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "chunk_html": "bill text",
                "time_stamp": "2024-02-03",
                "tag_set": ["bill"],
                "link": "https://www.congress.gov",
                "metadata": { "states": ["AZ", "TN"] },
                "tracking_id": "0",
                "split_avg": true
            })
        );
    }

    #[test]
    fn test_grouped_chunk_omits_tracking_id() {
        let config = Config::default_config();
        let request = CreateChunkRequest::grouped("part".to_string(), "1", &config.documents);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["group_tracking_ids"], json!(["1"]));
        assert!(value.get("tracking_id").is_none());
        assert!(value.get("split_avg").is_none());
    }

    #[test]
    fn test_search_body_with_must_filter() {
        let config = Config::default_config();
        let request = SearchRequest::from_config(&config.search);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "query": "border",
                "search_type": "hybrid",
                "filters": {
                    "must": [{ "field": "metadata.states", "value": ["AZ"] }]
                }
            })
        );
    }

    #[test]
    fn test_search_without_filter_values() {
        let mut config = Config::default_config();
        config.search.filter_values.clear();
        let value = serde_json::to_value(SearchRequest::from_config(&config.search)).unwrap();
        assert!(value.get("filters").is_none());
    }

    #[test]
    fn test_recommend_omits_empty_negatives() {
        let request = RecommendGroupsRequest {
            positive_group_tracking_ids: vec!["0".to_string()],
            negative_group_tracking_ids: vec![],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "positive_group_tracking_ids": ["0"] })
        );
    }
}

// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{DemoError, Result};
use crate::utils::validation::Validator;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub documents: DocumentsConfig,
    pub ingestion: IngestionConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub dataset_id: Option<String>,
    pub timeout_secs: u64,
}

/// Everything needed to talk to one dataset of the search service.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub base_url: String,
    pub api_key: String,
    pub dataset_id: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocumentsConfig {
    pub paths: Vec<PathBuf>,
    pub time_stamp: String,
    #[serde(default)]
    pub tag_set: Vec<String>,
    pub link: String,
    #[serde(default)]
    pub states: Vec<String>,
    pub group_name: String,
    pub group_description: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngestionConfig {
    pub max_words: usize,
    pub split_avg_wait_secs: u64,
    pub chunked_wait_secs: u64,
    pub upload_concurrency: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    pub query: String,
    pub search_type: String,
    pub filter_field: String,
    #[serde(default)]
    pub filter_values: Vec<String>,
    #[serde(default)]
    pub positive_tracking_ids: Vec<String>,
    #[serde(default)]
    pub negative_tracking_ids: Vec<String>,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let defaults = config::Config::try_from(&Self::default_config())
            .map_err(|e| DemoError::Config(e.to_string()))?;

        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder
                .add_source(config::File::from(Path::new("config/default.toml")).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("BILL_SEARCH")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| DemoError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| DemoError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            service: ServiceConfig {
                base_url: "https://api.trieve.ai/api".to_string(),
                api_key: None,
                dataset_id: None,
                timeout_secs: 30,
            },
            documents: DocumentsConfig {
                paths: vec![
                    PathBuf::from("./secure_the_border_act.txt"),
                    PathBuf::from("./tax_relief_for_american_families_act.txt"),
                ],
                time_stamp: "2024-02-03".to_string(),
                tag_set: vec!["bill".to_string()],
                link: "https://www.congress.gov".to_string(),
                states: vec!["AZ".to_string(), "TN".to_string()],
                group_name: "Name of the bill".to_string(),
                group_description: "Description of the bill".to_string(),
            },
            ingestion: IngestionConfig {
                max_words: 500,
                split_avg_wait_secs: 5,
                chunked_wait_secs: 10,
                upload_concurrency: 8,
            },
            search: SearchConfig {
                query: "border".to_string(),
                search_type: "hybrid".to_string(),
                filter_field: "metadata.states".to_string(),
                filter_values: vec!["AZ".to_string()],
                positive_tracking_ids: vec!["0".to_string()],
                negative_tracking_ids: vec![],
            },
        }
    }

    /// Credentials are only checked by commands that reach the network.
    pub fn require_credentials(&self) -> Result<Credentials> {
        let api_key = self
            .service
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                DemoError::Config(
                    "service.api_key is not set (BILL_SEARCH__SERVICE__API_KEY)".to_string(),
                )
            })?;

        let dataset_id = self
            .service
            .dataset_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                DemoError::Config(
                    "service.dataset_id is not set (BILL_SEARCH__SERVICE__DATASET_ID)".to_string(),
                )
            })?;

        Ok(Credentials {
            base_url: self.service.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            dataset_id: dataset_id.to_string(),
            timeout: Duration::from_secs(self.service.timeout_secs),
        })
    }

    fn validate(&self) -> Result<()> {
        Validator::validate_url(&self.service.base_url)?;
        Validator::validate_max_words(self.ingestion.max_words)?;

        if self.ingestion.upload_concurrency == 0 {
            return Err(DemoError::Config(
                "upload_concurrency must be greater than 0".to_string(),
            ));
        }

        if self.documents.paths.is_empty() {
            return Err(DemoError::Config(
                "documents.paths must list at least one file".to_string(),
            ));
        }

        Ok(())
    }
}

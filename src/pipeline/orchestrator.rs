// file: src/pipeline/orchestrator.rs
// description: runs the upload, search, recommend, delete and re-upload demo against the service
// reference: sequential service calls with bounded concurrent chunk uploads

use crate::client::TrieveClient;
use crate::config::Config;
use crate::error::Result;
use crate::exporter::ResponseExporter;
use crate::models::{
    CreateChunkGroupRequest, CreateChunkRequest, Document, RecommendChunksRequest,
    RecommendGroupsRequest, SearchRequest,
};
use crate::pipeline::progress::{DemoStats, ProgressTracker};
use crate::text::WordChunker;
use crate::utils::logging::format_step;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

const TOTAL_STEPS: usize = 9;

/// A document split locally, ready for grouped upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkedDocument {
    pub tracking_id: String,
    pub group_name: String,
    pub chunks: Vec<String>,
}

pub fn chunk_documents(
    documents: &[Document],
    max_words: usize,
    fallback_group_name: &str,
) -> Result<Vec<ChunkedDocument>> {
    let chunker = WordChunker::new(max_words)?;

    Ok(documents
        .iter()
        .map(|document| ChunkedDocument {
            tracking_id: document.tracking_id.clone(),
            group_name: document
                .title()
                .unwrap_or_else(|| fallback_group_name.to_string()),
            chunks: chunker.chunk(&document.content),
        })
        .collect())
}

pub struct DemoOrchestrator {
    config: Config,
    client: TrieveClient,
    exporter: Option<ResponseExporter>,
    skip_waits: bool,
    colored: bool,
}

impl DemoOrchestrator {
    pub fn new(config: Config, client: TrieveClient) -> Self {
        Self {
            config,
            client,
            exporter: None,
            skip_waits: false,
            colored: true,
        }
    }

    pub fn with_exporter(mut self, exporter: ResponseExporter) -> Self {
        self.exporter = Some(exporter);
        self
    }

    pub fn skip_waits(mut self, skip: bool) -> Self {
        self.skip_waits = skip;
        self
    }

    pub fn colored(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    pub async fn run(&self, documents: &[Document]) -> Result<DemoStats> {
        let start_time = Instant::now();
        let mut stats = DemoStats::new();

        if let Some(exporter) = &self.exporter {
            documents.iter().for_each(|document| exporter.add_source(document));
        }

        println!("{}", format_step(1, TOTAL_STEPS, "Uploading bills with split_avg"));
        stats.documents_uploaded = self.upload_split_avg(documents).await?;

        println!("{}", format_step(2, TOTAL_STEPS, "Waiting for ingestion"));
        self.wait_for_ingestion(self.config.ingestion.split_avg_wait_secs).await;

        println!("{}", format_step(3, TOTAL_STEPS, "Searching chunks"));
        self.search(false).await?;

        println!("{}", format_step(4, TOTAL_STEPS, "Recommending chunks"));
        self.recommend(false).await?;

        println!("{}", format_step(5, TOTAL_STEPS, "Deleting bills"));
        stats.documents_deleted = self.delete_documents(documents).await?;

        println!("{}", format_step(6, TOTAL_STEPS, "Uploading bills as grouped chunks"));
        let upload = self.upload_chunked(documents).await?;
        stats.groups_created = documents.len();
        stats.absorb(&upload);

        println!("{}", format_step(7, TOTAL_STEPS, "Waiting for ingestion"));
        self.wait_for_ingestion(self.config.ingestion.chunked_wait_secs).await;

        println!("{}", format_step(8, TOTAL_STEPS, "Searching groups"));
        self.search(true).await?;

        println!("{}", format_step(9, TOTAL_STEPS, "Recommending groups"));
        self.recommend(true).await?;

        if let Some(exporter) = &self.exporter {
            exporter.write_manifest()?;
        }

        stats.duration_secs = start_time.elapsed().as_secs();
        self.log_final_stats(&stats);

        Ok(stats)
    }

    /// Uploads each document whole and lets the service average its vectors.
    pub async fn upload_split_avg(&self, documents: &[Document]) -> Result<usize> {
        for document in documents {
            let request = CreateChunkRequest::split_avg(
                document.content.clone(),
                &document.tracking_id,
                &self.config.documents,
            );

            let response = self.client.create_chunk(&request).await?;
            info!(
                "Uploaded {} as tracking id {} ({} words, sha256 {})",
                document.source_path.display(),
                document.tracking_id,
                document.word_count(),
                document.content_hash
            );
            self.record(&format!("split_avg_upload_{}", document.tracking_id), &response)?;
        }

        Ok(documents.len())
    }

    pub async fn search(&self, groups: bool) -> Result<Value> {
        let request = SearchRequest::from_config(&self.config.search);

        let (step, response) = if groups {
            ("group_search", self.client.group_oriented_search(&request).await?)
        } else {
            ("chunk_search", self.client.search_chunks(&request).await?)
        };

        self.report(step, &response)?;
        Ok(response)
    }

    pub async fn recommend(&self, groups: bool) -> Result<Value> {
        let search = &self.config.search;

        let (step, response) = if groups {
            let request = RecommendGroupsRequest {
                positive_group_tracking_ids: search.positive_tracking_ids.clone(),
                negative_group_tracking_ids: search.negative_tracking_ids.clone(),
            };
            ("group_recommend", self.client.recommend_groups(&request).await?)
        } else {
            let request = RecommendChunksRequest {
                positive_tracking_ids: search.positive_tracking_ids.clone(),
                negative_tracking_ids: search.negative_tracking_ids.clone(),
            };
            ("chunk_recommend", self.client.recommend_chunks(&request).await?)
        };

        self.report(step, &response)?;
        Ok(response)
    }

    /// Deletes the whole-document chunks; unknown tracking ids are skipped.
    pub async fn delete_documents(&self, documents: &[Document]) -> Result<usize> {
        let mut deleted = 0;

        for document in documents {
            match self
                .client
                .delete_chunk_by_tracking_id(&document.tracking_id)
                .await
            {
                Ok(_) => {
                    deleted += 1;
                    info!("Deleted chunk with tracking id {}", document.tracking_id);
                }
                Err(e) if e.is_not_found() => {
                    warn!("No chunk with tracking id {}, skipping", document.tracking_id);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(deleted)
    }

    /// Splits each document locally, creates its group and uploads the chunks into it.
    pub async fn upload_chunked(&self, documents: &[Document]) -> Result<DemoStats> {
        let chunked = chunk_documents(
            documents,
            self.config.ingestion.max_words,
            &self.config.documents.group_name,
        )?;

        let total_chunks = chunked.iter().map(|doc| doc.chunks.len()).sum();
        let progress = ProgressTracker::with_color(total_chunks, self.colored);

        for document in chunked {
            let group = CreateChunkGroupRequest {
                name: document.group_name.clone(),
                description: self.config.documents.group_description.clone(),
                tracking_id: document.tracking_id.clone(),
            };

            let response = self.client.create_chunk_group(&group).await?;
            self.record(&format!("group_create_{}", document.tracking_id), &response)?;

            info!(
                "Created group {} with {} chunks",
                document.tracking_id,
                document.chunks.len()
            );
            progress.start_group(&document.tracking_id, document.chunks.len());

            self.upload_group_chunks(&document, &progress).await;
        }

        let stats = progress.get_stats();
        progress.finish();
        Ok(stats)
    }

    async fn upload_group_chunks(&self, document: &ChunkedDocument, progress: &ProgressTracker) {
        let documents = &self.config.documents;
        let client = &self.client;

        stream::iter(document.chunks.iter().enumerate().map(|(index, chunk)| {
            let request =
                CreateChunkRequest::grouped(chunk.clone(), &document.tracking_id, documents);
            async move { (index, client.create_chunk(&request).await) }
        }))
        .buffer_unordered(self.config.ingestion.upload_concurrency.max(1))
        .for_each(|(index, result)| {
            match result {
                Ok(_) => progress.inc_uploaded(),
                Err(e) => {
                    error!(
                        "Failed to upload chunk {} of group {}: {}",
                        index, document.tracking_id, e
                    );
                    progress.inc_failed();
                }
            }
            async {}
        })
        .await;
    }

    pub async fn wait_for_ingestion(&self, secs: u64) {
        if self.skip_waits || secs == 0 {
            return;
        }

        info!(
            "Waiting {}s for the service to ingest uploads; progress is visible at {}/events",
            secs,
            self.client.base_url()
        );
        tokio::time::sleep(Duration::from_secs(secs)).await;
    }

    fn report(&self, step: &str, response: &Value) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(response)?);
        self.record(step, response)
    }

    fn record(&self, step: &str, response: &Value) -> Result<()> {
        if let Some(exporter) = &self.exporter {
            exporter.record(step, response)?;
        }
        Ok(())
    }

    fn log_final_stats(&self, stats: &DemoStats) {
        info!("Demo complete in {}s", stats.duration_secs);
        info!(
            "Documents uploaded: {} | deleted: {} | groups: {}",
            stats.documents_uploaded, stats.documents_deleted, stats.groups_created
        );
        info!(
            "Chunks uploaded: {} | failed: {} | success rate: {:.1}% | {:.1} chunks/s",
            stats.chunks_uploaded,
            stats.chunks_failed,
            stats.success_rate(),
            stats.chunks_per_second()
        );

        if stats.chunks_failed > 0 {
            warn!("{} chunk uploads failed", stats.chunks_failed);
        }
    }
}

// file: src/pipeline/progress.rs
// description: upload progress tracking and statistics reporting for the demo run
// reference: uses indicatif for progress bars and tracks upload counts

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DemoStats {
    pub documents_uploaded: usize,
    pub documents_deleted: usize,
    pub groups_created: usize,
    pub chunks_uploaded: usize,
    pub chunks_failed: usize,
    pub duration_secs: u64,
}

impl DemoStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunks_per_second(&self) -> f64 {
        if self.duration_secs == 0 {
            return 0.0;
        }
        self.chunks_uploaded as f64 / self.duration_secs as f64
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.chunks_uploaded + self.chunks_failed;
        if total == 0 {
            return 0.0;
        }
        (self.chunks_uploaded as f64 / total as f64) * 100.0
    }

    /// Folds the chunk counters of an upload pass into the run totals.
    pub fn absorb(&mut self, upload: &DemoStats) {
        self.chunks_uploaded += upload.chunks_uploaded;
        self.chunks_failed += upload.chunks_failed;
    }
}

/// Chunk upload progress across all groups, with a per-group detail line.
pub struct ProgressTracker {
    main_bar: ProgressBar,
    detail_bar: ProgressBar,
    chunks_uploaded: AtomicUsize,
    chunks_failed: AtomicUsize,
    group_done: AtomicUsize,
    group_total: AtomicUsize,
    group_id: Mutex<String>,
    start_time: Instant,
}

impl ProgressTracker {
    pub fn with_color(total_chunks: usize, colored: bool) -> Self {
        let multi_progress = MultiProgress::new();

        Self {
            main_bar: create_progress_bar(&multi_progress, total_chunks as u64, colored),
            detail_bar: create_detail_bar(&multi_progress),
            chunks_uploaded: AtomicUsize::new(0),
            chunks_failed: AtomicUsize::new(0),
            group_done: AtomicUsize::new(0),
            group_total: AtomicUsize::new(0),
            group_id: Mutex::new(String::new()),
            start_time: Instant::now(),
        }
    }

    pub fn start_group(&self, tracking_id: &str, chunk_count: usize) {
        *self.group_id.lock().unwrap_or_else(PoisonError::into_inner) = tracking_id.to_string();
        self.group_done.store(0, Ordering::SeqCst);
        self.group_total.store(chunk_count, Ordering::SeqCst);
        self.main_bar.set_message(format!("group {}", tracking_id));
        self.update_detail_bar();
    }

    pub fn inc_uploaded(&self) {
        self.chunks_uploaded.fetch_add(1, Ordering::SeqCst);
        self.advance();
    }

    pub fn inc_failed(&self) {
        self.chunks_failed.fetch_add(1, Ordering::SeqCst);
        self.advance();
    }

    pub fn finish(&self) {
        self.main_bar.finish_with_message("Upload complete");
        self.detail_bar.finish_and_clear();
    }

    pub fn get_stats(&self) -> DemoStats {
        DemoStats {
            chunks_uploaded: self.chunks_uploaded.load(Ordering::SeqCst),
            chunks_failed: self.chunks_failed.load(Ordering::SeqCst),
            duration_secs: self.start_time.elapsed().as_secs(),
            ..DemoStats::default()
        }
    }

    /// Detail line for the group currently uploading.
    pub fn group_summary(&self) -> String {
        let group_id = self
            .group_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        format!(
            "group {}: {}/{} chunks | failed {}",
            group_id,
            self.group_done.load(Ordering::SeqCst),
            self.group_total.load(Ordering::SeqCst),
            self.chunks_failed.load(Ordering::SeqCst)
        )
    }

    fn advance(&self) {
        self.group_done.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    fn update_detail_bar(&self) {
        self.detail_bar.set_message(self.group_summary());
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.finish();
    }
}

fn create_progress_bar(multi_progress: &MultiProgress, total: u64, colored: bool) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(total));
    let (template, chars) = if colored {
        (
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
            "█▓▒░",
        )
    } else {
        (
            "{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({eta}) {msg}",
            "=>-",
        )
    };

    let style = ProgressStyle::default_bar()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars(chars);
    bar.set_style(style);
    bar
}

fn create_detail_bar(multi_progress: &MultiProgress) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(0));
    let style = ProgressStyle::default_bar()
        .template("{msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar
}

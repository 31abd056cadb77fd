//! Document fetching and persistence
//!
//! One fetcher instance is shared by all workers. A single missing or
//! malformed document never aborts the batch: it is logged, reported as a
//! skip, and the remaining tasks continue.

use crate::config::RetryConfig;
use crate::error::{Error, Result};
use crate::images::ImageLocalizer;
use crate::transport::HttpClient;
use crate::types::{FetchOutcome, FetchTask};

/// Fetches one document, localizes its images, and writes it to disk
pub struct DocumentFetcher {
    client: HttpClient,
    retry: RetryConfig,
}

impl DocumentFetcher {
    /// Create a fetcher over the shared transport handle
    pub fn new(client: HttpClient, retry: RetryConfig) -> Self {
        Self { client, retry }
    }

    /// Execute one fetch task to a terminal state
    ///
    /// An unavailable or malformed document yields [`FetchOutcome::Skipped`];
    /// only local I/O failures after a successful fetch surface as errors
    /// (the dispatcher logs them and counts the task as failed).
    pub async fn fetch(&self, task: &FetchTask) -> Result<FetchOutcome> {
        let content = match self.client.get_document(&task.book_id, &task.slug).await {
            Ok(content) => content,
            Err(e @ (Error::DocumentUnavailable { .. } | Error::MalformedDocument { .. })) => {
                tracing::warn!(
                    error = %e,
                    book_id = %task.book_id,
                    slug = %task.slug,
                    "Document skipped"
                );
                return Ok(FetchOutcome::Skipped {
                    reason: e.to_string(),
                });
            }
            // Transport failures on the document itself are also per-task
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    book_id = %task.book_id,
                    slug = %task.slug,
                    "Document fetch failed, skipping"
                );
                return Ok(FetchOutcome::Skipped {
                    reason: e.to_string(),
                });
            }
        };

        let localizer = ImageLocalizer::for_document(&self.client, &self.retry, &task.target_path);
        let (rewritten, report) = localizer.localize(&content).await;

        if let Some(parent) = task.target_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&task.target_path, rewritten).await?;

        tracing::info!(
            path = %task.target_path.display(),
            images_localized = report.localized,
            images_fallback = report.fallback,
            "Document saved"
        );
        Ok(FetchOutcome::Written(task.target_path.clone()))
    }
}

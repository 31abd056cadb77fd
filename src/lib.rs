//! # yuque-dl
//!
//! Mirror a tree-structured online knowledge base to a local directory of
//! Markdown files, with a navigable `SUMMARY.md` index and localized images.
//!
//! ## Design Philosophy
//!
//! - **Deterministic layout** - every node maps to exactly one sanitized path
//! - **Graceful degradation** - a missing document or image never aborts the
//!   run; it is logged and the batch continues
//! - **Bounded resources** - a fixed-size worker pool and bounded retries,
//!   never sized from the input
//! - **Library-first** - the CLI binary is a thin wrapper over [`BookMirror`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use yuque_dl::{BookMirror, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mirror = BookMirror::new(Config::default())?;
//!     let report = mirror.mirror("https://www.yuque.com/burpheart/phpaudit").await?;
//!     println!(
//!         "book {}: {} written, {} skipped",
//!         report.book_id, report.documents.written, report.documents.skipped
//!     );
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Bounded worker-pool task dispatch
pub mod dispatcher;
/// Error types
pub mod error;
/// Document fetching and persistence
pub mod fetcher;
/// Image localization
pub mod images;
/// Book listing extraction from the host page
pub mod listing;
/// Path resolution and title sanitization
pub mod paths;
/// Retry logic for transient failures
pub mod retry;
/// HTTP transport collaborator
pub mod transport;
/// Core data types
pub mod types;
/// Tree traversal and summary-index assembly
pub mod walker;

pub use config::{Config, RetryConfig};
pub use error::{Error, Result};
pub use types::{BookListing, CompletionReport, FetchOutcome, FetchTask, TocEntry};

use crate::fetcher::DocumentFetcher;
use crate::transport::HttpClient;
use std::path::PathBuf;
use std::sync::Arc;

/// Result of one completed mirror run
#[derive(Clone, Debug)]
pub struct MirrorReport {
    /// The mirrored book's identifier
    pub book_id: String,
    /// Directory the book was written under
    pub book_root: PathBuf,
    /// Path of the generated summary index
    pub summary_path: PathBuf,
    /// Per-document completion counts
    pub documents: CompletionReport,
}

/// Mirrors one book per call: listing, tree, documents, images, summary
#[derive(Clone)]
pub struct BookMirror {
    config: Config,
    client: HttpClient,
}

impl BookMirror {
    /// Create a mirror with the given configuration
    ///
    /// # Errors
    ///
    /// Fails only when the HTTP client cannot be constructed.
    pub fn new(config: Config) -> Result<Self> {
        let client = HttpClient::new(&config)?;
        Ok(Self { config, client })
    }

    /// Create a mirror whose document API resolves against a custom base URL
    ///
    /// Intended for tests running against a local mock server.
    pub fn with_api_base(config: Config, base_url: &str) -> Result<Self> {
        let client = HttpClient::with_base_url(&config, base_url)?;
        Ok(Self { config, client })
    }

    /// Mirror the book listed at `listing_url`
    ///
    /// Retrieves and parses the listing (fatal on failure), plans the
    /// directory tree and summary index from the node list, writes
    /// `SUMMARY.md`, then drains all document-fetch tasks through the
    /// bounded worker pool. The report accounts for every planned document.
    ///
    /// # Errors
    ///
    /// Only top-level failures surface here: listing retrieval or parse
    /// errors, a malformed node list ([`Error::UnknownAncestor`]), or I/O
    /// errors creating the book's directories and the summary file.
    pub async fn mirror(&self, listing_url: &str) -> Result<MirrorReport> {
        tracing::info!(url = listing_url, "Fetching book listing");
        let page = self.client.get_listing_page(listing_url).await?;
        let book = listing::parse_listing_page(&page, listing_url)?;

        let book_root = self.config.download_dir.join(&book.book_id);
        tokio::fs::create_dir_all(&book_root).await?;
        tracing::info!(
            book_id = %book.book_id,
            nodes = book.toc.len(),
            root = %book_root.display(),
            "Listing parsed"
        );

        let plan = walker::walk(&book_root, &book.book_id, &book.toc).await?;

        // The summary reflects the planned traversal, not fetch outcomes,
        // so it is written before any document is fetched
        let summary_path = book_root.join("SUMMARY.md");
        tokio::fs::write(&summary_path, &plan.summary).await?;
        tracing::info!(path = %summary_path.display(), "Summary index written");

        let fetcher = Arc::new(DocumentFetcher::new(
            self.client.clone(),
            self.config.retry.clone(),
        ));
        let documents = dispatcher::dispatch(
            fetcher,
            plan.tasks,
            self.config.max_concurrent_downloads,
        )
        .await;

        tracing::info!(
            written = documents.written,
            skipped = documents.skipped,
            failed = documents.failed,
            "Mirror complete"
        );

        Ok(MirrorReport {
            book_id: book.book_id,
            book_root,
            summary_path,
            documents,
        })
    }
}

//! Image localization for fetched documents
//!
//! Scans Markdown for remote image references, downloads each distinct
//! locator once into an `images/` directory beside the document, and rewrites
//! every occurrence to the local relative path. Failures degrade gracefully:
//! a reference whose download or save fails keeps its original remote URL.

use crate::config::RetryConfig;
use crate::error::Result;
use crate::retry::fetch_with_retry;
use crate::transport::HttpClient;
use futures::StreamExt;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tokio::io::AsyncWriteExt;

/// Extension substituted when the locator has none, or an implausible one
const DEFAULT_EXTENSION: &str = ".png";

/// Longest plausible extension, dot included (".jpeg" is 5)
const MAX_EXTENSION_LEN: usize = 6;

#[allow(clippy::expect_used)]
static MARKDOWN_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)!\[[^\]]*\]\((https?://[^)]+)\)").expect("markdown image regex is valid")
});

#[allow(clippy::expect_used)]
static HTML_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img[^>]*?src=["'](https?://[^"']+)["']"#)
        .expect("html image regex is valid")
});

/// Per-document localization report
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageReport {
    /// Distinct locators downloaded and rewritten to local paths
    pub localized: usize,
    /// Distinct locators left pointing at their remote URL
    pub fallback: usize,
}

/// Downloads remote images referenced by one document and rewrites the links
pub struct ImageLocalizer<'a> {
    client: &'a HttpClient,
    retry: &'a RetryConfig,
    /// The `images/` directory beside the document's target path
    images_dir: PathBuf,
}

impl<'a> ImageLocalizer<'a> {
    /// Create a localizer writing into `images/` beside `target_path`
    pub fn for_document(
        client: &'a HttpClient,
        retry: &'a RetryConfig,
        target_path: &Path,
    ) -> Self {
        let images_dir = target_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("images");
        Self {
            client,
            retry,
            images_dir,
        }
    }

    /// Localize all remote image references in `text`
    ///
    /// Each distinct remote locator is downloaded at most once (first
    /// occurrence wins). Every occurrence is then replaced by literal string
    /// substitution — never pattern-based, so locators containing regex
    /// metacharacters cannot be reinterpreted. A document without remote
    /// references is returned unchanged.
    pub async fn localize(&self, text: &str) -> (String, ImageReport) {
        let locators = extract_remote_locators(text);
        if locators.is_empty() {
            return (text.to_string(), ImageReport::default());
        }

        let mut report = ImageReport::default();
        let mut mapping: HashMap<String, String> = HashMap::new();

        for locator in &locators {
            match self.download_image(locator).await {
                Ok(local_rel) => {
                    tracing::info!(path = %local_rel, "Image saved");
                    mapping.insert(locator.clone(), local_rel);
                    report.localized += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        url = %locator,
                        "Image localization failed, keeping remote reference"
                    );
                    mapping.insert(locator.clone(), locator.clone());
                    report.fallback += 1;
                }
            }
        }

        // Rewrites apply in first-occurrence order: locators can overlap
        // (one a prefix of another), so map iteration order would make the
        // output nondeterministic
        let mut rewritten = text.to_string();
        for locator in &locators {
            if let Some(local) = mapping.get(locator)
                && local != locator
            {
                rewritten = rewritten.replace(locator.as_str(), local);
            }
        }

        (rewritten, report)
    }

    /// Download one image with retry, returning its document-relative path
    async fn download_image(&self, url: &str) -> Result<String> {
        let filename = local_filename(url);
        let local_rel = format!("images/{}", filename);
        let local_abs = self.images_dir.join(&filename);

        // Idempotent under races from sibling tasks sharing this directory
        tokio::fs::create_dir_all(&self.images_dir).await?;

        let response = fetch_with_retry(self.retry, url, || self.client.get_image(url)).await?;

        let mut file = tokio::fs::File::create(&local_abs).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        Ok(local_rel)
    }
}

/// Extract distinct remote image locators in order of first occurrence
///
/// Matches inline Markdown images and `<img src>` tags; only locators with an
/// explicit `http`/`https` scheme count as remote, so local and relative
/// references are left untouched.
fn extract_remote_locators(text: &str) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();

    let markdown = MARKDOWN_IMAGE_RE
        .captures_iter(text)
        .map(|c| c[1].to_string());
    let html = HTML_IMAGE_RE.captures_iter(text).map(|c| c[1].to_string());

    for locator in markdown.chain(html) {
        if !seen.contains(&locator) {
            seen.push(locator);
        }
    }
    seen
}

/// Derive a collision-free local filename for a remote locator
///
/// Random token plus the locator's path extension, lower-cased; a missing or
/// implausibly long extension falls back to the default image extension.
fn local_filename(url: &str) -> String {
    let token = uuid::Uuid::new_v4().simple().to_string();
    format!("{}{}", token, extension_of(url))
}

fn extension_of(url: &str) -> String {
    let path = match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.to_string(),
    };

    let suffix = Path::new(&path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()));

    match suffix {
        Some(s) if s.len() <= MAX_EXTENSION_LEN => s,
        _ => DEFAULT_EXTENSION.to_string(),
    }
}

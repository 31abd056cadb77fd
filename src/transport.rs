//! HTTP transport collaborator
//!
//! A single [`HttpClient`] is built at startup and handed to every fetch —
//! there is no ambient session state. All requests share one timeout and one
//! identifying User-Agent header.

use crate::config::Config;
use crate::error::{Error, Result};
use serde::Deserialize;

/// Shape of the document API payload; only the Markdown source is of interest
#[derive(Debug, Deserialize)]
struct DocPayload {
    data: Option<DocData>,
}

#[derive(Debug, Deserialize)]
struct DocData {
    sourcecode: Option<String>,
}

/// Immutable HTTP client handle shared by all fetch tasks
///
/// Cloneable; the underlying `reqwest::Client` pools connections internally.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    /// Build a client from the configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] when the underlying client cannot be
    /// constructed (invalid header value, TLS backend failure).
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(config, "https://www.yuque.com")
    }

    /// Build a client that resolves API paths against a custom base URL
    ///
    /// Used by tests to point the document API at a local mock server.
    pub fn with_base_url(config: &Config, base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the host page that embeds the book listing
    ///
    /// # Errors
    ///
    /// Fatal for the run: [`Error::ListingUnavailable`] on a non-success
    /// status, [`Error::Network`] on transport failure.
    pub async fn get_listing_page(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::ListingUnavailable {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }

    /// Fetch one document's raw Markdown via the document API
    ///
    /// # Errors
    ///
    /// [`Error::DocumentUnavailable`] on a non-200 status (commonly a deleted
    /// page), [`Error::MalformedDocument`] when the payload lacks the content
    /// field, [`Error::Network`] when the body cannot be read. All are
    /// absorbed by the fetcher as skips.
    pub async fn get_document(&self, book_id: &str, slug: &str) -> Result<String> {
        let url = format!(
            "{}/api/docs/{}?book_id={}&merge_dynamic_data=false&mode=markdown",
            self.base_url, slug, book_id
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(Error::DocumentUnavailable {
                status: status.as_u16(),
                book_id: book_id.to_string(),
                slug: slug.to_string(),
            });
        }

        // A timeout or transport failure while reading the body is a network
        // problem, not a payload problem
        let payload: DocPayload = response.json().await.map_err(|e| {
            if e.is_decode() && !e.is_timeout() {
                Error::MalformedDocument {
                    book_id: book_id.to_string(),
                    slug: slug.to_string(),
                }
            } else {
                Error::Network(e)
            }
        })?;

        payload
            .data
            .and_then(|d| d.sourcecode)
            .ok_or_else(|| Error::MalformedDocument {
                book_id: book_id.to_string(),
                slug: slug.to_string(),
            })
    }

    /// Start an image download, returning the response for streaming
    ///
    /// The body is not read here; the caller streams it to disk in chunks.
    ///
    /// # Errors
    ///
    /// [`Error::ImageUnavailable`] on a non-200 status, [`Error::Network`] on
    /// transport failure. Both are retryable.
    pub async fn get_image(&self, url: &str) -> Result<reqwest::Response> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(Error::ImageUnavailable {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }
}

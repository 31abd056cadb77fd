//! Error types for yuque-dl
//!
//! The taxonomy follows the run's failure policy:
//! - listing retrieval/parse failures are fatal and abort the whole run
//! - a node referencing a nonexistent ancestor is a data-integrity failure
//!   (fatal for that subtree, never retried)
//! - per-document and per-image failures are absorbed by the pipeline and
//!   surfaced only through logs and completion counts

use thiserror::Error;

/// Result type alias for yuque-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for yuque-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Network error (connect, timeout, body read)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Host page did not contain an embedded listing payload
    #[error("no listing payload found in page: {0}")]
    ListingNotFound(String),

    /// Listing page returned a non-success HTTP status
    #[error("listing request failed with HTTP {status}: {url}")]
    ListingUnavailable {
        /// HTTP status code returned by the host page
        status: u16,
        /// The listing URL that was requested
        url: String,
    },

    /// Document request returned a non-success HTTP status
    ///
    /// Recoverable: the owning task is skipped, the batch continues.
    #[error("document request failed with HTTP {status}: book {book_id} slug {slug}")]
    DocumentUnavailable {
        /// HTTP status code returned by the document API
        status: u16,
        /// The book the document belongs to
        book_id: String,
        /// The document's source slug
        slug: String,
    },

    /// Document payload did not contain the expected content field
    ///
    /// Recoverable: the owning task is skipped, the batch continues.
    #[error("malformed document payload: book {book_id} slug {slug}")]
    MalformedDocument {
        /// The book the document belongs to
        book_id: String,
        /// The document's source slug
        slug: String,
    },

    /// Image request returned a non-success HTTP status
    ///
    /// Retryable; after exhausting retries the reference falls back to the
    /// original remote locator.
    #[error("image request failed with HTTP {status}: {url}")]
    ImageUnavailable {
        /// HTTP status code returned for the image
        status: u16,
        /// The remote image locator
        url: String,
    },

    /// A node references a parent uuid absent from the node list
    ///
    /// Malformed input; aborts path resolution without retry.
    #[error("unknown ancestor uuid in node list: {uuid}")]
    UnknownAncestor {
        /// The uuid that was referenced but never defined
        uuid: String,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_context() {
        let err = Error::UnknownAncestor {
            uuid: "abc123".to_string(),
        };
        assert!(err.to_string().contains("abc123"));

        let err = Error::DocumentUnavailable {
            status: 404,
            book_id: "42".to_string(),
            slug: "intro".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("intro"));
    }
}

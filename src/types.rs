//! Core data types shared across the mirror pipeline

use serde::Deserialize;
use std::path::PathBuf;

/// One node of the book's flat table of contents
///
/// The source listing delivers the tree as a flat list; hierarchy is encoded
/// through `parent_uuid` back-references. A node may simultaneously act as a
/// container (it has children) and carry a document (it has a `url` slug) —
/// the two roles are independent.
#[derive(Clone, Debug, Deserialize)]
pub struct TocEntry {
    /// Opaque node identity, unique within one listing
    pub uuid: String,

    /// Display title; sanitized before use as a path segment
    pub title: String,

    /// Identity of the parent node; empty string for roots
    #[serde(default)]
    pub parent_uuid: String,

    /// Node kind as reported by the source ("TITLE" for bare containers)
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Document source slug; empty when the node carries no document
    #[serde(default)]
    pub url: String,

    /// Identity of the first child; empty when the node has none
    #[serde(default)]
    pub child_uuid: String,
}

impl TocEntry {
    /// Parent identity, `None` for root nodes
    pub fn parent(&self) -> Option<&str> {
        if self.parent_uuid.is_empty() {
            None
        } else {
            Some(&self.parent_uuid)
        }
    }

    /// Whether this node is a directory in the mirrored tree
    pub fn is_container(&self) -> bool {
        self.kind == "TITLE" || !self.child_uuid.is_empty()
    }

    /// Document slug, `None` when the node carries no document
    pub fn doc_slug(&self) -> Option<&str> {
        if self.url.is_empty() {
            None
        } else {
            Some(&self.url)
        }
    }
}

/// A parsed book listing: identity plus the flat node list
#[derive(Clone, Debug)]
pub struct BookListing {
    /// Book identifier, rendered as a decimal string
    pub book_id: String,
    /// Table of contents in source order (order is significant: it drives
    /// summary-index ordering)
    pub toc: Vec<TocEntry>,
}

/// One unit of work for the dispatcher: fetch one document and persist it
///
/// Created by the tree walker, consumed exactly once by a worker. Target
/// paths are distinct across tasks, so tasks never contend on a file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchTask {
    /// The book the document belongs to
    pub book_id: String,
    /// Document source slug
    pub slug: String,
    /// Absolute (or run-relative) path the document is written to
    pub target_path: PathBuf,
}

/// Terminal state of one fetch task
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Document fetched, images localized, file written
    Written(PathBuf),
    /// Document unavailable or malformed; nothing written, batch continues
    Skipped {
        /// Why the document was skipped (for the completion report)
        reason: String,
    },
}

/// Aggregate result of a dispatched batch
///
/// Every submitted task is accounted for in exactly one counter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompletionReport {
    /// Documents fetched and written
    pub written: usize,
    /// Documents skipped (unavailable or malformed)
    pub skipped: usize,
    /// Documents that failed on local I/O after a successful fetch
    pub failed: usize,
}

impl CompletionReport {
    /// Total number of tasks that reached a terminal state
    pub fn total(&self) -> usize {
        self.written + self.skipped + self.failed
    }
}

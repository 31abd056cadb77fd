//! Book listing extraction
//!
//! The host page embeds the full table of contents as a URL-encoded JSON
//! payload inside a `decodeURIComponent("...")` call. This module pulls that
//! payload out, decodes it, and parses it into a [`BookListing`].

use crate::error::{Error, Result};
use crate::types::{BookListing, TocEntry};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static PAYLOAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Non-greedy body so multiple script blocks cannot merge into one match
    Regex::new(r#"decodeURIComponent\("(.+?)"\)\);"#).expect("payload regex is valid")
});

#[derive(Debug, Deserialize)]
struct RawListing {
    book: RawBook,
}

#[derive(Debug, Deserialize)]
struct RawBook {
    id: i64,
    toc: Vec<TocEntry>,
}

/// Extract and parse the embedded book listing from a host page
///
/// # Errors
///
/// [`Error::ListingNotFound`] when the page carries no embedded payload,
/// [`Error::Serialization`] when the decoded payload is not the expected
/// JSON shape. Both are fatal for the run.
pub fn parse_listing_page(page: &str, url: &str) -> Result<BookListing> {
    let captures = PAYLOAD_RE
        .captures(page)
        .ok_or_else(|| Error::ListingNotFound(url.to_string()))?;

    let encoded = &captures[1];
    let decoded = urlencoding::decode(encoded)
        .map_err(|_| Error::ListingNotFound(url.to_string()))?;

    let raw: RawListing = serde_json::from_str(&decoded)?;

    Ok(BookListing {
        book_id: raw.book.id.to_string(),
        toc: raw.book.toc,
    })
}

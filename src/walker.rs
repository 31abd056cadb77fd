//! Tree traversal, directory creation, and summary-index assembly
//!
//! The walker consumes the node list once, in source order. Order matters:
//! it determines both the ordering of `SUMMARY.md` lines and the nesting of
//! its headers. The summary is assembled from the planned paths, so it is
//! complete and consistent even when some documents later fail to fetch.

use crate::error::Result;
use crate::paths::PathResolver;
use crate::types::{FetchTask, TocEntry};
use std::path::Path;

/// Headers start at `##`: a root container is a level-2 heading
const HEADER_LEVEL_OFFSET: usize = 2;

/// Result of planning one book: the summary text plus the fetch tasks
#[derive(Clone, Debug)]
pub struct WalkOutput {
    /// Full `SUMMARY.md` content, one line per entry
    pub summary: String,
    /// One task per document node, in traversal order
    pub tasks: Vec<FetchTask>,
}

/// Plan the mirror of one book
///
/// For every container node the resolved directory is created under
/// `book_root` and a header line appended; for every document node an
/// indented link entry is appended and a [`FetchTask`] enqueued. A node that
/// is both gets both: its document takes `<path>.md` while its children nest
/// inside the directory `<path>/`.
///
/// # Errors
///
/// Propagates [`Error::UnknownAncestor`](crate::Error::UnknownAncestor) from
/// path resolution (malformed listing) and I/O errors from directory
/// creation.
pub async fn walk(book_root: &Path, book_id: &str, toc: &[TocEntry]) -> Result<WalkOutput> {
    let mut resolver = PathResolver::new(toc);
    let mut summary_lines: Vec<String> = Vec::new();
    let mut tasks: Vec<FetchTask> = Vec::new();

    for entry in toc {
        let rel_path = resolver.resolve(&entry.uuid)?;
        let depth = rel_path.matches('/').count();

        if entry.is_container() {
            tokio::fs::create_dir_all(book_root.join(&rel_path)).await?;

            let own_segment = rel_path.rsplit('/').next().unwrap_or(&rel_path);
            summary_lines.push(format!(
                "{} {}",
                "#".repeat(depth + HEADER_LEVEL_OFFSET),
                own_segment
            ));
        }

        if let Some(slug) = entry.doc_slug() {
            let md_rel = format!("{}.md", rel_path);
            summary_lines.push(format!(
                "{}* [{}]({})",
                "  ".repeat(depth),
                entry.title,
                percent_encode_path(&md_rel)
            ));

            tasks.push(FetchTask {
                book_id: book_id.to_string(),
                slug: slug.to_string(),
                target_path: book_root.join(&md_rel),
            });
        }
    }

    Ok(WalkOutput {
        summary: summary_lines.join("\n"),
        tasks,
    })
}

/// Percent-encode a relative path for use as a Markdown link target
///
/// Segments are encoded individually so the `/` separators survive.
fn percent_encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

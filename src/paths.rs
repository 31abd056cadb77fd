//! Path resolution for the mirrored directory tree
//!
//! The source listing is a flat node list with parent back-references; this
//! module turns it into sanitized, `/`-joined relative paths. Resolution is
//! memoized per uuid and walks ancestors iteratively, so deep trees cannot
//! overflow the stack.

use crate::error::{Error, Result};
use crate::types::TocEntry;
use std::collections::HashMap;

/// Characters that are invalid in path segments on common filesystems
const FORBIDDEN: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|', '\n', '\r'];

/// Placeholder segment for titles that sanitize to nothing
const EMPTY_TITLE_PLACEHOLDER: &str = "untitled";

/// Sanitize a node title into a single path segment
///
/// Each forbidden character is replaced with `_`. Idempotent: sanitizing an
/// already-sanitized title is a no-op. Titles that are empty or
/// whitespace-only after replacement map to a fixed placeholder rather than
/// producing an empty segment.
pub fn sanitize_title(title: &str) -> String {
    let sanitized: String = title
        .chars()
        .map(|c| if FORBIDDEN.contains(&c) { '_' } else { c })
        .collect();

    if sanitized.trim().is_empty() {
        EMPTY_TITLE_PLACEHOLDER.to_string()
    } else {
        sanitized
    }
}

/// Memoizing resolver from node identity to relative path
///
/// Built once per listing from the node list; `resolve` is then called by the
/// tree walker for every node, and ancestors are resolved lazily on first
/// reference.
pub struct PathResolver {
    /// uuid -> (title, parent uuid or None)
    nodes: HashMap<String, (String, Option<String>)>,
    /// uuid -> resolved relative path, immutable once inserted
    resolved: HashMap<String, String>,
}

impl PathResolver {
    /// Build a resolver over the given node list
    pub fn new(toc: &[TocEntry]) -> Self {
        let nodes = toc
            .iter()
            .map(|entry| {
                (
                    entry.uuid.clone(),
                    (
                        entry.title.clone(),
                        entry.parent().map(|p| p.to_string()),
                    ),
                )
            })
            .collect();

        Self {
            nodes,
            resolved: HashMap::new(),
        }
    }

    /// Resolve a node's full relative path, `/`-joined from sanitized titles
    ///
    /// A root node resolves to its own sanitized title; any other node to its
    /// parent's path plus one segment. Each uuid is resolved at most once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAncestor`] when `uuid` or any ancestor in its
    /// parent chain is absent from the node list. This indicates malformed
    /// input and is never retried.
    pub fn resolve(&mut self, uuid: &str) -> Result<String> {
        if let Some(path) = self.resolved.get(uuid) {
            return Ok(path.clone());
        }

        // Walk the parent chain until a memoized ancestor or a root, then
        // unwind the collected chain filling the memo top-down.
        let mut chain: Vec<String> = Vec::new();
        let mut current = uuid.to_string();
        let mut base: Option<String> = None;

        loop {
            if let Some(path) = self.resolved.get(&current) {
                base = Some(path.clone());
                break;
            }

            let (_, parent) = self
                .nodes
                .get(&current)
                .ok_or_else(|| Error::UnknownAncestor {
                    uuid: current.clone(),
                })?;

            let parent = parent.clone();
            chain.push(current);
            match parent {
                Some(p) => current = p,
                None => break,
            }
        }

        for id in chain.into_iter().rev() {
            let (title, _) = &self.nodes[&id];
            let segment = sanitize_title(title);
            let path = match &base {
                Some(prefix) => format!("{}/{}", prefix, segment),
                None => segment,
            };
            self.resolved.insert(id, path.clone());
            base = Some(path);
        }

        // base is always Some here: either a memo hit or at least one chain entry
        self.resolved
            .get(uuid)
            .cloned()
            .ok_or_else(|| Error::UnknownAncestor {
                uuid: uuid.to_string(),
            })
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fragment archive boundary.
//!
//! Procedure and parameter nodes reference entries in an external archive of
//! shader fragments. The archive service itself is a collaborator of the
//! hosting shell; this module defines the resolution contract the converter
//! needs when reconstructing a graph from its persisted form.

use crate::node::Item;
use std::collections::HashMap;

/// Declared connector signature of an archived fragment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FragmentSignature {
    /// Connectors the fragment declares, in order
    pub items: Vec<Item>,
}

impl FragmentSignature {
    /// Create a signature from its connectors.
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }
}

/// Resolves archive paths referenced by node tags.
pub trait FragmentArchive {
    /// Resolve `archive_path` to the fragment's signature.
    fn resolve(&self, archive_path: &str) -> Result<FragmentSignature, ResolutionError>;
}

/// A referenced external resource could not be resolved.
#[derive(Debug, thiserror::Error)]
#[error("unresolvable archive reference: {path}")]
pub struct ResolutionError {
    /// The archive path that failed to resolve
    pub path: String,
}

/// In-memory archive, for tests and embedders without an archive service.
#[derive(Debug, Default)]
pub struct MemoryArchive {
    entries: HashMap<String, FragmentSignature>,
}

impl MemoryArchive {
    /// Create an empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fragment signature under `path`.
    pub fn insert(&mut self, path: impl Into<String>, signature: FragmentSignature) {
        self.entries.insert(path.into(), signature);
    }
}

impl FragmentArchive for MemoryArchive {
    fn resolve(&self, archive_path: &str) -> Result<FragmentSignature, ResolutionError> {
        self.entries
            .get(archive_path)
            .cloned()
            .ok_or_else(|| ResolutionError {
                path: archive_path.to_string(),
            })
    }
}

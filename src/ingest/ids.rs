//! Deterministic document identities.

use std::collections::{HashMap, HashSet};

use super::frontmatter::SourceDocument;
use crate::constants::{IDENTITY_FIELDS, IDENTITY_SEPARATOR};

/// Joins the present identity fields, or falls back to `fallback` (usually the file stem).
pub fn base_identity(source: &SourceDocument, fallback: &str) -> String {
    let parts: Vec<String> = IDENTITY_FIELDS
        .iter()
        .filter_map(|field| source.meta_text(field))
        .map(|value| sanitize(&value))
        .filter(|value| !value.is_empty())
        .collect();

    if parts.is_empty() {
        let fallback = sanitize(fallback);
        if fallback.is_empty() {
            return "untitled".to_string();
        }
        return fallback;
    }

    parts.join(IDENTITY_SEPARATOR)
}

/// Replaces characters the store forbids in ids (`/`) and collapses whitespace into `-`.
fn sanitize(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .replace('/', "-")
}

/// Hands out unique ids per collection for one upload run.
#[derive(Debug, Default)]
pub struct IdentityAllocator {
    assigned: HashMap<String, HashSet<String>>,
}

impl IdentityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `base`, or `base_1`, `base_2`, ... if already taken in `collection`.
    pub fn assign(&mut self, collection: &str, base: &str) -> String {
        let taken = self.assigned.entry(collection.to_string()).or_default();

        let mut candidate = base.to_string();
        let mut suffix = 0usize;
        while taken.contains(&candidate) {
            suffix += 1;
            candidate = format!("{base}{IDENTITY_SEPARATOR}{suffix}");
        }

        taken.insert(candidate.clone());
        candidate
    }

    pub fn assigned_count(&self, collection: &str) -> usize {
        self.assigned.get(collection).map_or(0, HashSet::len)
    }
}

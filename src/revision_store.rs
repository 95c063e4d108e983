// src/revision_store.rs
//! Revision creation and insertion.
//!
//! Revisions are validated at the door: a proposal must carry offsets that
//! lie inside the current base text, must not overlap an outstanding
//! revision, and must have been captured against the base text as it exists
//! now (digest check). Span derivation and reconciliation can then assume a
//! consistent store.

use chrono::Utc;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;
use uuid::Uuid;

use crate::error::RevisionError;
use crate::models::{Document, Revision, RevisionStatus, SpanKind, TextSpan};

/// Number of characters in `s`
pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte index of the `char_offset`-th character of `s`
pub(crate) fn byte_offset(s: &str, char_offset: usize) -> usize {
    s.char_indices()
        .nth(char_offset)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Slice `s` by character offsets
pub(crate) fn slice_chars(s: &str, start: usize, end: usize) -> &str {
    &s[byte_offset(s, start)..byte_offset(s, end)]
}

/// Hex SHA-256 of a document's base content
pub(crate) fn content_digest(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Whether two `[start, end)` character ranges collide. Zero-length ranges
/// (pure insertions) collide only with each other at the same position or
/// when strictly inside another range; touching at a boundary is allowed.
pub(crate) fn ranges_overlap(a: (usize, usize), b: (usize, usize)) -> bool {
    if a.0 == a.1 && b.0 == b.1 {
        return a.0 == b.0;
    }
    a.0 < b.1 && b.0 < a.1
}

/// Create a pending revision replacing `content[start..end)` with `new_text`.
///
/// Captures the replaced substring verbatim into the revision's original
/// span. An empty `new_text` produces a pure deletion (`new_span = None`).
/// Pure function of its inputs except for id and timestamp generation;
/// `content` is not mutated.
pub fn create_revision(
    content: &str,
    start: usize,
    end: usize,
    new_text: &str,
) -> Result<Revision, RevisionError> {
    let len = char_len(content);
    if start > end || end > len {
        return Err(RevisionError::InvalidRange { start, end, len });
    }

    let id = Uuid::new_v4();
    let original_span =
        TextSpan::new(SpanKind::Deleted, slice_chars(content, start, end), start, end)
            .owned_by(id);
    let new_span = if new_text.is_empty() {
        None
    } else {
        Some(TextSpan::new(SpanKind::Inserted, new_text, start, start).owned_by(id))
    };

    Ok(Revision {
        id,
        original_span,
        new_span,
        status: RevisionStatus::Pending,
        created_at: Utc::now(),
        base_digest: content_digest(content),
    })
}

fn word_regex() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| {
        Regex::new(r"[\p{L}\p{N}]+(?:['’-][\p{L}\p{N}]+)*").expect("word pattern is valid")
    })
}

impl Document {
    pub fn new(base_content: impl Into<String>) -> Self {
        Self {
            base_content: base_content.into(),
            revisions: Vec::new(),
            active_revision_id: None,
        }
    }

    pub fn revision(&self, id: Uuid) -> Option<&Revision> {
        self.revisions.iter().find(|r| r.id == id)
    }

    pub fn has_pending(&self) -> bool {
        self.revisions.iter().any(|r| r.is_pending())
    }

    /// Create a revision against the current base text and insert it,
    /// marking it as the active revision.
    pub fn propose(
        &mut self,
        start: usize,
        end: usize,
        new_text: &str,
    ) -> Result<Uuid, RevisionError> {
        let revision = create_revision(&self.base_content, start, end, new_text)?;
        let id = revision.id;
        self.insert_revision(revision)?;
        self.active_revision_id = Some(id);
        Ok(id)
    }

    /// Insert an externally created revision.
    ///
    /// Fails with `Stale` when the revision was captured against a
    /// different base text, and with `Overlap` when its range collides
    /// with an outstanding revision. The document is unchanged on error.
    pub fn insert_revision(&mut self, revision: Revision) -> Result<(), RevisionError> {
        if revision.base_digest != content_digest(&self.base_content) {
            return Err(RevisionError::Stale { id: revision.id });
        }

        let (start, end) = revision.range();
        for existing in &self.revisions {
            if ranges_overlap(existing.range(), (start, end)) {
                return Err(RevisionError::Overlap {
                    id: revision.id,
                    existing: existing.id,
                    start,
                    end,
                });
            }
        }

        self.revisions.push(revision);
        Ok(())
    }

    /// Word count over the final content (pending replacements applied)
    pub fn word_count(&self) -> usize {
        word_regex().find_iter(&self.final_content()).count()
    }

    /// Character count over the final content
    pub fn char_count(&self) -> usize {
        char_len(&self.final_content())
    }
}

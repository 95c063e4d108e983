// src/reconciler.rs
//! Accept/reject reconciliation.
//!
//! Accepting folds the replacement text into the base content and purges the
//! revision in the same operation; rejecting discards the proposal and
//! leaves the base untouched. Both transitions are terminal, so `accepted`
//! and `rejected` are never observable on a stored document.
//!
//! Folding splices in descending start order against the pre-fold base, so
//! earlier offsets stay valid while later ones are rewritten first. The
//! anchors of any still-pending revision are then shifted by the net length
//! delta of the folds before them, which keeps sequential single accepts
//! positionally exact for disjoint ranges.

use log::{debug, warn};
use uuid::Uuid;

use crate::models::{Document, Revision, RevisionStatus, SpanKind};
use crate::revision_store::{byte_offset, char_len, content_digest};
use crate::span_builder::build_spans;

impl Document {
    /// Accept one revision: fold its replacement into the base text and
    /// drop it from the outstanding set. An unknown id is a no-op.
    pub fn accept_revision(&self, id: Uuid) -> Document {
        if self.revision(id).is_none() {
            warn!("accept requested for unknown revision {id}");
            return self.clone();
        }

        let mut doc = self.clone();
        for revision in &mut doc.revisions {
            if revision.id == id {
                revision.status = RevisionStatus::Accepted;
            }
        }
        doc.fold_accepted()
    }

    /// Reject one revision: discard it, leaving the base text untouched.
    /// An unknown id is a no-op, so rejecting twice is harmless.
    pub fn reject_revision(&self, id: Uuid) -> Document {
        if self.revision(id).is_none() {
            warn!("reject requested for unknown revision {id}");
            return self.clone();
        }

        let mut doc = self.clone();
        doc.revisions.retain(|r| r.id != id);
        if doc.active_revision_id == Some(id) {
            doc.active_revision_id = None;
        }
        doc
    }

    /// Accept every pending revision in one batch. For disjoint ranges the
    /// result equals accepting them one at a time.
    pub fn accept_all(&self) -> Document {
        let mut doc = self.clone();
        for revision in &mut doc.revisions {
            if revision.is_pending() {
                revision.status = RevisionStatus::Accepted;
            }
        }
        doc.fold_accepted()
    }

    /// Discard every pending revision, leaving the base text untouched.
    pub fn reject_all(&self) -> Document {
        let mut doc = self.clone();
        doc.revisions.retain(|r| !r.is_pending());
        if doc
            .active_revision_id
            .is_some_and(|id| doc.revision(id).is_none())
        {
            doc.active_revision_id = None;
        }
        doc
    }

    /// Final document text: every span except deletions. This is the value
    /// the persistence collaborator stores and counts run against.
    pub fn final_content(&self) -> String {
        build_spans(&self.base_content, &self.revisions)
            .into_iter()
            .filter(|s| s.kind != SpanKind::Deleted)
            .map(|s| s.text)
            .collect()
    }

    /// Bracket-annotated transcript exposing edit history, handed to the
    /// rewrite collaborator so it can see what was already proposed.
    pub fn full_context(&self) -> String {
        build_spans(&self.base_content, &self.revisions)
            .into_iter()
            .map(|s| match s.kind {
                SpanKind::Deleted => format!("[DELETED: {}]", s.text),
                SpanKind::Inserted => format!("[INSERTED: {}]", s.text),
                _ => s.text,
            })
            .collect()
    }

    /// Splice all currently-accepted revisions into the base text in
    /// descending start order, purge them, and remap the anchors of the
    /// remaining pending revisions onto the new base.
    fn fold_accepted(mut self) -> Document {
        let mut folded: Vec<Revision> = Vec::new();
        let mut remaining: Vec<Revision> = Vec::new();
        for revision in self.revisions.drain(..) {
            if revision.status == RevisionStatus::Accepted {
                folded.push(revision);
            } else {
                remaining.push(revision);
            }
        }

        if folded.is_empty() {
            self.revisions = remaining;
            return self;
        }

        folded.sort_by_key(|r| r.original_span.start);

        let mut content = self.base_content;
        for revision in folded.iter().rev() {
            let (start, end) = revision.range();
            let byte_start = byte_offset(&content, start);
            let byte_end = byte_offset(&content, end);
            content.replace_range(byte_start..byte_end, revision.replacement());
            debug!("folded revision {} over {}..{}", revision.id, start, end);
        }

        // Outstanding ranges never intersect a folded range, so remapping is
        // a pure shift by the length delta of the folds before each anchor.
        let digest = content_digest(&content);
        for revision in &mut remaining {
            let shift: isize = folded
                .iter()
                .filter(|f| f.original_span.end <= revision.original_span.start)
                .map(|f| {
                    char_len(f.replacement()) as isize
                        - (f.original_span.end - f.original_span.start) as isize
                })
                .sum();
            let span = &mut revision.original_span;
            span.start = (span.start as isize + shift) as usize;
            span.end = (span.end as isize + shift) as usize;
            if let Some(new_span) = &mut revision.new_span {
                new_span.start = span.start;
                new_span.end = span.start;
            }
            revision.base_digest = digest.clone();
        }

        let active_revision_id = self
            .active_revision_id
            .filter(|id| remaining.iter().any(|r| r.id == *id));

        Document {
            base_content: content,
            revisions: remaining,
            active_revision_id,
        }
    }
}

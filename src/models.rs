use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Classification of a rendered text segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    /// Base text untouched by any proposal
    Unchanged,
    /// Base text a pending revision proposes to remove (strikethrough)
    Deleted,
    /// Replacement text a pending revision proposes to add (highlight)
    Inserted,
    /// Reserved for the editor surface; the span builder never emits it
    Original,
}

/// A contiguous labeled slice of text, produced for rendering or for
/// deriving final output.
///
/// `start`/`end` are character offsets into the base text for `Unchanged`
/// and `Deleted` spans. `Inserted` spans sit at their insertion point with
/// `end == start`; they occupy no base-text range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    /// Fresh per construction; NOT stable across rebuilds
    pub id: Uuid,
    pub kind: SpanKind,
    pub text: String,
    pub start: usize,
    pub end: usize,
    /// Stable id of the owning revision, when there is one. The UI matches
    /// accept/reject controls against this, never against `id`.
    pub revision_id: Option<Uuid>,
}

impl TextSpan {
    pub fn new(kind: SpanKind, text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            text: text.into(),
            start,
            end,
            revision_id: None,
        }
    }

    /// Tag this span with the stable id of the revision that owns it
    pub fn owned_by(mut self, revision_id: Uuid) -> Self {
        self.revision_id = Some(revision_id);
        self
    }
}

/// Lifecycle state of a revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevisionStatus {
    /// Awaiting a decision; rendered as a deleted/inserted overlay pair
    Pending,
    /// Decided in favor. Transient: the accept path folds the replacement
    /// into the base text and purges the revision in the same operation,
    /// so no stored document exposes this state.
    Accepted,
    /// Discarded. Transient: rejected revisions are removed immediately.
    Rejected,
}

/// A single proposed replacement of a text range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    /// Stable for the revision's lifetime
    pub id: Uuid,
    /// The exact base substring being replaced and its range at creation time
    pub original_span: TextSpan,
    /// Replacement text; `None` means pure deletion
    pub new_span: Option<TextSpan>,
    pub status: RevisionStatus,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// Hex SHA-256 of the base text the offsets were captured against
    pub base_digest: String,
}

impl Revision {
    /// Character range this revision replaces in the base text
    pub fn range(&self) -> (usize, usize) {
        (self.original_span.start, self.original_span.end)
    }

    /// Replacement text; empty for a pure deletion
    pub fn replacement(&self) -> &str {
        self.new_span.as_ref().map(|s| s.text.as_str()).unwrap_or("")
    }

    pub fn is_pending(&self) -> bool {
        self.status == RevisionStatus::Pending
    }
}

/// An open document plus its outstanding edit proposals.
///
/// `base_content` is canonical: it already reflects every previously
/// accepted revision and is never touched by inserting a pending one.
/// `revisions` holds outstanding proposals in insertion order; span
/// derivation sorts by `original_span.start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub base_content: String,
    pub revisions: Vec<Revision>,
    /// Most recently created/focused revision; UI affordance only
    pub active_revision_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_kind_serialization() {
        let json = serde_json::to_string(&SpanKind::Unchanged).unwrap();
        assert_eq!(json, "\"unchanged\"");
        let json = serde_json::to_string(&SpanKind::Deleted).unwrap();
        assert_eq!(json, "\"deleted\"");
        let json = serde_json::to_string(&SpanKind::Inserted).unwrap();
        assert_eq!(json, "\"inserted\"");
    }

    #[test]
    fn test_text_span_roundtrip() {
        let span = TextSpan::new(SpanKind::Deleted, "cat", 4, 7).owned_by(Uuid::new_v4());

        let json = serde_json::to_string(&span).unwrap();
        let parsed: TextSpan = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.kind, SpanKind::Deleted);
        assert_eq!(parsed.text, "cat");
        assert_eq!(parsed.start, 4);
        assert_eq!(parsed.end, 7);
        assert_eq!(parsed.revision_id, span.revision_id);
    }

    #[test]
    fn test_inserted_span_occupies_no_range() {
        let span = TextSpan::new(SpanKind::Inserted, "dog", 4, 4);
        assert_eq!(span.start, span.end);
    }

    #[test]
    fn test_revision_replacement_defaults_empty() {
        let rev = Revision {
            id: Uuid::new_v4(),
            original_span: TextSpan::new(SpanKind::Deleted, "cat", 4, 7),
            new_span: None,
            status: RevisionStatus::Pending,
            created_at: Utc::now(),
            base_digest: String::new(),
        };
        assert_eq!(rev.replacement(), "");
        assert_eq!(rev.range(), (4, 7));
        assert!(rev.is_pending());
    }
}

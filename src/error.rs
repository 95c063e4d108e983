use thiserror::Error;
use uuid::Uuid;

/// Failures of revision creation and insertion.
///
/// All variants are recoverable: the operation that raised them leaves the
/// document untouched.
#[derive(Debug, Error)]
pub enum RevisionError {
    #[error("invalid range {start}..{end} for document of {len} characters")]
    InvalidRange {
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("revision {id} over {start}..{end} overlaps revision {existing}")]
    Overlap {
        id: Uuid,
        existing: Uuid,
        start: usize,
        end: usize,
    },

    #[error("revision {id} was captured against a different base text")]
    Stale { id: Uuid },
}

/// Failures at the rewrite-collaborator boundary
#[derive(Debug, Error)]
pub enum RewriteError {
    /// The external collaborator failed to produce a replacement
    #[error("rewrite provider error: {0}")]
    Provider(String),

    #[error(transparent)]
    Revision(#[from] RevisionError),
}

/// Failures of document-session operations
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("document not found: {0}")]
    DocumentNotFound(String),

    #[error("document manager lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Revision(#[from] RevisionError),
}

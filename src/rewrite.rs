// src/rewrite.rs
//! Boundary with the external rewrite collaborator (the AI service).
//!
//! The engine hands over the selected text, a bounded trailing window of the
//! edit-history transcript, and the user's instruction; the entire response
//! string becomes the replacement text of a new revision. Prompt
//! construction and transport live on the collaborator's side.

use serde::Serialize;
use uuid::Uuid;

use crate::error::{RevisionError, RewriteError};
use crate::models::Document;
use crate::revision_store::{char_len, slice_chars};
use crate::settings::EngineSettings;

/// Payload handed to the rewrite collaborator
#[derive(Debug, Clone, Serialize)]
pub struct RewriteRequest {
    /// The base substring the proposal will replace
    pub selected_text: String,
    /// Trailing window of the edit-history transcript, so the collaborator
    /// sees what was already proposed and rejected
    pub context: String,
    /// Free-form user instruction
    pub instruction: String,
}

/// External service that turns a rewrite request into replacement text.
///
/// Synchronous: the engine is single-threaded and cooperative, and a
/// revision exists only once the full replacement text is available.
/// Callers that stream responses buffer them before calling in.
pub trait RewriteService {
    fn rewrite(&self, request: &RewriteRequest) -> Result<String, RewriteError>;
}

/// Build the collaborator payload for a proposal over `start..end`.
///
/// The context is a suffix of the full transcript, at most
/// `settings.context_window` characters.
pub fn build_request(
    doc: &Document,
    start: usize,
    end: usize,
    instruction: &str,
    settings: &EngineSettings,
) -> Result<RewriteRequest, RevisionError> {
    let len = char_len(&doc.base_content);
    if start > end || end > len {
        return Err(RevisionError::InvalidRange { start, end, len });
    }

    let transcript = doc.full_context();
    let total = char_len(&transcript);
    let window_start = total.saturating_sub(settings.context_window);
    let context = slice_chars(&transcript, window_start, total).to_string();

    Ok(RewriteRequest {
        selected_text: slice_chars(&doc.base_content, start, end).to_string(),
        context,
        instruction: instruction.to_string(),
    })
}

/// Ask the collaborator for a replacement over `start..end` and insert the
/// response as a pending revision.
///
/// The input document is untouched when the collaborator fails or the range
/// is invalid; an abandoned in-flight request simply never reaches this
/// function.
pub fn propose_rewrite(
    doc: &Document,
    start: usize,
    end: usize,
    instruction: &str,
    service: &dyn RewriteService,
    settings: &EngineSettings,
) -> Result<(Document, Uuid), RewriteError> {
    let request = build_request(doc, start, end, instruction, settings)?;
    let replacement = service.rewrite(&request)?;

    let mut next = doc.clone();
    let id = next.propose(start, end, &replacement)?;
    Ok((next, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedRewrite(&'static str);

    impl RewriteService for CannedRewrite {
        fn rewrite(&self, _request: &RewriteRequest) -> Result<String, RewriteError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingRewrite;

    impl RewriteService for FailingRewrite {
        fn rewrite(&self, _request: &RewriteRequest) -> Result<String, RewriteError> {
            Err(RewriteError::Provider("upstream timeout".to_string()))
        }
    }

    #[test]
    fn test_build_request_selects_base_substring() {
        let doc = Document::new("The cat sat.");
        let request = build_request(&doc, 4, 7, "make it canine", &EngineSettings::default())
            .unwrap();

        assert_eq!(request.selected_text, "cat");
        assert_eq!(request.context, "The cat sat.");
        assert_eq!(request.instruction, "make it canine");
    }

    #[test]
    fn test_build_request_context_includes_edit_history() {
        let mut doc = Document::new("The cat sat.");
        doc.propose(4, 7, "dog").unwrap();

        let request =
            build_request(&doc, 8, 11, "rewrite", &EngineSettings::default()).unwrap();
        assert_eq!(request.context, "The [DELETED: cat][INSERTED: dog] sat.");
    }

    #[test]
    fn test_build_request_bounds_context_window() {
        let doc = Document::new("abcdefghij");
        let settings = EngineSettings {
            context_window: 4,
            ..EngineSettings::default()
        };

        let request = build_request(&doc, 0, 3, "shorten", &settings).unwrap();
        assert_eq!(request.context, "ghij");
        assert!(doc.full_context().ends_with(&request.context));
    }

    #[test]
    fn test_build_request_rejects_bad_range() {
        let doc = Document::new("short");
        let err = build_request(&doc, 3, 99, "x", &EngineSettings::default()).unwrap_err();
        assert!(matches!(err, RevisionError::InvalidRange { .. }));
    }

    #[test]
    fn test_propose_rewrite_inserts_response_as_revision() {
        let doc = Document::new("The cat sat.");
        let (next, id) = propose_rewrite(
            &doc,
            4,
            7,
            "make it canine",
            &CannedRewrite("dog"),
            &EngineSettings::default(),
        )
        .unwrap();

        assert_eq!(next.final_content(), "The dog sat.");
        assert_eq!(next.revision(id).unwrap().replacement(), "dog");
        assert_eq!(next.active_revision_id, Some(id));
        // the input document is untouched
        assert!(doc.revisions.is_empty());
    }

    #[test]
    fn test_propose_rewrite_provider_failure_leaves_document_untouched() {
        let doc = Document::new("The cat sat.");
        let err = propose_rewrite(
            &doc,
            4,
            7,
            "make it canine",
            &FailingRewrite,
            &EngineSettings::default(),
        )
        .unwrap_err();

        assert!(matches!(err, RewriteError::Provider(_)));
        assert!(doc.revisions.is_empty());
    }
}

// src/document_manager.rs
//! Document manager for multi-document support.
//!
//! Manages multiple in-memory documents with isolated revision state.
//! Loading text into the engine and persisting final content belong to the
//! external collaborator; the manager tracks which documents are open,
//! which one is active, and whether a document carries state its owner has
//! not persisted yet.

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::error::SessionError;
use crate::models::{Document, TextSpan};
use crate::span_builder::build_spans;

/// A handle to an open document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentHandle {
    pub id: String,
    pub title: String,
    pub is_modified: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub opened_at: DateTime<Utc>,
}

/// State for a single open document
#[derive(Debug, Clone)]
pub struct DocumentSession {
    pub handle: DocumentHandle,
    pub document: Document,
}

/// The document manager state
#[derive(Debug, Default)]
pub struct DocumentManager {
    pub documents: HashMap<String, DocumentSession>,
    pub active_document_id: Option<String>,
}

impl DocumentManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty document and make it active
    pub fn new_document(&mut self, title: &str) -> DocumentHandle {
        self.open_text(title, "")
    }

    /// Open externally loaded text as a new document and make it active
    pub fn open_text(&mut self, title: &str, content: &str) -> DocumentHandle {
        let doc_id = Uuid::new_v4().to_string();

        let handle = DocumentHandle {
            id: doc_id.clone(),
            title: title.to_string(),
            is_modified: false,
            opened_at: Utc::now(),
        };

        let session = DocumentSession {
            handle: handle.clone(),
            document: Document::new(content),
        };

        self.documents.insert(doc_id.clone(), session);
        self.active_document_id = Some(doc_id);

        handle
    }

    /// Close a document (returns false if unsaved state needs confirmation)
    pub fn close_document(&mut self, id: &str, force: bool) -> Result<bool, SessionError> {
        let session = self
            .documents
            .get(id)
            .ok_or_else(|| SessionError::DocumentNotFound(id.to_string()))?;

        let has_pending = session.document.has_pending();
        if (session.handle.is_modified || has_pending) && !force {
            return Ok(false);
        }
        if has_pending {
            warn!("closing document {id} with unresolved revisions");
        }

        self.documents.remove(id);

        // If this was the active document, switch to another
        if self.active_document_id.as_deref() == Some(id) {
            self.active_document_id = self.documents.keys().next().cloned();
        }

        Ok(true)
    }

    /// Set which document is currently active
    pub fn set_active_document(&mut self, id: &str) -> Result<(), SessionError> {
        if self.documents.contains_key(id) {
            self.active_document_id = Some(id.to_string());
            Ok(())
        } else {
            Err(SessionError::DocumentNotFound(id.to_string()))
        }
    }

    /// Get the active document, if any
    pub fn active_document(&self) -> Option<&DocumentSession> {
        self.active_document_id
            .as_ref()
            .and_then(|id| self.documents.get(id))
    }

    /// Get all open document handles
    pub fn open_documents(&self) -> Vec<DocumentHandle> {
        self.documents.values().map(|s| s.handle.clone()).collect()
    }

    fn session(&self, id: &str) -> Result<&DocumentSession, SessionError> {
        self.documents
            .get(id)
            .ok_or_else(|| SessionError::DocumentNotFound(id.to_string()))
    }

    fn session_mut(&mut self, id: &str) -> Result<&mut DocumentSession, SessionError> {
        self.documents
            .get_mut(id)
            .ok_or_else(|| SessionError::DocumentNotFound(id.to_string()))
    }

    /// Propose a revision over a range of the document's base text
    pub fn propose(
        &mut self,
        id: &str,
        start: usize,
        end: usize,
        new_text: &str,
    ) -> Result<Uuid, SessionError> {
        let session = self.session_mut(id)?;
        let revision_id = session.document.propose(start, end, new_text)?;
        session.handle.is_modified = true;
        Ok(revision_id)
    }

    /// Accept one revision of a document
    pub fn accept_revision(&mut self, id: &str, revision_id: Uuid) -> Result<(), SessionError> {
        let session = self.session_mut(id)?;
        if session.document.revision(revision_id).is_some() {
            session.document = session.document.accept_revision(revision_id);
            session.handle.is_modified = true;
        } else {
            warn!("document {id} has no revision {revision_id}");
        }
        Ok(())
    }

    /// Reject one revision of a document
    pub fn reject_revision(&mut self, id: &str, revision_id: Uuid) -> Result<(), SessionError> {
        let session = self.session_mut(id)?;
        if session.document.revision(revision_id).is_some() {
            session.document = session.document.reject_revision(revision_id);
            session.handle.is_modified = true;
        }
        Ok(())
    }

    /// Accept every pending revision of a document
    pub fn accept_all(&mut self, id: &str) -> Result<(), SessionError> {
        let session = self.session_mut(id)?;
        if session.document.has_pending() {
            session.document = session.document.accept_all();
            session.handle.is_modified = true;
        }
        Ok(())
    }

    /// Reject every pending revision of a document
    pub fn reject_all(&mut self, id: &str) -> Result<(), SessionError> {
        let session = self.session_mut(id)?;
        if session.document.has_pending() {
            session.document = session.document.reject_all();
            session.handle.is_modified = true;
        }
        Ok(())
    }

    /// Render model for the editor surface
    pub fn spans(&self, id: &str) -> Result<Vec<TextSpan>, SessionError> {
        let session = self.session(id)?;
        Ok(build_spans(
            &session.document.base_content,
            &session.document.revisions,
        ))
    }

    /// Final text for the persistence collaborator
    pub fn final_content(&self, id: &str) -> Result<String, SessionError> {
        Ok(self.session(id)?.document.final_content())
    }

    /// Edit-history transcript for the rewrite collaborator
    pub fn full_context(&self, id: &str) -> Result<String, SessionError> {
        Ok(self.session(id)?.document.full_context())
    }

    /// Clear the modified flag once the owner has persisted final content
    pub fn mark_saved(&mut self, id: &str) -> Result<(), SessionError> {
        self.session_mut(id)?.handle.is_modified = false;
        Ok(())
    }

    /// Update document title
    pub fn update_document_title(&mut self, id: &str, title: &str) -> Result<(), SessionError> {
        let session = self.session_mut(id)?;
        session.handle.title = title.to_string();
        session.handle.is_modified = true;
        Ok(())
    }
}

/// Clonable handle that lets an unrelated component (e.g. a chat panel)
/// inject revisions into one document without reaching for ambient globals:
/// the owning component constructs it and passes it down explicitly.
#[derive(Clone)]
pub struct RevisionInjector {
    manager: Arc<Mutex<DocumentManager>>,
    document_id: String,
}

impl RevisionInjector {
    pub fn new(manager: Arc<Mutex<DocumentManager>>, document_id: impl Into<String>) -> Self {
        Self {
            manager,
            document_id: document_id.into(),
        }
    }

    /// Propose a revision into the bound document
    pub fn inject(
        &self,
        start: usize,
        end: usize,
        new_text: &str,
    ) -> Result<Uuid, SessionError> {
        let mut manager = self
            .manager
            .lock()
            .map_err(|_| SessionError::LockPoisoned)?;
        manager.propose(&self.document_id, start, end, new_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_manager_default() {
        let manager = DocumentManager::default();
        assert!(manager.documents.is_empty());
        assert!(manager.active_document_id.is_none());
    }

    #[test]
    fn test_open_text_becomes_active() {
        let mut manager = DocumentManager::new();
        let handle = manager.open_text("Chapter 1", "The cat sat.");

        assert_eq!(manager.active_document_id, Some(handle.id.clone()));
        assert!(!handle.is_modified);
        assert_eq!(manager.open_documents().len(), 1);
        assert_eq!(
            manager.active_document().unwrap().document.base_content,
            "The cat sat."
        );
    }

    #[test]
    fn test_propose_marks_modified() {
        let mut manager = DocumentManager::new();
        let handle = manager.open_text("Chapter 1", "The cat sat.");

        manager.propose(&handle.id, 4, 7, "dog").unwrap();
        assert!(manager.session(&handle.id).unwrap().handle.is_modified);
    }

    #[test]
    fn test_accept_flow_through_manager() {
        let mut manager = DocumentManager::new();
        let handle = manager.open_text("Chapter 1", "The cat sat.");

        let revision_id = manager.propose(&handle.id, 4, 7, "dog").unwrap();
        manager.accept_revision(&handle.id, revision_id).unwrap();

        assert_eq!(manager.final_content(&handle.id).unwrap(), "The dog sat.");
        let session = manager.session(&handle.id).unwrap();
        assert!(session.document.revisions.is_empty());
    }

    #[test]
    fn test_close_refuses_with_pending_revisions() {
        let mut manager = DocumentManager::new();
        let handle = manager.open_text("Chapter 1", "The cat sat.");
        manager.propose(&handle.id, 4, 7, "dog").unwrap();

        assert!(!manager.close_document(&handle.id, false).unwrap());
        assert!(manager.close_document(&handle.id, true).unwrap());
        assert!(manager.documents.is_empty());
        assert!(manager.active_document_id.is_none());
    }

    #[test]
    fn test_close_unknown_document_errors() {
        let mut manager = DocumentManager::new();
        let err = manager.close_document("no-such-id", false).unwrap_err();
        assert!(matches!(err, SessionError::DocumentNotFound(_)));
    }

    #[test]
    fn test_mark_saved_clears_modified() {
        let mut manager = DocumentManager::new();
        let handle = manager.open_text("Chapter 1", "The cat sat.");
        manager.propose(&handle.id, 4, 7, "dog").unwrap();

        manager.mark_saved(&handle.id).unwrap();
        assert!(!manager.session(&handle.id).unwrap().handle.is_modified);
    }

    #[test]
    fn test_injector_proposes_into_bound_document() {
        let manager = Arc::new(Mutex::new(DocumentManager::new()));
        let handle = manager.lock().unwrap().open_text("Chapter 1", "The cat sat.");

        let injector = RevisionInjector::new(Arc::clone(&manager), handle.id.clone());
        let revision_id = injector.inject(4, 7, "dog").unwrap();

        let guard = manager.lock().unwrap();
        let session = guard.session(&handle.id).unwrap();
        assert_eq!(session.document.revision(revision_id).unwrap().replacement(), "dog");
        assert_eq!(session.document.active_revision_id, Some(revision_id));
    }

    #[test]
    fn test_injector_clone_targets_same_document() {
        let manager = Arc::new(Mutex::new(DocumentManager::new()));
        let handle = manager.lock().unwrap().open_text("Chapter 1", "abc defg hij");

        let injector = RevisionInjector::new(Arc::clone(&manager), handle.id.clone());
        let other = injector.clone();

        injector.inject(0, 3, "Xx").unwrap();
        other.inject(9, 12, "Yy").unwrap();

        let guard = manager.lock().unwrap();
        assert_eq!(guard.session(&handle.id).unwrap().document.revisions.len(), 2);
    }

    #[test]
    fn test_injector_reports_invalid_range() {
        let manager = Arc::new(Mutex::new(DocumentManager::new()));
        let handle = manager.lock().unwrap().open_text("Chapter 1", "short");

        let injector = RevisionInjector::new(Arc::clone(&manager), handle.id.clone());
        let err = injector.inject(2, 99, "x").unwrap_err();
        assert!(matches!(err, SessionError::Revision(_)));
    }
}

pub mod models;
pub mod error;
pub mod revision_store;
pub mod span_builder;
pub mod reconciler;
pub mod revision_calculator;
pub mod rewrite;
pub mod document_manager;
pub mod settings;

pub use document_manager::{DocumentHandle, DocumentManager, DocumentSession, RevisionInjector};
pub use error::{RevisionError, RewriteError, SessionError};
pub use models::{Document, Revision, RevisionStatus, SpanKind, TextSpan};
pub use revision_calculator::revisions_from_rewrite;
pub use revision_store::create_revision;
pub use rewrite::{propose_rewrite, RewriteRequest, RewriteService};
pub use settings::{load_settings, save_settings, EngineSettings};
pub use span_builder::build_spans;

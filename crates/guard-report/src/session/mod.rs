//! Form sessions: each user's in-progress evaluation, edited field by field and
//! re-scored live until a document is generated.

pub mod domain;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    edited_observation, effective_observation, fill_observation_placeholders, CategoryDraft,
    EvaluationSession, HeaderDraft, IncompleteHeader, LiveResult, SessionError, SessionId,
    SessionView,
};
pub use router::{document_response, session_router, status_for, CategoryUpdate, DocumentQuery};
pub use service::{EvaluationSessionService, SessionServiceError};
pub use store::{SessionStore, StoreError};

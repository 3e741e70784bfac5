use super::domain::{EvaluationSession, SessionId};

/// Storage abstraction so the session service can be exercised in isolation.
pub trait SessionStore: Send + Sync {
    fn insert(&self, session: EvaluationSession) -> Result<(), StoreError>;
    fn update(&self, session: EvaluationSession) -> Result<(), StoreError>;
    fn fetch(&self, id: &SessionId) -> Result<Option<EvaluationSession>, StoreError>;
    fn remove(&self, id: &SessionId) -> Result<Option<EvaluationSession>, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("session limit of {limit} reached")]
    Capacity { limit: usize },
    #[error("session already exists")]
    Conflict,
    #[error("session not found")]
    NotFound,
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

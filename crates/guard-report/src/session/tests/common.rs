use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::config::ReportConfig;
use crate::session::domain::{EvaluationSession, HeaderDraft, SessionId};
use crate::session::store::{SessionStore, StoreError};
use crate::session::{session_router, EvaluationSessionService};

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    sessions: Arc<Mutex<HashMap<SessionId, EvaluationSession>>>,
}

impl MemoryStore {
    pub(super) fn len(&self) -> usize {
        self.sessions.lock().expect("store mutex poisoned").len()
    }
}

impl SessionStore for MemoryStore {
    fn insert(&self, session: EvaluationSession) -> Result<(), StoreError> {
        let mut guard = self.sessions.lock().expect("store mutex poisoned");
        if guard.contains_key(&session.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(session.id, session);
        Ok(())
    }

    fn update(&self, session: EvaluationSession) -> Result<(), StoreError> {
        let mut guard = self.sessions.lock().expect("store mutex poisoned");
        match guard.get_mut(&session.id) {
            Some(existing) => {
                *existing = session;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<EvaluationSession>, StoreError> {
        let guard = self.sessions.lock().expect("store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn remove(&self, id: &SessionId) -> Result<Option<EvaluationSession>, StoreError> {
        let mut guard = self.sessions.lock().expect("store mutex poisoned");
        Ok(guard.remove(id))
    }
}

pub(super) struct FullStore;

impl SessionStore for FullStore {
    fn insert(&self, _session: EvaluationSession) -> Result<(), StoreError> {
        Err(StoreError::Capacity { limit: 1 })
    }

    fn update(&self, _session: EvaluationSession) -> Result<(), StoreError> {
        Err(StoreError::NotFound)
    }

    fn fetch(&self, _id: &SessionId) -> Result<Option<EvaluationSession>, StoreError> {
        Ok(None)
    }

    fn remove(&self, _id: &SessionId) -> Result<Option<EvaluationSession>, StoreError> {
        Ok(None)
    }
}

pub(super) struct UnavailableStore;

impl SessionStore for UnavailableStore {
    fn insert(&self, _session: EvaluationSession) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn update(&self, _session: EvaluationSession) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn fetch(&self, _id: &SessionId) -> Result<Option<EvaluationSession>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn remove(&self, _id: &SessionId) -> Result<Option<EvaluationSession>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }
}

pub(super) fn complete_header() -> HeaderDraft {
    HeaderDraft {
        informer: "Sargento Gómez".to_string(),
        date: NaiveDate::from_ymd_opt(2025, 9, 24),
        subject: "Juan Pérez".to_string(),
        post: "Guardia de puerta".to_string(),
    }
}

pub(super) fn build_service() -> (EvaluationSessionService<MemoryStore>, MemoryStore) {
    let store = MemoryStore::default();
    let service = EvaluationSessionService::new(Arc::new(store.clone()), ReportConfig::default());
    (service, store)
}

pub(super) fn router_with_service(service: EvaluationSessionService<MemoryStore>) -> axum::Router {
    session_router(Arc::new(service))
}

pub(super) async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body")
        .to_vec()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = read_body(response).await;
    serde_json::from_slice(&body).expect("json payload")
}

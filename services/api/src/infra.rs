use chrono::NaiveDate;
use guard_report::config::ReportConfig;
use guard_report::evaluation::parse_report_date;
use guard_report::render::DocumentFormat;
use guard_report::session::{EvaluationSession, SessionId, SessionStore, StoreError};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) report: ReportConfig,
}

/// Session store bounded by `APP_MAX_SESSIONS`; new sessions are refused once full.
#[derive(Clone)]
pub(crate) struct InMemorySessionStore {
    sessions: Arc<Mutex<HashMap<SessionId, EvaluationSession>>>,
    limit: usize,
}

impl InMemorySessionStore {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            limit,
        }
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<SessionId, EvaluationSession>>, StoreError> {
        self.sessions
            .lock()
            .map_err(|_| StoreError::Unavailable("session store mutex poisoned".to_string()))
    }
}

impl SessionStore for InMemorySessionStore {
    fn insert(&self, session: EvaluationSession) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&session.id) {
            return Err(StoreError::Conflict);
        }
        if guard.len() >= self.limit {
            return Err(StoreError::Capacity { limit: self.limit });
        }
        guard.insert(session.id, session);
        Ok(())
    }

    fn update(&self, session: EvaluationSession) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        match guard.get_mut(&session.id) {
            Some(existing) => {
                *existing = session;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<EvaluationSession>, StoreError> {
        let guard = self.lock()?;
        Ok(guard.get(id).cloned())
    }

    fn remove(&self, id: &SessionId) -> Result<Option<EvaluationSession>, StoreError> {
        let mut guard = self.lock()?;
        Ok(guard.remove(id))
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    parse_report_date(raw)
}

pub(crate) fn parse_format(raw: &str) -> Result<DocumentFormat, String> {
    raw.parse()
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.filter(|value| !value.trim().is_empty())
        .map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}

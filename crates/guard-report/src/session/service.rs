use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{
    CategoryDraft, EvaluationSession, HeaderDraft, LiveResult, SessionError, SessionId,
    SessionView,
};
use super::store::{SessionStore, StoreError};
use crate::config::ReportConfig;
use crate::evaluation::{Category, EvaluationError};
use crate::render::{render_document, DocumentFormat, RenderError, RenderedDocument};

/// Service driving form sessions: edits, live scoring and document generation.
pub struct EvaluationSessionService<S> {
    store: Arc<S>,
    report: ReportConfig,
}

impl<S> EvaluationSessionService<S>
where
    S: SessionStore + 'static,
{
    pub fn new(store: Arc<S>, report: ReportConfig) -> Self {
        Self { store, report }
    }

    /// Open a blank session with every category unchecked.
    pub fn create(&self) -> Result<SessionView, SessionServiceError> {
        let session = EvaluationSession::new(SessionId::generate(), Utc::now());
        let view = session.view()?;
        self.store.insert(session)?;
        info!(session = %view.id, "evaluation session opened");
        Ok(view)
    }

    pub fn get(&self, id: &SessionId) -> Result<SessionView, SessionServiceError> {
        Ok(self.load(id)?.view()?)
    }

    pub fn delete(&self, id: &SessionId) -> Result<(), SessionServiceError> {
        self.store
            .remove(id)?
            .ok_or(SessionServiceError::NotFound(*id))?;
        info!(session = %id, "evaluation session closed");
        Ok(())
    }

    pub fn update_header(
        &self,
        id: &SessionId,
        header: HeaderDraft,
    ) -> Result<SessionView, SessionServiceError> {
        self.modify(id, |session| {
            session.header = header;
            Ok(())
        })
    }

    /// Replace one category's answers and return its freshly derived score.
    pub fn answer_category(
        &self,
        id: &SessionId,
        category: Category,
        answers: &[bool],
        observation: Option<String>,
    ) -> Result<LiveResult, SessionServiceError> {
        let draft = CategoryDraft::from_answers(answers, observation)?;
        let view = self.modify(id, |session| {
            session.set_category(category, draft);
            Ok(())
        })?;

        view.categories
            .into_iter()
            .find(|result| result.category == category)
            .ok_or_else(|| {
                SessionServiceError::Evaluation(EvaluationError::InvalidInput(format!(
                    "category {category} missing from session view"
                )))
            })
    }

    pub fn update_observations(
        &self,
        id: &SessionId,
        observations: String,
    ) -> Result<SessionView, SessionServiceError> {
        self.modify(id, |session| {
            session.general_observations = observations;
            Ok(())
        })
    }

    /// Build and render the report. Nothing is produced unless every check passes.
    pub fn generate(
        &self,
        id: &SessionId,
        format: Option<DocumentFormat>,
    ) -> Result<RenderedDocument, SessionServiceError> {
        let session = self.load(id)?;
        let format = format.unwrap_or(self.report.format);
        let model = session.build_report().map_err(|err| {
            warn!(session = %id, error = %err, "report generation rejected");
            err
        })?;
        let document = render_document(&model, format, self.report.render_options())?;

        info!(
            session = %id,
            file_name = %document.file_name,
            "report generated for session"
        );
        Ok(document)
    }

    fn load(&self, id: &SessionId) -> Result<EvaluationSession, SessionServiceError> {
        self.store
            .fetch(id)?
            .ok_or(SessionServiceError::NotFound(*id))
    }

    fn modify<F>(&self, id: &SessionId, change: F) -> Result<SessionView, SessionServiceError>
    where
        F: FnOnce(&mut EvaluationSession) -> Result<(), SessionServiceError>,
    {
        let mut session = self.load(id)?;
        change(&mut session)?;
        session.updated_at = Utc::now();
        let view = session.view()?;
        self.store.update(session)?;
        Ok(view)
    }
}

/// Error raised by the session service.
#[derive(Debug, thiserror::Error)]
pub enum SessionServiceError {
    #[error("session {0} not found")]
    NotFound(SessionId),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

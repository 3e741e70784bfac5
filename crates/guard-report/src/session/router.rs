use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{HeaderDraft, SessionError, SessionId};
use super::service::{EvaluationSessionService, SessionServiceError};
use super::store::{SessionStore, StoreError};
use crate::evaluation::Category;
use crate::render::{DocumentFormat, RenderError, RenderedDocument};

/// Router builder exposing the per-session form API.
pub fn session_router<S>(service: Arc<EvaluationSessionService<S>>) -> Router
where
    S: SessionStore + 'static,
{
    Router::new()
        .route("/api/v1/sessions", post(create_handler::<S>))
        .route(
            "/api/v1/sessions/:session_id",
            get(view_handler::<S>).delete(delete_handler::<S>),
        )
        .route(
            "/api/v1/sessions/:session_id/header",
            put(header_handler::<S>),
        )
        .route(
            "/api/v1/sessions/:session_id/categories/:slug",
            put(category_handler::<S>),
        )
        .route(
            "/api/v1/sessions/:session_id/observations",
            put(observations_handler::<S>),
        )
        .route(
            "/api/v1/sessions/:session_id/document",
            post(document_handler::<S>),
        )
        .with_state(service)
}

/// Checkbox update for one category. Omitting `observation` keeps the score placeholder.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryUpdate {
    pub answers: Vec<bool>,
    #[serde(default)]
    pub observation: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservationsUpdate {
    #[serde(default)]
    pub general_observations: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentQuery {
    pub format: Option<String>,
}

impl DocumentQuery {
    pub fn parse(&self) -> Result<Option<DocumentFormat>, String> {
        self.format
            .as_deref()
            .map(str::parse::<DocumentFormat>)
            .transpose()
    }
}

/// Download response carrying the document bytes and attachment headers.
pub fn document_response(document: RenderedDocument) -> Response {
    let disposition = HeaderValue::from_str(&document.content_disposition())
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    let content_type = HeaderValue::from_str(document.content_type.as_ref())
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.bytes,
    )
        .into_response()
}

/// Status used for a session service failure.
pub fn status_for(error: &SessionServiceError) -> StatusCode {
    match error {
        SessionServiceError::NotFound(_) | SessionServiceError::Store(StoreError::NotFound) => {
            StatusCode::NOT_FOUND
        }
        SessionServiceError::Session(SessionError::IncompleteHeader(_))
        | SessionServiceError::Session(SessionError::Evaluation(_))
        | SessionServiceError::Evaluation(_)
        | SessionServiceError::Render(RenderError::Unencodable { .. }) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        SessionServiceError::Store(StoreError::Capacity { .. }) => StatusCode::SERVICE_UNAVAILABLE,
        SessionServiceError::Store(StoreError::Conflict)
        | SessionServiceError::Store(StoreError::Unavailable(_))
        | SessionServiceError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for SessionServiceError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        let mut payload = json!({ "error": self.to_string() });
        if let SessionServiceError::Session(SessionError::IncompleteHeader(missing)) = &self {
            payload["missing_fields"] = json!(missing.missing);
        }
        (status, axum::Json(payload)).into_response()
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let payload = json!({ "error": message.into() });
    (status, axum::Json(payload)).into_response()
}

fn parse_session_id(raw: &str) -> Result<SessionId, Response> {
    raw.parse::<SessionId>().map_err(|_| {
        error_response(StatusCode::NOT_FOUND, format!("session {raw} not found"))
    })
}

pub(crate) async fn create_handler<S>(
    State(service): State<Arc<EvaluationSessionService<S>>>,
) -> Response
where
    S: SessionStore + 'static,
{
    match service.create() {
        Ok(view) => (StatusCode::CREATED, axum::Json(view)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn view_handler<S>(
    State(service): State<Arc<EvaluationSessionService<S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
{
    let id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match service.get(&id) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn delete_handler<S>(
    State(service): State<Arc<EvaluationSessionService<S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
{
    let id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match service.delete(&id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn header_handler<S>(
    State(service): State<Arc<EvaluationSessionService<S>>>,
    Path(session_id): Path<String>,
    axum::Json(header): axum::Json<HeaderDraft>,
) -> Response
where
    S: SessionStore + 'static,
{
    let id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match service.update_header(&id, header) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn category_handler<S>(
    State(service): State<Arc<EvaluationSessionService<S>>>,
    Path((session_id, slug)): Path<(String, String)>,
    axum::Json(update): axum::Json<CategoryUpdate>,
) -> Response
where
    S: SessionStore + 'static,
{
    let id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let Some(category) = Category::from_slug(&slug) else {
        return error_response(
            StatusCode::NOT_FOUND,
            format!("'{slug}' is not a known category"),
        );
    };

    match service.answer_category(&id, category, &update.answers, update.observation) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn observations_handler<S>(
    State(service): State<Arc<EvaluationSessionService<S>>>,
    Path(session_id): Path<String>,
    axum::Json(update): axum::Json<ObservationsUpdate>,
) -> Response
where
    S: SessionStore + 'static,
{
    let id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match service.update_observations(&id, update.general_observations) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn document_handler<S>(
    State(service): State<Arc<EvaluationSessionService<S>>>,
    Path(session_id): Path<String>,
    Query(query): Query<DocumentQuery>,
) -> Response
where
    S: SessionStore + 'static,
{
    let id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let format = match query.parse() {
        Ok(format) => format,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    match service.generate(&id, format) {
        Ok(document) => document_response(document),
        Err(error) => error.into_response(),
    }
}

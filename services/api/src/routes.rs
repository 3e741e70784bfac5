use crate::form::{form_page, submit_form};
use crate::infra::{deserialize_optional_date, AppState};
use axum::extract::Query;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use chrono::NaiveDate;
use guard_report::error::AppError;
use guard_report::evaluation::{
    average_score, build_report, score_from_answers, AnswerSheet, Category, CategoryAnswer,
    CategoryEntry, EvaluationError, Grade, Score,
};
use guard_report::render::render_document;
use guard_report::session::{
    document_response, effective_observation, session_router, DocumentQuery,
    EvaluationSessionService, HeaderDraft, SessionStore,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct PreviewRequest {
    pub(crate) categories: Vec<PreviewEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PreviewEntry {
    pub(crate) category: Category,
    pub(crate) answers: Vec<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PreviewResult {
    pub(crate) category: Category,
    pub(crate) slug: &'static str,
    pub(crate) score: Score,
    pub(crate) score_text: String,
    pub(crate) grade: Grade,
}

#[derive(Debug, Serialize)]
pub(crate) struct PreviewResponse {
    pub(crate) categories: Vec<PreviewResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) average_score: Option<Score>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) average_grade: Option<Grade>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct HeaderRequest {
    pub(crate) informer: String,
    #[serde(deserialize_with = "deserialize_optional_date")]
    pub(crate) date: Option<NaiveDate>,
    pub(crate) subject: String,
    pub(crate) post: String,
}

impl From<HeaderRequest> for HeaderDraft {
    fn from(value: HeaderRequest) -> Self {
        HeaderDraft {
            informer: value.informer,
            date: value.date,
            subject: value.subject,
            post: value.post,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReportCategoryRequest {
    pub(crate) category: Category,
    pub(crate) answers: Vec<bool>,
    #[serde(default)]
    pub(crate) observation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReportRequest {
    pub(crate) header: HeaderRequest,
    pub(crate) categories: Vec<ReportCategoryRequest>,
    #[serde(default)]
    pub(crate) general_observations: String,
}

pub(crate) fn with_report_routes<S>(service: Arc<EvaluationSessionService<S>>) -> axum::Router
where
    S: SessionStore + 'static,
{
    session_router(service)
        .route("/", axum::routing::get(form_page))
        .route("/form", axum::routing::post(submit_form))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/evaluation/preview",
            axum::routing::post(preview_endpoint),
        )
        .route("/api/v1/reports", axum::routing::post(report_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Scores whatever categories are supplied; the average appears once all are present.
pub(crate) async fn preview_endpoint(
    Json(payload): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, AppError> {
    let mut seen = Vec::with_capacity(payload.categories.len());
    let mut categories = Vec::with_capacity(payload.categories.len());
    for entry in payload.categories {
        if seen.contains(&entry.category) {
            return Err(EvaluationError::DuplicateCategory(entry.category).into());
        }
        seen.push(entry.category);

        let score = score_from_answers(&entry.answers)?;
        categories.push(PreviewResult {
            category: entry.category,
            slug: entry.category.slug(),
            score,
            score_text: score.to_string(),
            grade: score.grade(),
        });
    }
    categories.sort_by_key(|result| result.category.position());

    let average = if categories.len() == Category::COUNT {
        let scores: Vec<Score> = categories.iter().map(|result| result.score).collect();
        Some(average_score(&scores)?)
    } else {
        None
    };

    Ok(Json(PreviewResponse {
        categories,
        average_score: average,
        average_grade: average.map(Score::grade),
    }))
}

pub(crate) async fn report_endpoint(
    Extension(state): Extension<AppState>,
    Query(query): Query<DocumentQuery>,
    Json(payload): Json<ReportRequest>,
) -> Result<Response, AppError> {
    let format = query
        .parse()
        .map_err(AppError::Input)?
        .unwrap_or(state.report.format);

    let header = HeaderDraft::from(payload.header).complete()?;
    let entries = payload
        .categories
        .into_iter()
        .map(|entry| -> Result<CategoryEntry, EvaluationError> {
            let score = score_from_answers(&entry.answers)?;
            let observation = effective_observation(entry.observation.as_deref(), score);
            Ok(CategoryEntry {
                category: entry.category,
                answer: CategoryAnswer::new(entry.answers, observation),
            })
        })
        .collect::<Result<Vec<_>, EvaluationError>>()?;
    let sheet = AnswerSheet::from_entries(entries)?;

    let model = build_report(header, &sheet, payload.general_observations)?;
    let document = render_document(&model, format, state.report.render_options())?;
    Ok(document_response(document))
}

use crate::config::ConfigError;
use crate::evaluation::{AnswerImportError, EvaluationError};
use crate::render::RenderError;
use crate::session::{status_for, IncompleteHeader, SessionError, SessionServiceError};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Evaluation(EvaluationError),
    Header(IncompleteHeader),
    Import(AnswerImportError),
    Session(SessionServiceError),
    Render(RenderError),
    Input(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Evaluation(err) => write!(f, "evaluation error: {}", err),
            AppError::Header(err) => write!(f, "{}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
            AppError::Session(err) => write!(f, "session error: {}", err),
            AppError::Render(err) => write!(f, "render error: {}", err),
            AppError::Input(message) => write!(f, "invalid input: {}", message),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Evaluation(err) => Some(err),
            AppError::Header(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Session(err) => Some(err),
            AppError::Render(err) => Some(err),
            AppError::Input(_) => None,
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Evaluation(_)
            | AppError::Header(_)
            | AppError::Import(_)
            | AppError::Render(RenderError::Unencodable { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Input(_) => StatusCode::BAD_REQUEST,
            AppError::Session(err) => status_for(err),
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut payload = json!({ "error": self.to_string() });
        if let AppError::Header(err) = &self {
            payload["missing_fields"] = json!(err.missing);
        }
        (status, Json(payload)).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<EvaluationError> for AppError {
    fn from(value: EvaluationError) -> Self {
        Self::Evaluation(value)
    }
}

impl From<IncompleteHeader> for AppError {
    fn from(value: IncompleteHeader) -> Self {
        Self::Header(value)
    }
}

impl From<SessionError> for AppError {
    fn from(value: SessionError) -> Self {
        match value {
            SessionError::IncompleteHeader(err) => Self::Header(err),
            SessionError::Evaluation(err) => Self::Evaluation(err),
        }
    }
}

impl From<AnswerImportError> for AppError {
    fn from(value: AnswerImportError) -> Self {
        Self::Import(value)
    }
}

impl From<SessionServiceError> for AppError {
    fn from(value: SessionServiceError) -> Self {
        Self::Session(value)
    }
}

impl From<RenderError> for AppError {
    fn from(value: RenderError) -> Self {
        Self::Render(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::Category;
    use crate::session::{SessionId, StoreError};

    #[test]
    fn maps_domain_failures_to_client_errors() {
        assert_eq!(
            AppError::from(EvaluationError::MissingCategory(Category::Trato)).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::from(IncompleteHeader {
                missing: vec!["post"]
            })
            .status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::Input("bad date".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn maps_session_failures_through_session_status() {
        assert_eq!(
            AppError::from(SessionServiceError::NotFound(SessionId::generate())).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(SessionServiceError::Store(StoreError::Capacity { limit: 4 }))
                .status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::from(RenderError::Layout("overflow".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unprintable_text_is_a_client_error() {
        let unencodable = || RenderError::Unencodable {
            field: "subject".to_string(),
            character: 'Ł',
        };
        assert_eq!(
            AppError::from(unencodable()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::from(SessionServiceError::Render(unencodable())).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}

//! Pure scoring rules and the immutable report snapshot built from them.

mod answers;
mod catalog;
mod header;
pub mod import;
mod report;
mod scoring;

pub use answers::{AnswerSheet, CategoryAnswer, CategoryEntry};
pub use catalog::{Category, QUESTIONS_PER_CATEGORY};
pub use header::{parse_report_date, ReportHeader, DATE_DISPLAY_FORMAT};
pub use import::{AnswerImportError, AnswerImporter};
pub use report::{build_report, CategoryResult, ReportModel};
pub use scoring::{average_score, letter_from_score, score_from_answers, Grade, Score};

/// Construction-time failures that abort report generation before rendering.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluationError {
    #[error("invalid evaluation input: {0}")]
    InvalidInput(String),
    #[error("no answers were provided for category {0}")]
    MissingCategory(Category),
    #[error("answers for category {0} were provided more than once")]
    DuplicateCategory(Category),
}

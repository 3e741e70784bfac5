use super::answers::{AnswerSheet, CategoryAnswer};
use super::catalog::Category;
use super::header::ReportHeader;
use super::scoring::{average_score, score_from_answers, Grade, Score};
use super::EvaluationError;
use serde::Serialize;

/// Score, letter and observation derived from one category's answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryResult {
    pub category: Category,
    pub score: Score,
    pub grade: Grade,
    pub observation: String,
}

impl CategoryResult {
    pub fn from_answer(category: Category, answer: &CategoryAnswer) -> Result<Self, EvaluationError> {
        let score = score_from_answers(&answer.answers)?;
        Ok(Self {
            category,
            score,
            grade: score.grade(),
            observation: answer.observation.clone(),
        })
    }
}

/// Immutable snapshot of a finished evaluation, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportModel {
    header: ReportHeader,
    results: Vec<CategoryResult>,
    average_score: Score,
    average_grade: Grade,
    general_observations: String,
}

impl ReportModel {
    pub fn header(&self) -> &ReportHeader {
        &self.header
    }

    /// One result per category, in catalog order.
    pub fn results(&self) -> &[CategoryResult] {
        &self.results
    }

    pub fn result(&self, category: Category) -> Option<&CategoryResult> {
        self.results
            .iter()
            .find(|result| result.category == category)
    }

    pub fn average_score(&self) -> Score {
        self.average_score
    }

    pub fn average_grade(&self) -> Grade {
        self.average_grade
    }

    pub fn general_observations(&self) -> &str {
        &self.general_observations
    }

    /// Download name without extension: `Informe_<subject>` with spaces as underscores.
    /// Path separators are replaced too, so the name is always a single path component.
    pub fn file_stem(&self) -> String {
        format!(
            "Informe_{}",
            self.header.subject.replace([' ', '/', '\\'], "_")
        )
    }
}

/// Scores every catalog category and aggregates the average.
///
/// Fails without a partial model: the first category missing from `answers` (in catalog
/// order) is reported, and malformed answers surface as [`EvaluationError::InvalidInput`].
pub fn build_report(
    header: ReportHeader,
    answers: &AnswerSheet,
    general_observations: impl Into<String>,
) -> Result<ReportModel, EvaluationError> {
    if let Some(category) = answers.missing().first() {
        return Err(EvaluationError::MissingCategory(*category));
    }

    let results = Category::ordered()
        .into_iter()
        .map(|category| {
            let answer = answers
                .get(category)
                .ok_or(EvaluationError::MissingCategory(category))?;
            CategoryResult::from_answer(category, answer)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let scores: Vec<Score> = results.iter().map(|result| result.score).collect();
    let average = average_score(&scores)?;

    Ok(ReportModel {
        header,
        results,
        average_score: average,
        average_grade: average.grade(),
        general_observations: general_observations.into(),
    })
}

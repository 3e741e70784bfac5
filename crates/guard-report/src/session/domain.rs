use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::evaluation::{
    average_score, build_report, score_from_answers, AnswerSheet, Category, CategoryAnswer,
    EvaluationError, Grade, ReportHeader, ReportModel, Score, QUESTIONS_PER_CATEGORY,
};

/// Unguessable identifier of one form session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim()).map(Self)
    }
}

/// Header fields as typed so far; any of them may still be blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderDraft {
    pub informer: String,
    pub date: Option<NaiveDate>,
    pub subject: String,
    pub post: String,
}

impl HeaderDraft {
    /// Presence check run before any report is built.
    pub fn complete(&self) -> Result<ReportHeader, IncompleteHeader> {
        let mut missing = Vec::new();
        if self.informer.trim().is_empty() {
            missing.push("informer");
        }
        if self.date.is_none() {
            missing.push("date");
        }
        if self.subject.trim().is_empty() {
            missing.push("subject");
        }
        if self.post.trim().is_empty() {
            missing.push("post");
        }

        match self.date {
            Some(date) if missing.is_empty() => Ok(ReportHeader::new(
                self.informer.trim(),
                date,
                self.subject.trim(),
                self.post.trim(),
            )),
            _ => Err(IncompleteHeader { missing }),
        }
    }
}

/// Required header fields left blank, in form order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("report header is incomplete, missing: {}", .missing.join(", "))]
pub struct IncompleteHeader {
    pub missing: Vec<&'static str>,
}

/// Observation as typed by the user; blank text means the field was left unedited.
pub fn edited_observation(observation: Option<String>) -> Option<String> {
    observation.filter(|text| !text.trim().is_empty())
}

/// Observation shown for a category: the user's text, or the score text while unedited.
pub fn effective_observation(observation: Option<&str>, score: Score) -> String {
    match observation {
        Some(text) if !text.trim().is_empty() => text.to_string(),
        _ => score.to_string(),
    }
}

/// Replaces blank observations in an imported sheet with the category's score text.
pub fn fill_observation_placeholders(sheet: &mut AnswerSheet) -> Result<(), EvaluationError> {
    for category in Category::ordered() {
        let Some(answer) = sheet.get(category) else {
            continue;
        };
        if !answer.observation.trim().is_empty() {
            continue;
        }
        let score = score_from_answers(&answer.answers)?;
        let filled = CategoryAnswer::new(answer.answers.clone(), score.to_string());
        sheet.insert(category, filled);
    }
    Ok(())
}

/// Checkbox state and optional observation for one category of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDraft {
    pub answers: [bool; QUESTIONS_PER_CATEGORY],
    pub observation: Option<String>,
}

impl CategoryDraft {
    pub fn from_answers(
        answers: &[bool],
        observation: Option<String>,
    ) -> Result<Self, EvaluationError> {
        let answers: [bool; QUESTIONS_PER_CATEGORY] = answers.try_into().map_err(|_| {
            EvaluationError::InvalidInput(format!(
                "expected {QUESTIONS_PER_CATEGORY} answers, got {}",
                answers.len()
            ))
        })?;
        Ok(Self {
            answers,
            observation: edited_observation(observation),
        })
    }

    pub fn score(&self) -> Result<Score, EvaluationError> {
        score_from_answers(&self.answers)
    }

    pub fn to_answer(&self) -> Result<CategoryAnswer, EvaluationError> {
        let score = self.score()?;
        Ok(CategoryAnswer::new(
            self.answers.to_vec(),
            effective_observation(self.observation.as_deref(), score),
        ))
    }
}

/// Score and letter re-derived on every change, as displayed next to each category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveResult {
    pub category: Category,
    pub slug: &'static str,
    pub answers: [bool; QUESTIONS_PER_CATEGORY],
    pub score: Score,
    pub grade: Grade,
    pub observation: String,
    pub observation_edited: bool,
}

/// One user's in-progress evaluation. Every catalog category is always present, starting
/// with all questions unchecked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationSession {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub header: HeaderDraft,
    categories: [CategoryDraft; Category::COUNT],
    pub general_observations: String,
}

impl EvaluationSession {
    pub fn new(id: SessionId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at: now,
            updated_at: now,
            header: HeaderDraft::default(),
            categories: Default::default(),
            general_observations: String::new(),
        }
    }

    /// Session that is never stored, used by single-shot form submissions.
    pub fn transient() -> Self {
        Self::new(SessionId::generate(), Utc::now())
    }

    pub fn category(&self, category: Category) -> &CategoryDraft {
        &self.categories[category.position()]
    }

    pub fn set_category(&mut self, category: Category, draft: CategoryDraft) {
        self.categories[category.position()] = draft;
    }

    pub fn live_result(&self, category: Category) -> Result<LiveResult, EvaluationError> {
        let draft = self.category(category);
        let score = draft.score()?;
        Ok(LiveResult {
            category,
            slug: category.slug(),
            answers: draft.answers,
            score,
            grade: score.grade(),
            observation: effective_observation(draft.observation.as_deref(), score),
            observation_edited: edited_observation(draft.observation.clone()).is_some(),
        })
    }

    pub fn answer_sheet(&self) -> Result<AnswerSheet, EvaluationError> {
        Category::ordered()
            .into_iter()
            .map(|category| {
                self.category(category)
                    .to_answer()
                    .map(|answer| (category, answer))
            })
            .collect()
    }

    pub fn view(&self) -> Result<SessionView, EvaluationError> {
        let categories = Category::ordered()
            .into_iter()
            .map(|category| self.live_result(category))
            .collect::<Result<Vec<_>, _>>()?;
        let scores: Vec<Score> = categories.iter().map(|result| result.score).collect();
        let average = average_score(&scores)?;

        Ok(SessionView {
            id: self.id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            header: self.header.clone(),
            missing_header_fields: self
                .header
                .complete()
                .err()
                .map(|err| err.missing)
                .unwrap_or_default(),
            categories,
            average_score: average,
            average_grade: average.grade(),
            general_observations: self.general_observations.clone(),
        })
    }

    /// Snapshot for rendering. Runs the header presence check first.
    pub fn build_report(&self) -> Result<ReportModel, SessionError> {
        let header = self.header.complete()?;
        let sheet = self.answer_sheet()?;
        Ok(build_report(
            header,
            &sheet,
            self.general_observations.clone(),
        )?)
    }
}

/// Serializable projection of a session for API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub header: HeaderDraft,
    pub missing_header_fields: Vec<&'static str>,
    pub categories: Vec<LiveResult>,
    pub average_score: Score,
    pub average_grade: Grade,
    pub general_observations: String,
}

/// Failures turning a session into a report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    IncompleteHeader(#[from] IncompleteHeader),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

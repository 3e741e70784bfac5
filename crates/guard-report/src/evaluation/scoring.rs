use super::catalog::QUESTIONS_PER_CATEGORY;
use super::EvaluationError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const MAX_HUNDREDTHS: u32 = 1000;

/// Numeric grade on the 0-10 scale, held as exact hundredths.
///
/// All rounding is round-half-up on the exact rational value, performed with integer
/// arithmetic, so results never depend on platform float rounding. Values that arrive as
/// floats are read through their shortest decimal text first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Score(u32);

impl Score {
    pub const ZERO: Score = Score(0);
    pub const MAX: Score = Score(MAX_HUNDREDTHS);

    pub fn from_hundredths(hundredths: u32) -> Result<Self, EvaluationError> {
        if hundredths > MAX_HUNDREDTHS {
            return Err(EvaluationError::InvalidInput(format!(
                "score {}.{:02} exceeds 10.00",
                hundredths / 100,
                hundredths % 100
            )));
        }
        Ok(Self(hundredths))
    }

    /// Rounds an arbitrary value to the nearest hundredth (half up).
    ///
    /// Rounding works on the shortest decimal text of `value`, so `1.005` becomes `1.01`
    /// even though its binary approximation lies just below the tie.
    pub fn from_f64(value: f64) -> Result<Self, EvaluationError> {
        ensure_in_range(value)?;
        let hundredths = decimal_hundredths(&value.abs().to_string()).ok_or_else(|| {
            EvaluationError::InvalidInput(format!("score {value} is not a plain decimal"))
        })?;
        Self::from_hundredths(hundredths.min(MAX_HUNDREDTHS))
    }

    pub const fn hundredths(self) -> u32 {
        self.0
    }

    pub fn value(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    pub fn grade(self) -> Grade {
        Grade::for_hundredths(self.0)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.value())
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        Score::from_f64(raw).map_err(serde::de::Error::custom)
    }
}

/// Coarse letter banding of a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
}

impl Grade {
    /// Bands evaluated highest first; each lower bound is inclusive.
    const BANDS: [(Grade, u32); 3] = [(Grade::A, 900), (Grade::B, 700), (Grade::C, 500)];

    pub const fn letter(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
        }
    }

    fn for_hundredths(hundredths: u32) -> Self {
        Self::BANDS
            .iter()
            .find(|(_, floor)| hundredths >= *floor)
            .map(|(grade, _)| *grade)
            .unwrap_or(Grade::D)
    }

    fn for_value(score: f64) -> Self {
        Self::BANDS
            .iter()
            .find(|(_, floor)| score >= f64::from(*floor) / 100.0)
            .map(|(grade, _)| *grade)
            .unwrap_or(Grade::D)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Converts six yes/no answers into a 0-10 score: `round(true_count / 6 * 10, 2)`.
pub fn score_from_answers(answers: &[bool]) -> Result<Score, EvaluationError> {
    if answers.len() != QUESTIONS_PER_CATEGORY {
        return Err(EvaluationError::InvalidInput(format!(
            "expected {QUESTIONS_PER_CATEGORY} answers, got {}",
            answers.len()
        )));
    }

    let checked = answers.iter().filter(|answer| **answer).count() as u32;
    let questions = QUESTIONS_PER_CATEGORY as u32;
    Score::from_hundredths(div_round_half_up(checked * MAX_HUNDREDTHS, questions))
}

/// Maps a score in `[0, 10]` to its letter band.
pub fn letter_from_score(score: f64) -> Result<Grade, EvaluationError> {
    ensure_in_range(score)?;
    Ok(Grade::for_value(score))
}

/// Arithmetic mean of the scores rounded to two decimals.
pub fn average_score(scores: &[Score]) -> Result<Score, EvaluationError> {
    if scores.is_empty() {
        return Err(EvaluationError::InvalidInput(
            "cannot average an empty list of scores".to_string(),
        ));
    }

    let total: u64 = scores.iter().map(|score| u64::from(score.0)).sum();
    let mean = div_round_half_up_u64(total, scores.len() as u64);
    Score::from_hundredths(mean as u32)
}

/// Half-up hundredths of a non-negative decimal such as `8.335`.
fn decimal_hundredths(text: &str) -> Option<u32> {
    let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));
    let mut digits = fraction.chars().map(|c| c.to_digit(10));
    let tenths = digits.next().unwrap_or(Some(0))?;
    let cents = digits.next().unwrap_or(Some(0))?;
    let rounding = digits.next().unwrap_or(Some(0))?;
    if digits.any(|digit| digit.is_none()) {
        return None;
    }

    let whole: u32 = whole.parse().ok()?;
    let hundredths = whole * 100 + tenths * 10 + cents;
    Some(if rounding >= 5 { hundredths + 1 } else { hundredths })
}

fn ensure_in_range(score: f64) -> Result<(), EvaluationError> {
    if score.is_finite() && (0.0..=10.0).contains(&score) {
        Ok(())
    } else {
        Err(EvaluationError::InvalidInput(format!(
            "score {score} is outside the 0-10 range"
        )))
    }
}

fn div_round_half_up(numerator: u32, denominator: u32) -> u32 {
    (2 * numerator + denominator) / (2 * denominator)
}

fn div_round_half_up_u64(numerator: u64, denominator: u64) -> u64 {
    (2 * numerator + denominator) / (2 * denominator)
}

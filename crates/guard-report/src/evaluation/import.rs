//! CSV intake for answer sheets, one row per category.
//!
//! Expected header: `Category,Q1,Q2,Q3,Q4,Q5,Q6,Observation`. The category column takes a
//! catalog label or slug; answer cells accept `1/0`, `true/false`, `x`, `yes/no`, `si/sí`
//! and treat an empty cell as unchecked.

use super::answers::{AnswerSheet, CategoryAnswer};
use super::catalog::{Category, QUESTIONS_PER_CATEGORY};
use serde::Deserialize;
use std::io::{Read, Write};
use std::path::Path;

#[derive(Debug)]
pub enum AnswerImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    UnknownCategory { row: usize, value: String },
    InvalidAnswer { row: usize, column: String, value: String },
    DuplicateCategory { row: usize, category: Category },
}

impl std::fmt::Display for AnswerImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnswerImportError::Io(err) => write!(f, "failed to read answers file: {}", err),
            AnswerImportError::Csv(err) => write!(f, "invalid answers CSV data: {}", err),
            AnswerImportError::UnknownCategory { row, value } => {
                write!(f, "row {}: '{}' is not a known category", row, value)
            }
            AnswerImportError::InvalidAnswer { row, column, value } => write!(
                f,
                "row {}: column {} has '{}', expected yes/no",
                row, column, value
            ),
            AnswerImportError::DuplicateCategory { row, category } => {
                write!(f, "row {}: category {} appears more than once", row, category)
            }
        }
    }
}

impl std::error::Error for AnswerImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnswerImportError::Io(err) => Some(err),
            AnswerImportError::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AnswerImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for AnswerImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct AnswerImporter;

impl AnswerImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<AnswerSheet, AnswerImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parses rows into a sheet. Categories absent from the file are simply not present;
    /// completeness is enforced when the report is built. Observation cells are kept
    /// verbatim, surrounding whitespace included.
    pub fn from_reader<R: Read>(reader: R) -> Result<AnswerSheet, AnswerImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .flexible(true)
            .from_reader(reader);
        let mut sheet = AnswerSheet::new();

        for (index, record) in csv_reader.deserialize::<AnswerRow>().enumerate() {
            let row_number = index + 2;
            let row = record?;
            let category =
                Category::lookup(&row.category).ok_or_else(|| AnswerImportError::UnknownCategory {
                    row: row_number,
                    value: row.category.trim().to_string(),
                })?;

            if sheet.get(category).is_some() {
                return Err(AnswerImportError::DuplicateCategory {
                    row: row_number,
                    category,
                });
            }

            let answers = row.answers(row_number)?;
            sheet.insert(category, CategoryAnswer::new(answers, row.observation));
        }

        Ok(sheet)
    }

    /// Writes a blank sheet listing every category, suitable for filling in by hand.
    pub fn write_template<W: Write>(writer: W) -> Result<(), AnswerImportError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        let mut header = vec!["Category".to_string()];
        header.extend((1..=QUESTIONS_PER_CATEGORY).map(|n| format!("Q{n}")));
        header.push("Observation".to_string());
        csv_writer.write_record(&header)?;

        for category in Category::ordered() {
            let mut record = vec![category.label().to_string()];
            record.extend((0..QUESTIONS_PER_CATEGORY).map(|_| "0".to_string()));
            record.push(String::new());
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct AnswerRow {
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Q1", default)]
    q1: String,
    #[serde(rename = "Q2", default)]
    q2: String,
    #[serde(rename = "Q3", default)]
    q3: String,
    #[serde(rename = "Q4", default)]
    q4: String,
    #[serde(rename = "Q5", default)]
    q5: String,
    #[serde(rename = "Q6", default)]
    q6: String,
    #[serde(rename = "Observation", default)]
    observation: String,
}

impl AnswerRow {
    fn answers(&self, row: usize) -> Result<Vec<bool>, AnswerImportError> {
        [&self.q1, &self.q2, &self.q3, &self.q4, &self.q5, &self.q6]
            .into_iter()
            .enumerate()
            .map(|(index, cell)| {
                parse_answer(cell).ok_or_else(|| AnswerImportError::InvalidAnswer {
                    row,
                    column: format!("Q{}", index + 1),
                    value: cell.trim().to_string(),
                })
            })
            .collect()
    }
}

fn parse_answer(cell: &str) -> Option<bool> {
    match cell.trim().to_lowercase().as_str() {
        "" | "0" | "false" | "no" | "n" => Some(false),
        "1" | "true" | "x" | "yes" | "y" | "si" | "sí" | "s" => Some(true),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_answers_and_observations() {
        let csv = "Category,Q1,Q2,Q3,Q4,Q5,Q6,Observation\n\
POLICÍA,1,1,1,0,0,0,Correcto\n\
disciplina,x,,sí,no,true,0,\"Puntual, atento\"\n";

        let sheet = AnswerImporter::from_reader(csv.as_bytes()).expect("import succeeds");

        let policia = sheet.get(Category::Policia).expect("policia row");
        assert_eq!(policia.answers, vec![true, true, true, false, false, false]);
        assert_eq!(policia.observation, "Correcto");
        let disciplina = sheet.get(Category::Disciplina).expect("disciplina row");
        assert_eq!(
            disciplina.answers,
            vec![true, false, true, false, true, false]
        );
        assert_eq!(disciplina.observation, "Puntual, atento");
        assert_eq!(sheet.missing().len(), 9);
    }

    #[test]
    fn keeps_observation_whitespace_while_tolerating_padded_cells() {
        let csv = " Category , Q1,Q2,Q3,Q4,Q5,Q6 , Observation \n\
  trato , 1 ,0, x ,,0, no ,\"  Cordial\n  y atento  \"\n";

        let sheet = AnswerImporter::from_reader(csv.as_bytes()).expect("import succeeds");

        let trato = sheet.get(Category::Trato).expect("trato row");
        assert_eq!(trato.answers, vec![true, false, true, false, false, false]);
        assert_eq!(trato.observation, "  Cordial\n  y atento  ");
    }

    #[test]
    fn rejects_unknown_categories_with_row_number() {
        let csv = "Category,Q1,Q2,Q3,Q4,Q5,Q6,Observation\nTRATO,1,1,1,1,1,1,\nVALOR,1,1,1,1,1,1,\n";

        match AnswerImporter::from_reader(csv.as_bytes()) {
            Err(AnswerImportError::UnknownCategory { row, value }) => {
                assert_eq!(row, 3);
                assert_eq!(value, "VALOR");
            }
            other => panic!("expected unknown category, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unreadable_answer_cells() {
        let csv = "Category,Q1,Q2,Q3,Q4,Q5,Q6,Observation\nTRATO,1,maybe,1,1,1,1,\n";

        match AnswerImporter::from_reader(csv.as_bytes()) {
            Err(AnswerImportError::InvalidAnswer { column, value, .. }) => {
                assert_eq!(column, "Q2");
                assert_eq!(value, "maybe");
            }
            other => panic!("expected invalid answer, got {other:?}"),
        }
    }

    #[test]
    fn rejects_duplicate_categories() {
        let csv = "Category,Q1,Q2,Q3,Q4,Q5,Q6,Observation\nTRATO,1,1,1,1,1,1,\ntrato,0,0,0,0,0,0,\n";

        assert!(matches!(
            AnswerImporter::from_reader(csv.as_bytes()),
            Err(AnswerImportError::DuplicateCategory {
                row: 3,
                category: Category::Trato
            })
        ));
    }

    #[test]
    fn template_round_trips_into_a_complete_blank_sheet() {
        let mut buffer = Vec::new();
        AnswerImporter::write_template(&mut buffer).expect("template writes");

        let sheet = AnswerImporter::from_reader(buffer.as_slice()).expect("template imports");
        assert!(sheet.missing().is_empty());
        assert!(Category::ordered().into_iter().all(|category| sheet
            .get(category)
            .map(|answer| answer.answers.iter().all(|a| !a))
            .unwrap_or(false)));
    }
}

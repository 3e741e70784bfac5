use super::catalog::{Category, QUESTIONS_PER_CATEGORY};
use super::EvaluationError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Raw checkbox answers and free-text observation captured for one category.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryAnswer {
    pub answers: Vec<bool>,
    #[serde(default)]
    pub observation: String,
}

impl CategoryAnswer {
    pub fn new(answers: Vec<bool>, observation: impl Into<String>) -> Self {
        Self {
            answers,
            observation: observation.into(),
        }
    }

    /// Answers with the first `checked` questions ticked.
    pub fn with_checked(checked: usize, observation: impl Into<String>) -> Self {
        let answers = (0..QUESTIONS_PER_CATEGORY)
            .map(|index| index < checked)
            .collect();
        Self::new(answers, observation)
    }
}

/// Wire shape pairing a category with its answer, used by list-based inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub category: Category,
    #[serde(flatten)]
    pub answer: CategoryAnswer,
}

/// Unordered mapping from category to its answers. Presentation order always comes from
/// the catalog, never from insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSheet {
    answers: HashMap<Category, CategoryAnswer>,
}

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects list entries, rejecting a category listed twice.
    pub fn from_entries<I>(entries: I) -> Result<Self, EvaluationError>
    where
        I: IntoIterator<Item = CategoryEntry>,
    {
        let mut sheet = Self::new();
        for entry in entries {
            if sheet.answers.contains_key(&entry.category) {
                return Err(EvaluationError::DuplicateCategory(entry.category));
            }
            sheet.insert(entry.category, entry.answer);
        }
        Ok(sheet)
    }

    pub fn insert(&mut self, category: Category, answer: CategoryAnswer) -> Option<CategoryAnswer> {
        self.answers.insert(category, answer)
    }

    pub fn remove(&mut self, category: Category) -> Option<CategoryAnswer> {
        self.answers.remove(&category)
    }

    pub fn get(&self, category: Category) -> Option<&CategoryAnswer> {
        self.answers.get(&category)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Categories of the catalog with no answers yet, in catalog order.
    pub fn missing(&self) -> Vec<Category> {
        Category::ordered()
            .into_iter()
            .filter(|category| !self.answers.contains_key(category))
            .collect()
    }
}

impl FromIterator<(Category, CategoryAnswer)> for AnswerSheet {
    fn from_iter<T: IntoIterator<Item = (Category, CategoryAnswer)>>(iter: T) -> Self {
        Self {
            answers: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_entries_rejects_duplicates() {
        let entries = vec![
            CategoryEntry {
                category: Category::Trato,
                answer: CategoryAnswer::with_checked(2, ""),
            },
            CategoryEntry {
                category: Category::Trato,
                answer: CategoryAnswer::with_checked(4, ""),
            },
        ];

        assert_eq!(
            AnswerSheet::from_entries(entries),
            Err(EvaluationError::DuplicateCategory(Category::Trato))
        );
    }

    #[test]
    fn missing_lists_gaps_in_catalog_order() {
        let mut sheet: AnswerSheet = Category::ordered()
            .into_iter()
            .map(|category| (category, CategoryAnswer::with_checked(0, "")))
            .collect();
        sheet.remove(Category::Trato);
        sheet.remove(Category::Policia);

        assert_eq!(sheet.missing(), vec![Category::Policia, Category::Trato]);
        assert_eq!(sheet.len(), 9);
    }

    #[test]
    fn entry_deserializes_flat_json() {
        let entry: CategoryEntry = serde_json::from_str(
            r#"{"category":"DISCIPLINA","answers":[true,false,true,false,true,false],"observation":"ok"}"#,
        )
        .expect("entry parses");

        assert_eq!(entry.category, Category::Disciplina);
        assert_eq!(entry.answer.answers.iter().filter(|a| **a).count(), 3);
        assert_eq!(entry.answer.observation, "ok");
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Display format for the report date (DD.MM.YYYY).
pub const DATE_DISPLAY_FORMAT: &str = "%d.%m.%Y";

/// Identifying fields printed at the top of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportHeader {
    pub informer: String,
    pub date: NaiveDate,
    pub subject: String,
    pub post: String,
}

impl ReportHeader {
    pub fn new(
        informer: impl Into<String>,
        date: NaiveDate,
        subject: impl Into<String>,
        post: impl Into<String>,
    ) -> Self {
        Self {
            informer: informer.into(),
            date,
            subject: subject.into(),
            post: post.into(),
        }
    }

    pub fn display_date(&self) -> String {
        self.date.format(DATE_DISPLAY_FORMAT).to_string()
    }

    /// Names of required text fields left blank.
    pub fn blank_fields(&self) -> Vec<&'static str> {
        [
            ("informer", &self.informer),
            ("subject", &self.subject),
            ("post", &self.post),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Accepts ISO dates (`2025-09-24`) as well as the display format (`24.09.2025`).
pub fn parse_report_date(raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, DATE_DISPLAY_FORMAT))
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD or DD.MM.YYYY ({err})"))
}

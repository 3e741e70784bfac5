//! Document renderers turning a [`ReportModel`] into a downloadable artifact.
//!
//! Renderers are pure layout transforms: they trust the model's invariants and do no
//! scoring or validation of their own.

mod html;
mod pdf;

pub use html::HtmlRenderer;
pub use pdf::PdfRenderer;

use crate::evaluation::ReportModel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_TITLE: &str = "INFORME PERSONAL DE LA GUARDIA";

/// Seam between the report model and a concrete document format.
pub trait DocumentRenderer: Send + Sync {
    fn content_type(&self) -> mime::Mime;
    fn extension(&self) -> &'static str;
    fn render(&self, model: &ReportModel) -> Result<Vec<u8>, RenderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to write document: {0}")]
    Io(#[from] std::io::Error),
    #[error("document layout failed: {0}")]
    Layout(String),
    #[error("{field} contains '{character}', which this document format cannot print")]
    Unencodable { field: String, character: char },
}

/// Layout settings shared by all renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub title: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    #[default]
    Pdf,
    Html,
}

impl DocumentFormat {
    pub fn renderer(self, options: RenderOptions) -> Box<dyn DocumentRenderer> {
        match self {
            Self::Pdf => Box::new(PdfRenderer::new(options)),
            Self::Html => Box::new(HtmlRenderer::new(options)),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Html => "html",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DocumentFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "html" | "htm" => Ok(Self::Html),
            other => Err(format!("unsupported document format '{other}' (use pdf or html)")),
        }
    }
}

/// Rendered bytes plus the metadata needed to offer them as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub file_name: String,
    pub content_type: mime::Mime,
    pub bytes: Vec<u8>,
}

impl RenderedDocument {
    /// `Content-Disposition` value with an ASCII fallback and an RFC 5987 UTF-8 name.
    pub fn content_disposition(&self) -> String {
        let fallback: String = self
            .file_name
            .chars()
            .map(|c| {
                if c.is_ascii_graphic() && c != '"' && c != '\\' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            fallback,
            urlencoding::encode(&self.file_name)
        )
    }
}

pub fn render_document(
    model: &ReportModel,
    format: DocumentFormat,
    options: RenderOptions,
) -> Result<RenderedDocument, RenderError> {
    let renderer = format.renderer(options);
    let bytes = renderer.render(model)?;

    tracing::info!(
        format = %format,
        bytes = bytes.len(),
        subject = %model.header().subject,
        "report document rendered"
    );

    Ok(RenderedDocument {
        file_name: format!("{}.{}", model.file_stem(), renderer.extension()),
        content_type: renderer.content_type(),
        bytes,
    })
}

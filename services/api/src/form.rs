//! Browser form: one page listing every category, submitted as urlencoded fields.
//!
//! Field names: `informer`, `date`, `subject`, `post`, `general_observations`, `format`,
//! `<slug>_q1`..`<slug>_q6` for checkboxes and `<slug>_obs` for each observation. An empty
//! observation keeps the category's score text as its placeholder.

use crate::infra::{parse_date, parse_format, AppState};
use axum::response::{Html, Response};
use axum::{Extension, Form};
use guard_report::error::AppError;
use guard_report::evaluation::{Category, QUESTIONS_PER_CATEGORY};
use guard_report::render::{render_document, DocumentFormat};
use guard_report::session::{
    document_response, edited_observation, CategoryDraft, EvaluationSession,
};
use html_escape::{encode_double_quoted_attribute, encode_text};
use tracing::info;

const LIVE_SCRIPT: &str = r#"
const form = document.getElementById('report-form');
function collect() {
  return Array.from(form.querySelectorAll('fieldset[data-category]')).map((set) => ({
    category: set.dataset.category,
    answers: Array.from(set.querySelectorAll('input[type=checkbox]')).map((box) => box.checked),
  }));
}
async function refresh() {
  const response = await fetch('/api/v1/evaluation/preview', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({ categories: collect() }),
  });
  if (!response.ok) { return; }
  const preview = await response.json();
  for (const result of preview.categories) {
    document.getElementById('score-' + result.slug).textContent = result.score_text;
    document.getElementById('grade-' + result.slug).textContent = result.grade;
    document.getElementById('obs-' + result.slug).placeholder = result.score_text;
  }
  if (preview.average_score !== undefined) {
    document.getElementById('average').textContent =
      preview.average_score.toFixed(2) + ' (' + preview.average_grade + ')';
  }
}
form.addEventListener('change', (event) => {
  if (event.target.type === 'checkbox') { refresh(); }
});
"#;

pub(crate) async fn form_page(Extension(state): Extension<AppState>) -> Html<String> {
    Html(render_form(&state.report.title, state.report.format))
}

pub(crate) fn render_form(title: &str, default_format: DocumentFormat) -> String {
    let title = encode_text(title);
    let mut page = String::with_capacity(24 * 1024);

    page.push_str("<!DOCTYPE html>\n<html lang=\"es\">\n<head>\n<meta charset=\"utf-8\">\n");
    page.push_str(&format!("<title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n"));
    page.push_str("<form id=\"report-form\" method=\"post\" action=\"/form\">\n");

    for (name, label, kind) in [
        ("informer", "Informante", "text"),
        ("date", "Fecha", "date"),
        ("subject", "Alumno", "text"),
        ("post", "Puesto", "text"),
    ] {
        page.push_str(&format!(
            "<p><label for=\"{name}\">{label}</label> <input id=\"{name}\" name=\"{name}\" type=\"{kind}\" required></p>\n"
        ));
    }

    for category in Category::ordered() {
        let slug = category.slug();
        page.push_str(&format!(
            "<fieldset data-category=\"{slug}\">\n<legend>{}</legend>\n",
            encode_text(category.label())
        ));
        for index in 0..QUESTIONS_PER_CATEGORY {
            let question = category.question_label(index);
            page.push_str(&format!(
                "<label><input type=\"checkbox\" name=\"{slug}_q{number}\" value=\"1\" title=\"{}\"> {}</label><br>\n",
                encode_double_quoted_attribute(&question),
                encode_text(&question),
                number = index + 1,
            ));
        }
        page.push_str(&format!(
            "<p>Nota: <span id=\"score-{slug}\">0.00</span> Letra: <span id=\"grade-{slug}\">D</span></p>\n\
<textarea id=\"obs-{slug}\" name=\"{slug}_obs\" placeholder=\"0.00\"></textarea>\n</fieldset>\n"
        ));
    }

    page.push_str("<p>Nota media: <span id=\"average\">0.00 (D)</span></p>\n");
    page.push_str(
        "<p><label for=\"general_observations\">Observaciones generales / Justificación</label><br>\n\
<textarea id=\"general_observations\" name=\"general_observations\"></textarea></p>\n",
    );
    page.push_str("<p><select name=\"format\">");
    for format in [DocumentFormat::Pdf, DocumentFormat::Html] {
        let selected = if format == default_format {
            " selected"
        } else {
            ""
        };
        page.push_str(&format!(
            "<option value=\"{format}\"{selected}>{}</option>",
            format.label().to_uppercase()
        ));
    }
    page.push_str("</select> <button type=\"submit\">Generar informe</button></p>\n</form>\n");
    page.push_str(&format!("<script>{LIVE_SCRIPT}</script>\n</body>\n</html>\n"));
    page
}

pub(crate) async fn submit_form(
    Extension(state): Extension<AppState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let (session, format) = parse_form(&fields)?;
    let model = session.build_report()?;
    let format = format.unwrap_or(state.report.format);
    let document = render_document(&model, format, state.report.render_options())?;

    info!(file_name = %document.file_name, "report generated from form");
    Ok(document_response(document))
}

/// Collects posted fields into an unsaved session. Unknown fields are ignored.
pub(crate) fn parse_form(
    fields: &[(String, String)],
) -> Result<(EvaluationSession, Option<DocumentFormat>), AppError> {
    let mut session = EvaluationSession::transient();
    let mut drafts: Vec<CategoryDraft> = vec![CategoryDraft::default(); Category::COUNT];
    let mut format = None;

    for (key, value) in fields {
        match key.as_str() {
            "informer" => session.header.informer = value.clone(),
            "subject" => session.header.subject = value.clone(),
            "post" => session.header.post = value.clone(),
            "general_observations" => session.general_observations = value.clone(),
            "date" => {
                if !value.trim().is_empty() {
                    session.header.date = Some(parse_date(value).map_err(AppError::Input)?);
                }
            }
            "format" => {
                if !value.trim().is_empty() {
                    format = Some(parse_format(value).map_err(AppError::Input)?);
                }
            }
            other => apply_category_field(&mut drafts, other, value),
        }
    }

    for category in Category::ordered() {
        session.set_category(category, drafts[category.position()].clone());
    }
    Ok((session, format))
}

fn apply_category_field(drafts: &mut [CategoryDraft], key: &str, value: &str) {
    let Some((slug, field)) = key.rsplit_once('_') else {
        return;
    };
    let Some(category) = Category::from_slug(slug) else {
        return;
    };
    let draft = &mut drafts[category.position()];

    if field == "obs" {
        draft.observation = edited_observation(Some(value.to_string()));
        return;
    }

    let question = field
        .strip_prefix('q')
        .and_then(|number| number.parse::<usize>().ok())
        .filter(|number| (1..=QUESTIONS_PER_CATEGORY).contains(number));
    if let Some(number) = question {
        draft.answers[number - 1] = matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "on" | "true" | "yes"
        );
    }
}

//! Self-contained printable HTML rendition of the report. No external assets.

use super::{DocumentRenderer, RenderError, RenderOptions};
use crate::evaluation::ReportModel;
use html_escape::encode_text;

const STYLE: &str = "body{font-family:Helvetica,Arial,sans-serif;margin:10mm;color:#111}\
h1{font-size:14pt;text-align:center;margin:0 0 6mm}\
dl.header{display:grid;grid-template-columns:40mm auto;row-gap:2mm;font-size:11pt}\
dl.header dt{margin:0}dl.header dd{margin:0}\
table{border-collapse:collapse;width:190mm;margin-top:5mm;font-size:10pt}\
th,td{border:0.5pt solid #000;padding:1.5mm;vertical-align:top}\
th{font-size:11pt}td.num{text-align:center}\
col.concept{width:60mm}col.score{width:30mm}col.letter{width:30mm}col.obs{width:70mm}\
.pre{white-space:pre-wrap}h2{font-size:11pt;margin:5mm 0 2mm}\
@page{size:A4;margin:10mm}";

/// Renders the report as a single UTF-8 HTML page suitable for printing.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    options: RenderOptions,
}

impl HtmlRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    fn render_string(&self, model: &ReportModel) -> String {
        let title = encode_text(&self.options.title);
        let header = model.header();
        let mut out = String::with_capacity(8 * 1024);

        out.push_str("<!DOCTYPE html>\n<html lang=\"es\">\n<head>\n<meta charset=\"utf-8\">\n");
        out.push_str(&format!("<title>{title}</title>\n<style>{STYLE}</style>\n"));
        out.push_str("</head>\n<body>\n");
        out.push_str(&format!("<h1>{title}</h1>\n<dl class=\"header\">\n"));
        for (label, value) in [
            ("Informante:", header.informer.clone()),
            ("Fecha:", header.display_date()),
            ("Alumno:", header.subject.clone()),
            ("Puesto:", header.post.clone()),
        ] {
            out.push_str(&format!(
                "<dt>{label}</dt><dd>{}</dd>\n",
                encode_text(&value)
            ));
        }
        out.push_str("</dl>\n");

        out.push_str(
            "<table>\n<colgroup><col class=\"concept\"><col class=\"score\"><col class=\"letter\"><col class=\"obs\"></colgroup>\n\
<thead><tr><th>Concepto</th><th>Nota</th><th>Letra</th><th>Observaciones</th></tr></thead>\n<tbody>\n",
        );
        for result in model.results() {
            out.push_str(&format!(
                "<tr data-category=\"{}\"><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"pre\">{}</td></tr>\n",
                result.category.slug(),
                encode_text(result.category.label()),
                result.score,
                result.grade,
                encode_text(&result.observation)
            ));
        }
        out.push_str("</tbody>\n</table>\n");

        out.push_str(&format!(
            "<p class=\"average\"><strong>Nota media: {} ({})</strong></p>\n",
            model.average_score(),
            model.average_grade()
        ));
        out.push_str("<h2>Observaciones generales / Justificación</h2>\n");
        out.push_str(&format!(
            "<p class=\"pre\">{}</p>\n",
            encode_text(model.general_observations())
        ));
        out.push_str("</body>\n</html>\n");
        out
    }
}

impl DocumentRenderer for HtmlRenderer {
    fn content_type(&self) -> mime::Mime {
        mime::TEXT_HTML_UTF_8
    }

    fn extension(&self) -> &'static str {
        "html"
    }

    fn render(&self, model: &ReportModel) -> Result<Vec<u8>, RenderError> {
        Ok(self.render_string(model).into_bytes())
    }
}

//! Minimal PDF 1.4 output: A4 pages, core Helvetica fonts, uncompressed content streams.
//!
//! Layout mirrors the paper form: a repeated title, the header block, a four column table
//! (concept, score, letter, observations) whose rows wrap and continue across pages, then
//! the average and the general observations.

mod fonts;
mod writer;

use super::{DocumentRenderer, RenderError, RenderOptions};
use crate::evaluation::{CategoryResult, ReportHeader, ReportModel};
use fonts::{encode_win_ansi, wrap_text, Font};
use std::io::Write;
use writer::{literal_string, PdfWriter};

const MM: f32 = 72.0 / 25.4;
const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 10.0 * MM;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const FOOTER_SPACE: f32 = 6.0 * MM;
const BOTTOM_LIMIT: f32 = PAGE_HEIGHT - MARGIN - FOOTER_SPACE;

const TITLE_BLOCK: f32 = 15.0 * MM;
const FIELD_HEIGHT: f32 = 8.0 * MM;
const FIELD_LABEL_WIDTH: f32 = 40.0 * MM;
const HEAD_ROW: f32 = 8.0 * MM;
const LINE: f32 = 6.0 * MM;
const PAD: f32 = 1.5 * MM;

const TITLE_SIZE: f32 = 14.0;
const HEADING_SIZE: f32 = 11.0;
const BODY_SIZE: f32 = 10.0;
const FOOTER_SIZE: f32 = 8.0;

const COLUMNS: [(&str, f32); 4] = [
    ("Concepto", 60.0 * MM),
    ("Nota", 30.0 * MM),
    ("Letra", 30.0 * MM),
    ("Observaciones", 70.0 * MM),
];

const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const INFO_ID: usize = 5;
const FIRST_PAGE_ID: usize = 6;

/// Renders the report as a paginated A4 PDF. Output is byte-for-byte deterministic.
#[derive(Debug, Clone, Default)]
pub struct PdfRenderer {
    options: RenderOptions,
}

impl PdfRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }
}

impl DocumentRenderer for PdfRenderer {
    fn content_type(&self) -> mime::Mime {
        mime::APPLICATION_PDF
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn render(&self, model: &ReportModel) -> Result<Vec<u8>, RenderError> {
        check_encodable(model, &self.options.title)?;

        let mut canvas = Canvas::new(self.options.title.clone())?;
        write_header_fields(&mut canvas, model.header())?;
        write_table(&mut canvas, model.results())?;
        write_summary(&mut canvas, model)?;

        let mut pages = canvas.finish();
        let page_count = pages.len();
        for (index, page) in pages.iter_mut().enumerate() {
            write_footer(page, index + 1, page_count)?;
        }

        assemble(&pages, &self.options.title)
    }
}

/// Refuses text the core fonts cannot show, naming the first offending field.
fn check_encodable(model: &ReportModel, title: &str) -> Result<(), RenderError> {
    let header = model.header();
    let mut fields = vec![
        ("title".to_string(), title),
        ("informer".to_string(), header.informer.as_str()),
        ("subject".to_string(), header.subject.as_str()),
        ("post".to_string(), header.post.as_str()),
        (
            "general observations".to_string(),
            model.general_observations(),
        ),
    ];
    fields.extend(model.results().iter().map(|result| {
        (
            format!("observation for {}", result.category),
            result.observation.as_str(),
        )
    }));

    for (field, text) in fields {
        let unencodable = text
            .chars()
            .find(|c| !c.is_whitespace() && encode_win_ansi(*c).is_none());
        if let Some(character) = unencodable {
            return Err(RenderError::Unencodable { field, character });
        }
    }
    Ok(())
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Center,
}

struct Canvas {
    title: String,
    finished: Vec<Vec<u8>>,
    current: Vec<u8>,
    page_open: bool,
    y: f32,
}

impl Canvas {
    fn new(title: String) -> Result<Self, RenderError> {
        let mut canvas = Self {
            title,
            finished: Vec::new(),
            current: Vec::new(),
            page_open: false,
            y: MARGIN,
        };
        canvas.start_page()?;
        Ok(canvas)
    }

    fn start_page(&mut self) -> Result<(), RenderError> {
        if self.page_open {
            self.finished.push(std::mem::take(&mut self.current));
        }
        self.page_open = true;
        self.current.write_all(b"0.5 w\n")?;

        self.y = MARGIN;
        let title = self.title.clone();
        self.cell_text(
            Font::Bold,
            TITLE_SIZE,
            MARGIN,
            CONTENT_WIDTH,
            10.0 * MM,
            &title,
            Align::Center,
        )?;
        self.y += TITLE_BLOCK;
        Ok(())
    }

    fn finish(mut self) -> Vec<Vec<u8>> {
        self.finished.push(self.current);
        self.finished
    }

    fn remaining(&self) -> f32 {
        BOTTOM_LIMIT - self.y
    }

    fn ensure_space(&mut self, height: f32) -> Result<(), RenderError> {
        if self.y + height > BOTTOM_LIMIT {
            self.start_page()?;
        }
        Ok(())
    }

    /// Writes one line of text vertically centred in a cell starting at the cursor row.
    #[allow(clippy::too_many_arguments)]
    fn cell_text(
        &mut self,
        font: Font,
        size: f32,
        x: f32,
        width: f32,
        height: f32,
        text: &str,
        align: Align,
    ) -> Result<(), RenderError> {
        let top = self.y;
        self.text_at(font, size, x, top, width, height, text, align)
    }

    #[allow(clippy::too_many_arguments)]
    fn text_at(
        &mut self,
        font: Font,
        size: f32,
        x: f32,
        top: f32,
        width: f32,
        height: f32,
        text: &str,
        align: Align,
    ) -> Result<(), RenderError> {
        if text.is_empty() {
            return Ok(());
        }
        let start = match align {
            Align::Left => x + PAD,
            Align::Center => x + (width - font.text_width(text, size)) / 2.0,
        };
        let baseline = top + height / 2.0 + size * 0.35;
        draw_text(&mut self.current, font, size, start, baseline, text)
    }

    fn rect(&mut self, x: f32, top: f32, width: f32, height: f32) -> Result<(), RenderError> {
        let bottom = PAGE_HEIGHT - top - height;
        writeln!(
            self.current,
            "{x:.2} {bottom:.2} {width:.2} {height:.2} re S"
        )?;
        Ok(())
    }
}

fn draw_text(
    out: &mut Vec<u8>,
    font: Font,
    size: f32,
    x: f32,
    baseline: f32,
    text: &str,
) -> Result<(), RenderError> {
    let y = PAGE_HEIGHT - baseline;
    write!(
        out,
        "BT /{} {} Tf {x:.2} {y:.2} Td ",
        font.resource_name(),
        size
    )?;
    out.write_all(&literal_string(text)?)?;
    out.write_all(b" Tj ET\n")?;
    Ok(())
}

fn write_header_fields(canvas: &mut Canvas, header: &ReportHeader) -> Result<(), RenderError> {
    let date = header.display_date();
    let fields = [
        ("Informante:", header.informer.as_str()),
        ("Fecha:", date.as_str()),
        ("Alumno:", header.subject.as_str()),
        ("Puesto:", header.post.as_str()),
    ];
    let value_width = CONTENT_WIDTH - FIELD_LABEL_WIDTH;

    for (label, value) in fields {
        let lines = wrap_text(value, Font::Regular, HEADING_SIZE, value_width - 2.0 * PAD);
        for (index, line) in lines.iter().enumerate() {
            canvas.ensure_space(FIELD_HEIGHT)?;
            if index == 0 {
                canvas.cell_text(
                    Font::Regular,
                    HEADING_SIZE,
                    MARGIN,
                    FIELD_LABEL_WIDTH,
                    FIELD_HEIGHT,
                    label,
                    Align::Left,
                )?;
            }
            canvas.cell_text(
                Font::Regular,
                HEADING_SIZE,
                MARGIN + FIELD_LABEL_WIDTH,
                value_width,
                FIELD_HEIGHT,
                line,
                Align::Left,
            )?;
            canvas.y += FIELD_HEIGHT;
        }
    }

    canvas.y += 5.0 * MM;
    Ok(())
}

fn write_table_head(canvas: &mut Canvas) -> Result<(), RenderError> {
    canvas.ensure_space(HEAD_ROW + LINE)?;
    let top = canvas.y;
    let mut x = MARGIN;
    for (title, width) in COLUMNS {
        canvas.rect(x, top, width, HEAD_ROW)?;
        canvas.cell_text(Font::Bold, HEADING_SIZE, x, width, HEAD_ROW, title, Align::Center)?;
        x += width;
    }
    canvas.y += HEAD_ROW;
    Ok(())
}

fn write_table(canvas: &mut Canvas, results: &[CategoryResult]) -> Result<(), RenderError> {
    write_table_head(canvas)?;
    for result in results {
        write_row(canvas, result)?;
    }
    Ok(())
}

/// Lines a table row may use on a page that holds nothing but the title and table head.
fn fresh_page_row_lines() -> usize {
    ((BOTTOM_LIMIT - (MARGIN + TITLE_BLOCK + HEAD_ROW)) / LINE).floor() as usize
}

fn write_row(canvas: &mut Canvas, result: &CategoryResult) -> Result<(), RenderError> {
    let name_lines = wrap_text(
        result.category.label(),
        Font::Regular,
        BODY_SIZE,
        COLUMNS[0].1 - 2.0 * PAD,
    );
    let observation_lines = wrap_text(
        &result.observation,
        Font::Regular,
        BODY_SIZE,
        COLUMNS[3].1 - 2.0 * PAD,
    );
    let score = result.score.to_string();
    let grade = result.grade.to_string();
    let total = name_lines.len().max(observation_lines.len());

    let mut line = 0;
    let mut fresh_page = false;
    while line < total {
        let fit = (canvas.remaining() / LINE).floor() as usize;
        let keep_together = line == 0 && fit < total && total <= fresh_page_row_lines();
        if !fresh_page && (fit == 0 || keep_together) {
            canvas.start_page()?;
            write_table_head(canvas)?;
            fresh_page = true;
            continue;
        }
        if fit == 0 {
            return Err(RenderError::Layout(format!(
                "row for {} does not fit on an empty page",
                result.category
            )));
        }

        let count = fit.min(total - line);
        let top = canvas.y;
        let height = count as f32 * LINE;
        let mut x = MARGIN;
        for (_, width) in COLUMNS {
            canvas.rect(x, top, width, height)?;
            x += width;
        }

        let score_x = MARGIN + COLUMNS[0].1;
        let grade_x = score_x + COLUMNS[1].1;
        let observation_x = grade_x + COLUMNS[2].1;
        for offset in 0..count {
            let index = line + offset;
            let row_top = top + offset as f32 * LINE;
            if let Some(text) = name_lines.get(index) {
                canvas.text_at(
                    Font::Regular,
                    BODY_SIZE,
                    MARGIN,
                    row_top,
                    COLUMNS[0].1,
                    LINE,
                    text,
                    Align::Left,
                )?;
            }
            if index == 0 {
                canvas.text_at(
                    Font::Regular,
                    BODY_SIZE,
                    score_x,
                    row_top,
                    COLUMNS[1].1,
                    LINE,
                    &score,
                    Align::Center,
                )?;
                canvas.text_at(
                    Font::Regular,
                    BODY_SIZE,
                    grade_x,
                    row_top,
                    COLUMNS[2].1,
                    LINE,
                    &grade,
                    Align::Center,
                )?;
            }
            if let Some(text) = observation_lines.get(index) {
                canvas.text_at(
                    Font::Regular,
                    BODY_SIZE,
                    observation_x,
                    row_top,
                    COLUMNS[3].1,
                    LINE,
                    text,
                    Align::Left,
                )?;
            }
        }

        canvas.y += height;
        line += count;
        fresh_page = false;
    }

    Ok(())
}

fn write_summary(canvas: &mut Canvas, model: &ReportModel) -> Result<(), RenderError> {
    canvas.y += 5.0 * MM;
    canvas.ensure_space(FIELD_HEIGHT)?;
    let average = format!(
        "Nota media: {} ({})",
        model.average_score(),
        model.average_grade()
    );
    canvas.cell_text(
        Font::Bold,
        HEADING_SIZE,
        MARGIN,
        CONTENT_WIDTH,
        FIELD_HEIGHT,
        &average,
        Align::Left,
    )?;
    canvas.y += FIELD_HEIGHT + 2.0 * MM;

    canvas.ensure_space(FIELD_HEIGHT + LINE)?;
    canvas.cell_text(
        Font::Bold,
        HEADING_SIZE,
        MARGIN,
        CONTENT_WIDTH,
        FIELD_HEIGHT,
        "Observaciones generales / Justificación",
        Align::Left,
    )?;
    canvas.y += FIELD_HEIGHT;

    for line in wrap_text(
        model.general_observations(),
        Font::Regular,
        BODY_SIZE,
        CONTENT_WIDTH - 2.0 * PAD,
    ) {
        canvas.ensure_space(LINE)?;
        canvas.cell_text(
            Font::Regular,
            BODY_SIZE,
            MARGIN,
            CONTENT_WIDTH,
            LINE,
            &line,
            Align::Left,
        )?;
        canvas.y += LINE;
    }

    Ok(())
}

fn write_footer(page: &mut Vec<u8>, number: usize, count: usize) -> Result<(), RenderError> {
    let text = format!("Página {number} de {count}");
    let x = MARGIN + (CONTENT_WIDTH - Font::Regular.text_width(&text, FOOTER_SIZE)) / 2.0;
    let baseline = PAGE_HEIGHT - MARGIN;
    draw_text(page, Font::Regular, FOOTER_SIZE, x, baseline, &text)
}

fn font_id(font: Font) -> usize {
    match font {
        Font::Regular => 3,
        Font::Bold => 4,
    }
}

fn assemble(pages: &[Vec<u8>], title: &str) -> Result<Vec<u8>, RenderError> {
    let page_ids: Vec<usize> = (0..pages.len())
        .map(|index| FIRST_PAGE_ID + 2 * index)
        .collect();
    let mut writer = PdfWriter::new(FIRST_PAGE_ID - 1 + 2 * pages.len())?;

    writer.object(
        CATALOG_ID,
        format!("<< /Type /Catalog /Pages {PAGES_ID} 0 R >>").as_bytes(),
    )?;

    let kids = page_ids
        .iter()
        .map(|id| format!("{id} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");
    writer.object(
        PAGES_ID,
        format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", pages.len()).as_bytes(),
    )?;

    for font in [Font::Regular, Font::Bold] {
        writer.object(
            font_id(font),
            format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.base_font()
            )
            .as_bytes(),
        )?;
    }

    let mut info = b"<< /Title ".to_vec();
    info.extend(literal_string(title)?);
    info.extend_from_slice(b" /Producer (guard-report) >>");
    writer.object(INFO_ID, &info)?;

    for (page_id, content) in page_ids.iter().zip(pages) {
        let contents_id = page_id + 1;
        writer.object(
            *page_id,
            format!(
                "<< /Type /Page /Parent {PAGES_ID} 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
/Resources << /Font << /{} {} 0 R /{} {} 0 R >> >> /Contents {contents_id} 0 R >>",
                Font::Regular.resource_name(),
                font_id(Font::Regular),
                Font::Bold.resource_name(),
                font_id(Font::Bold),
            )
            .as_bytes(),
        )?;
        writer.stream(contents_id, content)?;
    }

    writer.finish(CATALOG_ID, INFO_ID)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::{build_report, AnswerSheet, Category, CategoryAnswer};
    use chrono::NaiveDate;

    fn model_with(observation: &str, general: &str) -> ReportModel {
        let header = ReportHeader::new(
            "Teniente Ríos",
            NaiveDate::from_ymd_opt(2025, 9, 24).expect("valid date"),
            "Juan Pérez",
            "Guardia (puente)",
        );
        let sheet: AnswerSheet = Category::ordered()
            .into_iter()
            .map(|category| (category, CategoryAnswer::with_checked(3, observation)))
            .collect();
        build_report(header, &sheet, general).expect("report builds")
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack
            .windows(needle.len())
            .any(|window| window == needle)
    }

    fn page_count(pdf: &[u8]) -> usize {
        let text = String::from_utf8_lossy(pdf);
        let start = text.find("/Count ").expect("pages tree present") + "/Count ".len();
        text[start..]
            .split(|c: char| !c.is_ascii_digit())
            .next()
            .and_then(|digits| digits.parse().ok())
            .expect("page count")
    }

    #[test]
    fn renders_a_single_page_with_all_sections() {
        let pdf = PdfRenderer::default()
            .render(&model_with("5.00", "Sin novedad"))
            .expect("pdf renders");

        assert!(pdf.starts_with(b"%PDF-1.4\n"));
        assert!(pdf.ends_with(b"%%EOF\n"));
        assert_eq!(page_count(&pdf), 1);
        assert!(contains(&pdf, b"(INFORME PERSONAL DE LA GUARDIA) Tj"));
        assert!(contains(&pdf, b"(Informante:) Tj"));
        assert!(contains(&pdf, b"(24.09.2025) Tj"));
        assert!(contains(&pdf, b"(Guardia \\(puente\\)) Tj"));
        assert!(contains(&pdf, b"(POLIC\xcdA) Tj"));
        assert!(contains(&pdf, b"(DISCIPLINA) Tj"));
        assert!(contains(&pdf, b"(Nota media: 5.00 \\(C\\)) Tj"));
        assert!(contains(&pdf, b"(Observaciones generales / Justificaci\xf3n) Tj"));
        assert!(contains(&pdf, b"(Sin novedad) Tj"));
        assert!(contains(&pdf, b"(P\xe1gina 1 de 1) Tj"));
    }

    #[test]
    fn cross_reference_offsets_point_at_objects() {
        let pdf = PdfRenderer::default()
            .render(&model_with("ok", ""))
            .expect("pdf renders");
        let marker = b"startxref\n";
        let startxref = pdf
            .windows(marker.len())
            .rposition(|window| window == marker)
            .expect("startxref")
            + marker.len();
        let tail = std::str::from_utf8(&pdf[startxref..]).expect("ascii trailer");
        let xref_offset: usize = tail
            .lines()
            .next()
            .and_then(|line| line.parse().ok())
            .expect("xref offset");
        assert!(pdf[xref_offset..].starts_with(b"xref\n"));

        let table = std::str::from_utf8(&pdf[xref_offset..]).expect("ascii xref table");
        for (index, entry) in table.lines().skip(3).take_while(|l| l.ends_with(" n ")).enumerate() {
            let offset: usize = entry[..10].parse().expect("offset digits");
            let expected = format!("{} 0 obj", index + 1);
            assert!(pdf[offset..].starts_with(expected.as_bytes()), "object {}", index + 1);
        }
    }

    #[test]
    fn long_observations_continue_on_following_pages() {
        let observation = "Observación extensa sobre el desempeño durante la guardia. ".repeat(40);
        let pdf = PdfRenderer::default()
            .render(&model_with(&observation, "Fin"))
            .expect("pdf renders");

        let pages = page_count(&pdf);
        assert!(pages > 2, "expected several pages, got {pages}");
        let last_footer = format!("P\u{e1}gina {pages} de {pages}");
        let encoded: Vec<u8> = last_footer
            .chars()
            .filter_map(fonts::encode_win_ansi)
            .collect();
        assert!(contains(&pdf, &encoded));
        assert!(contains(&pdf, b"(Fin) Tj"));
    }

    #[test]
    fn text_outside_win_ansi_fails_instead_of_degrading() {
        let model = model_with("Ocena: dobrą", "");
        match PdfRenderer::default().render(&model) {
            Err(RenderError::Unencodable { field, character }) => {
                assert_eq!(field, "observation for POLICÍA");
                assert_eq!(character, 'ą');
            }
            other => panic!("expected unencodable observation, got {other:?}"),
        }

        let header = ReportHeader::new(
            "Teniente Ríos",
            NaiveDate::from_ymd_opt(2025, 9, 24).expect("valid date"),
            "Łukasz Wąs",
            "Puerta",
        );
        let sheet: AnswerSheet = Category::ordered()
            .into_iter()
            .map(|category| (category, CategoryAnswer::with_checked(3, "5.00")))
            .collect();
        let model = build_report(header, &sheet, "").expect("report builds");
        match PdfRenderer::default().render(&model) {
            Err(RenderError::Unencodable { field, character }) => {
                assert_eq!(field, "subject");
                assert_eq!(character, 'Ł');
            }
            other => panic!("expected unencodable subject, got {other:?}"),
        }
    }

    #[test]
    fn output_is_deterministic() {
        let model = model_with("igual", "igual");
        let first = PdfRenderer::default().render(&model).expect("pdf renders");
        let second = PdfRenderer::default().render(&model).expect("pdf renders");
        assert_eq!(first, second);
    }

    #[test]
    fn custom_title_is_used_on_pages_and_metadata() {
        let renderer = PdfRenderer::new(RenderOptions {
            title: "INFORME DE PRUEBA".to_string(),
        });
        let pdf = renderer.render(&model_with("", "")).expect("pdf renders");
        assert!(contains(&pdf, b"(INFORME DE PRUEBA) Tj"));
        assert!(contains(&pdf, b"/Title (INFORME DE PRUEBA)"));
    }
}

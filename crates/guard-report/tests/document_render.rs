use chrono::NaiveDate;
use guard_report::evaluation::{build_report, AnswerSheet, Category, CategoryAnswer, ReportHeader};
use guard_report::render::{render_document, DocumentFormat, RenderOptions};

fn model(subject: &str) -> guard_report::evaluation::ReportModel {
    let header = ReportHeader::new(
        "Sargento Gómez",
        NaiveDate::from_ymd_opt(2025, 9, 24).expect("valid report date"),
        subject,
        "Puerta",
    );
    let sheet: AnswerSheet = Category::ordered()
        .into_iter()
        .map(|category| (category, CategoryAnswer::with_checked(3, "5.00")))
        .collect();
    build_report(header, &sheet, "Sin incidencias").expect("report builds")
}

#[test]
fn pdf_document_carries_download_metadata() {
    let document = render_document(
        &model("Juan Pérez"),
        DocumentFormat::Pdf,
        RenderOptions::default(),
    )
    .expect("pdf renders");

    assert_eq!(document.file_name, "Informe_Juan_Pérez.pdf");
    assert_eq!(document.content_type, mime::APPLICATION_PDF);
    assert!(document.bytes.starts_with(b"%PDF-1.4"));
    assert!(document.bytes.ends_with(b"%%EOF\n"));
    assert_eq!(
        document.content_disposition(),
        "attachment; filename=\"Informe_Juan_P_rez.pdf\"; filename*=UTF-8''Informe_Juan_P%C3%A9rez.pdf"
    );
}

#[test]
fn html_document_lists_every_category() {
    let document = render_document(
        &model("Ana María López"),
        DocumentFormat::Html,
        RenderOptions::default(),
    )
    .expect("html renders");

    assert_eq!(document.file_name, "Informe_Ana_María_López.html");
    let html = String::from_utf8(document.bytes).expect("utf-8 html");
    for category in Category::ordered() {
        assert!(html.contains(&format!("data-category=\"{}\"", category.slug())));
    }
    assert!(html.contains("Nota media: 5.00 (C)"));
    assert!(html.contains("Sin incidencias"));
}

#[test]
fn format_names_parse_case_insensitively() {
    assert_eq!("PDF".parse::<DocumentFormat>(), Ok(DocumentFormat::Pdf));
    assert_eq!(" html ".parse::<DocumentFormat>(), Ok(DocumentFormat::Html));
    assert!("docx".parse::<DocumentFormat>().is_err());
}

use crate::infra::{parse_date, parse_format};
use chrono::NaiveDate;
use clap::Args;
use guard_report::config::AppConfig;
use guard_report::error::AppError;
use guard_report::evaluation::{
    average_score, build_report, AnswerImporter, AnswerSheet, Category, CategoryResult,
    EvaluationError,
};
use guard_report::render::{render_document, DocumentFormat, RenderedDocument};
use guard_report::session::{fill_observation_placeholders, HeaderDraft};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Answers CSV (Category,Q1..Q6,Observation), one row per category
    #[arg(long)]
    pub(crate) answers: PathBuf,
    /// Name of the person writing the report
    #[arg(long)]
    pub(crate) informer: String,
    /// Report date (YYYY-MM-DD or DD.MM.YYYY)
    #[arg(long, value_parser = parse_date)]
    pub(crate) date: NaiveDate,
    /// Name of the person evaluated
    #[arg(long)]
    pub(crate) subject: String,
    /// Post or role held during the guard
    #[arg(long)]
    pub(crate) post: String,
    /// General observations text
    #[arg(long, conflicts_with = "observations_file")]
    pub(crate) observations: Option<String>,
    /// Read general observations from a file
    #[arg(long)]
    pub(crate) observations_file: Option<PathBuf>,
    /// Document format (pdf or html); defaults to APP_DOCUMENT_FORMAT
    #[arg(long, value_parser = parse_format)]
    pub(crate) format: Option<DocumentFormat>,
    /// Directory the document is written to
    #[arg(long, default_value = ".")]
    pub(crate) out_dir: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Answers CSV (Category,Q1..Q6,Observation), one row per category
    #[arg(long)]
    pub(crate) answers: PathBuf,
}

#[derive(Args, Debug, Default)]
pub(crate) struct TemplateArgs {
    /// Write the template to this file instead of stdout
    #[arg(long)]
    pub(crate) out: Option<PathBuf>,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let format = args.format.unwrap_or(config.report.format);
    let path = write_report(&args, format, &config)?;

    println!("{}", path.display());
    Ok(())
}

/// Renders the report into `args.out_dir` and returns the written file's path.
pub(crate) fn write_report(
    args: &ReportArgs,
    format: DocumentFormat,
    config: &AppConfig,
) -> Result<PathBuf, AppError> {
    let document = generate_report(args, format, config)?;

    std::fs::create_dir_all(&args.out_dir)?;
    let path = args.out_dir.join(&document.file_name);
    std::fs::write(&path, &document.bytes)?;
    Ok(path)
}

pub(crate) fn generate_report(
    args: &ReportArgs,
    format: DocumentFormat,
    config: &AppConfig,
) -> Result<RenderedDocument, AppError> {
    let header = HeaderDraft {
        informer: args.informer.clone(),
        date: Some(args.date),
        subject: args.subject.clone(),
        post: args.post.clone(),
    }
    .complete()?;

    let observations = match (&args.observations, &args.observations_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => String::new(),
    };

    let sheet = load_sheet(&args.answers)?;
    let model = build_report(header, &sheet, observations)?;
    Ok(render_document(
        &model,
        format,
        config.report.render_options(),
    )?)
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let sheet = load_sheet(&args.answers)?;
    print!("{}", score_table(&sheet)?);
    Ok(())
}

/// Per-category scores followed by the average; fails on the first missing category.
pub(crate) fn score_table(sheet: &AnswerSheet) -> Result<String, AppError> {
    let mut results = Vec::with_capacity(Category::COUNT);
    for category in Category::ordered() {
        let answer = sheet
            .get(category)
            .ok_or(EvaluationError::MissingCategory(category))?;
        results.push(CategoryResult::from_answer(category, answer)?);
    }

    let mut table = String::new();
    for result in &results {
        table.push_str(&format!(
            "{:<30} {:>6}  {}\n",
            result.category.label(),
            result.score.to_string(),
            result.grade
        ));
    }

    let scores: Vec<_> = results.iter().map(|result| result.score).collect();
    let average = average_score(&scores)?;
    table.push_str(&format!(
        "{:<30} {:>6}  {}\n",
        "Nota media",
        average.to_string(),
        average.grade()
    ));
    Ok(table)
}

pub(crate) fn run_template(args: TemplateArgs) -> Result<(), AppError> {
    match args.out {
        Some(path) => {
            let file = std::fs::File::create(&path)?;
            AnswerImporter::write_template(file)?;
            println!("{}", path.display());
        }
        None => AnswerImporter::write_template(std::io::stdout().lock())?,
    }
    Ok(())
}

fn load_sheet(path: &Path) -> Result<AnswerSheet, AppError> {
    let mut sheet = AnswerImporter::from_path(path)?;
    fill_observation_placeholders(&mut sheet)?;
    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_answers(dir: &Path, checked: usize, skip: Option<Category>) -> PathBuf {
        let path = dir.join("answers.csv");
        let mut file = std::fs::File::create(&path).expect("create answers");
        writeln!(file, "Category,Q1,Q2,Q3,Q4,Q5,Q6,Observation").expect("write header");
        for category in Category::ordered() {
            if Some(category) == skip {
                continue;
            }
            let cells: Vec<&str> = (0..6)
                .map(|index| if index < checked { "1" } else { "0" })
                .collect();
            writeln!(file, "{},{},", category.slug(), cells.join(",")).expect("write row");
        }
        path
    }

    fn report_args(answers: PathBuf, out_dir: PathBuf) -> ReportArgs {
        ReportArgs {
            answers,
            informer: "Sargento Gómez".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 9, 24).expect("valid date"),
            subject: "Juan Pérez".to_string(),
            post: "Puerta".to_string(),
            observations: Some("Sin novedad".to_string()),
            observations_file: None,
            format: None,
            out_dir,
        }
    }

    fn config() -> AppConfig {
        AppConfig {
            environment: guard_report::config::AppEnvironment::Test,
            server: guard_report::config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            telemetry: guard_report::config::TelemetryConfig {
                log_level: "info".to_string(),
                ansi: false,
            },
            sessions: Default::default(),
            report: Default::default(),
        }
    }

    #[test]
    fn score_table_lists_categories_and_average() {
        let dir = tempdir().expect("temp dir");
        let sheet = load_sheet(&write_answers(dir.path(), 3, None)).expect("sheet loads");

        let table = score_table(&sheet).expect("table builds");
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), Category::COUNT + 1);
        assert!(lines[0].starts_with("POLICÍA"));
        assert!(lines[0].ends_with("5.00  C"));
        assert!(lines[Category::COUNT].starts_with("Nota media"));
        assert!(lines[Category::COUNT].ends_with("5.00  C"));
    }

    #[test]
    fn score_table_names_missing_categories() {
        let dir = tempdir().expect("temp dir");
        let sheet = load_sheet(&write_answers(dir.path(), 6, Some(Category::Trato)))
            .expect("sheet loads");

        match score_table(&sheet) {
            Err(AppError::Evaluation(EvaluationError::MissingCategory(Category::Trato))) => {}
            other => panic!("expected missing TRATO, got {other:?}"),
        }
    }

    #[test]
    fn generate_report_uses_placeholders_for_blank_observations() {
        let dir = tempdir().expect("temp dir");
        let args = report_args(
            write_answers(dir.path(), 6, None),
            dir.path().to_path_buf(),
        );

        let document =
            generate_report(&args, DocumentFormat::Html, &config()).expect("document renders");
        assert_eq!(document.file_name, "Informe_Juan_Pérez.html");
        let html = String::from_utf8(document.bytes).expect("utf-8");
        assert!(html.contains("<td class=\"pre\">10.00</td>"));
        assert!(html.contains("Nota media: 10.00 (A)"));
        assert!(html.contains("Sin novedad"));
    }

    #[test]
    fn generate_report_rejects_blank_header_fields() {
        let dir = tempdir().expect("temp dir");
        let mut args = report_args(
            write_answers(dir.path(), 1, None),
            dir.path().to_path_buf(),
        );
        args.post = "  ".to_string();

        match generate_report(&args, DocumentFormat::Pdf, &config()) {
            Err(AppError::Header(err)) => assert_eq!(err.missing, vec!["post"]),
            other => panic!("expected incomplete header, got {other:?}"),
        }
    }

    #[test]
    fn write_report_keeps_subjects_with_separators_in_out_dir() {
        let dir = tempdir().expect("temp dir");
        let out_dir = dir.path().join("informes");
        let mut args = report_args(write_answers(dir.path(), 4, None), out_dir.clone());
        args.subject = "Pérez/García".to_string();

        let path = write_report(&args, DocumentFormat::Pdf, &config()).expect("report written");

        assert_eq!(path, out_dir.join("Informe_Pérez_García.pdf"));
        let bytes = std::fs::read(&path).expect("report readable");
        assert!(bytes.starts_with(b"%PDF-1.4"));
    }
}

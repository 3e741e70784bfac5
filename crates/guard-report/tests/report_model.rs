use chrono::NaiveDate;
use guard_report::evaluation::{
    build_report, AnswerSheet, Category, CategoryAnswer, EvaluationError, Grade, ReportHeader,
};

fn header() -> ReportHeader {
    ReportHeader::new(
        "Sargento Gómez",
        NaiveDate::from_ymd_opt(2025, 9, 24).expect("valid report date"),
        "Juan Pérez",
        "Puerta principal",
    )
}

fn uniform_sheet(checked: usize) -> AnswerSheet {
    Category::ordered()
        .into_iter()
        .map(|category| (category, CategoryAnswer::with_checked(checked, "Sin novedad")))
        .collect()
}

#[test]
fn half_checked_everywhere_averages_to_a_c() {
    let model = build_report(header(), &uniform_sheet(3), "").expect("report builds");

    assert_eq!(model.results().len(), Category::COUNT);
    for result in model.results() {
        assert_eq!(result.score.to_string(), "5.00");
        assert_eq!(result.grade, Grade::C);
    }
    assert_eq!(model.average_score().to_string(), "5.00");
    assert_eq!(model.average_grade(), Grade::C);
}

#[test]
fn one_perfect_category_among_empty_ones_is_a_d() {
    let mut sheet = uniform_sheet(0);
    sheet.insert(
        Category::Policia,
        CategoryAnswer::with_checked(6, "Impecable"),
    );

    let model = build_report(header(), &sheet, "").expect("report builds");

    let policia = model.result(Category::Policia).expect("policia scored");
    assert_eq!(policia.score.to_string(), "10.00");
    assert_eq!(policia.grade, Grade::A);
    assert_eq!(model.average_score().to_string(), "0.91");
    assert_eq!(model.average_grade(), Grade::D);
}

#[test]
fn extremes_map_to_a_and_d() {
    let full = build_report(header(), &uniform_sheet(6), "").expect("report builds");
    assert_eq!(full.average_score().to_string(), "10.00");
    assert_eq!(full.average_grade(), Grade::A);

    let empty = build_report(header(), &uniform_sheet(0), "").expect("report builds");
    assert_eq!(empty.average_score().to_string(), "0.00");
    assert_eq!(empty.average_grade(), Grade::D);
}

#[test]
fn each_missing_category_is_named() {
    for category in Category::ordered() {
        let mut sheet = uniform_sheet(4);
        sheet.remove(category);

        match build_report(header(), &sheet, "") {
            Err(EvaluationError::MissingCategory(missing)) => assert_eq!(missing, category),
            other => panic!("expected {category} to be missing, got {other:?}"),
        }
    }
}

#[test]
fn results_follow_catalog_order_and_keep_observations() {
    let mut sheet = uniform_sheet(2);
    sheet.insert(
        Category::Trato,
        CategoryAnswer::with_checked(5, "Cordial con el público"),
    );

    let model =
        build_report(header(), &sheet, "Apto para el servicio").expect("report builds");

    let order: Vec<Category> = model.results().iter().map(|result| result.category).collect();
    assert_eq!(order, Category::ordered().to_vec());
    let trato = model.result(Category::Trato).expect("trato scored");
    assert_eq!(trato.score.to_string(), "8.33");
    assert_eq!(trato.grade, Grade::B);
    assert_eq!(trato.observation, "Cordial con el público");
    assert_eq!(model.general_observations(), "Apto para el servicio");
    assert_eq!(model.header().display_date(), "24.09.2025");
}

#[test]
fn rebuilding_from_the_same_answers_is_identical() {
    let sheet = uniform_sheet(5);
    let first = build_report(header(), &sheet, "Igual").expect("report builds");
    let second = build_report(header(), &sheet, "Igual").expect("report builds");
    assert_eq!(first, second);
}

#[test]
fn wrong_answer_counts_are_rejected() {
    let mut sheet = uniform_sheet(1);
    sheet.insert(
        Category::Disciplina,
        CategoryAnswer::new(vec![true; 4], "corto"),
    );

    assert!(matches!(
        build_report(header(), &sheet, ""),
        Err(EvaluationError::InvalidInput(_))
    ));
}

use pretty_assertions::assert_eq;
use recprio_domain::{PrioritizeResult, Prioritizer, PrioritizerConfig, Ruleset};
use recprio_records::parse_records;
use recprio_workbook::{WorkbookOptions, recent_since, render_workbook, sheet_plan};

fn run(json: &str) -> PrioritizeResult {
    let entries = parse_records("test", json).expect("parse");
    Prioritizer::new(Ruleset::builtin().expect("rules"), PrioritizerConfig::default())
        .prioritize(&entries)
}

const TABLE: &str = r#"[
    {"id": "b", "sector": "labour", "year": 2024,
     "recommendation": "Report to all citizens on the unemployment guideline for small business."},
    {"id": "a", "sector": "labour", "year": 2019,
     "recommendation": "Inform all citizens about the unemployment insurance guideline for small business."},
    {"id": "c", "sector": "energy", "year": 2021,
     "recommendation": "Parliament should pass legislation to restructure Eskom with R20 billion in funding."}
]"#;

#[test]
fn plan_has_fixed_sheets_then_sectors() {
    let result = run(TABLE);
    let plan = sheet_plan(&result.dataset, &WorkbookOptions::default());
    let names: Vec<&str> = plan.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "All Prioritized",
            "Quick Wins",
            "High Priority",
            "Top 100 ROI",
            "Top Growth Priorities",
            "Fiscally Optimal",
            "Institutional Reforms",
            "Recent (2022+)",
            "Energy",
            "Labour",
        ]
    );
}

#[test]
fn equal_roi_rows_are_ordered_by_id() {
    let result = run(TABLE);
    let plan = sheet_plan(&result.dataset, &WorkbookOptions::default());
    let labour = plan.iter().find(|s| s.name == "Labour").expect("labour sheet");
    let ids: Vec<&str> = labour.rows.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);

    let all = &plan[0];
    assert_eq!(all.rows.len(), 3);
    let all_ids: Vec<&str> = all.rows.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(all_ids, vec!["c", "a", "b"]);
}

#[test]
fn top_n_and_recent_window_are_configurable() {
    let result = run(TABLE);
    let opts = WorkbookOptions {
        recent_since: Some(2019),
        top_roi: 1,
        top_growth: 2,
    };
    assert_eq!(recent_since(&result.dataset, &opts), Some(2019));
    let plan = sheet_plan(&result.dataset, &opts);
    let rows = |name: &str| {
        plan.iter()
            .find(|s| s.name == name)
            .map(|s| s.rows.len())
            .expect("sheet")
    };
    assert_eq!(rows("Top 100 ROI"), 1);
    assert_eq!(rows("Top Growth Priorities"), 2);
    assert_eq!(rows("Recent (2019+)"), 3);
}

#[test]
fn empty_dataset_has_no_recent_or_sector_sheets() {
    let result = run("[]");
    let plan = sheet_plan(&result.dataset, &WorkbookOptions::default());
    assert_eq!(plan.len(), 7);
    assert!(plan.iter().all(|s| s.rows.is_empty()));
}

#[test]
fn rendered_workbook_is_a_zip_container() {
    let result = run(TABLE);
    let bytes = render_workbook(&result.dataset, &result.summary, &WorkbookOptions::default())
        .expect("render");
    assert!(bytes.starts_with(b"PK"));
}

fn table_with(sector: &str, text: &str) -> String {
    serde_json::json!([
        {"id": "short", "sector": "labour", "year": 2024,
         "recommendation": "Report to all citizens on the unemployment guideline for small business."},
        {"id": "long", "sector": sector, "year": 2023, "recommendation": text},
    ])
    .to_string()
}

#[test]
fn oversized_recommendation_text_still_renders() {
    let text = "The department should report to the committee on the audit plan. ".repeat(560);
    assert!(text.chars().count() > recprio_workbook::MAX_CELL_CHARS);

    let result = run(&table_with("finance", &text));
    assert_eq!(result.dataset.records.len(), 2);
    let bytes = render_workbook(&result.dataset, &result.summary, &WorkbookOptions::default())
        .expect("render with oversized text");
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn sector_cut_on_an_apostrophe_still_renders() {
    let sector = format!("{}'s portfolio", "a".repeat(30));
    let result = run(&table_with(
        &sector,
        "National Treasury should strengthen budget oversight of provincial grants.",
    ));
    let plan = sheet_plan(&result.dataset, &WorkbookOptions::default());
    assert!(plan.iter().all(|s| !s.name.ends_with('\'')));
    render_workbook(&result.dataset, &result.summary, &WorkbookOptions::default())
        .expect("render with apostrophe sector");
}

//! Workbook rendering for a scored dataset.
//!
//! The workbook is planned first ([`sheet_plan`]) and written second ([`render_workbook`]) so the
//! sheet selection and ordering can be checked without reading xlsx back.

use recprio_types::scored::{ScoredDataset, ScoredRecommendation, ranked_by};
use recprio_types::summary::PrioritizationSummary;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

pub const WORKBOOK_FILE_NAME: &str = "recommendations_prioritized.xlsx";

const MAX_SHEET_NAME: usize = 31;

/// Longest string Excel stores in one cell.
pub const MAX_CELL_CHARS: usize = 32_767;
const RECENT_WINDOW: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkbookOptions {
    /// First year counted as recent. `None` means two years before the newest record.
    pub recent_since: Option<i32>,
    pub top_roi: usize,
    pub top_growth: usize,
}

impl Default for WorkbookOptions {
    fn default() -> Self {
        Self {
            recent_since: None,
            top_roi: 100,
            top_growth: 200,
        }
    }
}

/// One record sheet: a unique, Excel-safe name and its rows in output order.
#[derive(Debug, Clone)]
pub struct SheetSpec<'a> {
    pub name: String,
    pub rows: Vec<&'a ScoredRecommendation>,
}

const COLUMNS: &[&str] = &[
    "id",
    "year",
    "sector",
    "report",
    "recommendation",
    "category",
    "institutional_reform",
    "feasibility_score",
    "impact_score",
    "cost_score",
    "roi_score",
    "is_quick_win",
    "is_high_priority",
    "is_fiscally_optimal",
    "fiscal_feasibility",
    "fiscal_tier",
    "mtbps_alignment",
    "fiscal_priority_score",
    "binding_constraint",
    "growth_elasticity",
    "growth_priority_score",
    "political_feasibility",
    "political_level",
    "urgency",
    "sentiment",
    "largest_amount_rand",
    "timeframes",
];

pub fn recent_since(dataset: &ScoredDataset, opts: &WorkbookOptions) -> Option<i32> {
    opts.recent_since.or_else(|| {
        dataset
            .records
            .iter()
            .filter_map(|r| r.year)
            .max()
            .map(|y| y - RECENT_WINDOW)
    })
}

pub fn sheet_plan<'a>(dataset: &'a ScoredDataset, opts: &WorkbookOptions) -> Vec<SheetSpec<'a>> {
    let records = &dataset.records;
    let roi = |r: &ScoredRecommendation| r.scores.roi_score();
    let by_roi = ranked_by(records, roi);

    let mut names = SheetNames::default();
    let mut plan = Vec::new();
    let mut push = |name: &str, rows: Vec<&'a ScoredRecommendation>| {
        plan.push(SheetSpec {
            name: names.claim(name),
            rows,
        });
    };

    push("All Prioritized", by_roi.clone());
    push("Quick Wins", ranked_by(records.iter().filter(|r| r.is_quick_win()), roi));
    push(
        "High Priority",
        ranked_by(records.iter().filter(|r| r.is_high_priority()), roi),
    );
    push("Top 100 ROI", by_roi.iter().take(opts.top_roi).copied().collect());
    push(
        "Top Growth Priorities",
        ranked_by(records, |r| r.growth.growth_priority_score)
            .into_iter()
            .take(opts.top_growth)
            .collect(),
    );
    push(
        "Fiscally Optimal",
        ranked_by(records.iter().filter(|r| r.is_fiscally_optimal()), |r| {
            r.fiscal.fiscal_priority_score
        }),
    );
    push(
        "Institutional Reforms",
        ranked_by(records.iter().filter(|r| r.is_institutional_reform()), roi),
    );

    if let Some(since) = recent_since(dataset, opts) {
        push(
            &format!("Recent ({since}+)"),
            ranked_by(
                records.iter().filter(|r| r.year.is_some_and(|y| y >= since)),
                roi,
            ),
        );
    }

    let sectors: BTreeSet<&str> = records.iter().map(|r| r.sector.as_str()).collect();
    for sector in sectors {
        push(
            &title_case(sector),
            ranked_by(records.iter().filter(|r| r.sector == sector), roi),
        );
    }

    plan
}

/// Render the full workbook to an in-memory xlsx file.
pub fn render_workbook(
    dataset: &ScoredDataset,
    summary: &PrioritizationSummary,
    opts: &WorkbookOptions,
) -> Result<Vec<u8>, XlsxError> {
    let header = Format::new().set_bold();
    let mut workbook = Workbook::new();

    let plan = sheet_plan(dataset, opts);
    let mut names = SheetNames::default();
    for spec in &plan {
        names.claim(&spec.name);
        debug!(sheet = %spec.name, rows = spec.rows.len(), "writing sheet");
        let sheet = workbook.add_worksheet();
        sheet.set_name(&spec.name)?;
        write_records(sheet, &spec.rows, &header)?;
    }

    let sheet = workbook.add_worksheet();
    sheet.set_name(names.claim("Summary"))?;
    write_summary(sheet, summary, &header)?;

    workbook.save_to_buffer()
}

fn write_records(
    sheet: &mut Worksheet,
    rows: &[&ScoredRecommendation],
    header: &Format,
) -> Result<(), XlsxError> {
    for (col, name) in COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, header)?;
    }
    sheet.set_freeze_panes(1, 0)?;
    sheet.set_column_width(4, 80)?;

    for (i, r) in rows.iter().enumerate() {
        let row = i as u32 + 1;
        let mut col = 0u16;
        let mut next = || {
            let c = col;
            col += 1;
            c
        };

        write_text(sheet, row, next(), &r.id, &r.id)?;
        let year_col = next();
        if let Some(y) = r.year {
            sheet.write_number(row, year_col, f64::from(y))?;
        }
        write_text(sheet, row, next(), &r.sector, &r.id)?;
        write_text(sheet, row, next(), &r.report, &r.id)?;
        write_text(sheet, row, next(), &r.text, &r.id)?;
        sheet.write_string(row, next(), r.category.label())?;
        write_text(sheet, row, next(), &reform_cell(r), &r.id)?;
        sheet.write_number(row, next(), f64::from(r.scores.feasibility().get()))?;
        sheet.write_number(row, next(), f64::from(r.scores.impact().get()))?;
        sheet.write_number(row, next(), f64::from(r.scores.cost().get()))?;
        sheet.write_number(row, next(), r.scores.roi_score())?;
        sheet.write_boolean(row, next(), r.is_quick_win())?;
        sheet.write_boolean(row, next(), r.is_high_priority())?;
        sheet.write_boolean(row, next(), r.is_fiscally_optimal())?;
        sheet.write_number(row, next(), f64::from(r.fiscal.fiscal_feasibility))?;
        sheet.write_string(row, next(), r.fiscal.fiscal_tier.label())?;
        sheet.write_string(row, next(), &r.fiscal.alignment_label())?;
        sheet.write_number(row, next(), r.fiscal.fiscal_priority_score)?;
        sheet.write_string(row, next(), r.growth.binding_constraint.key())?;
        sheet.write_number(row, next(), f64::from(r.growth.growth_elasticity))?;
        sheet.write_number(row, next(), r.growth.growth_priority_score)?;
        sheet.write_number(row, next(), r.political.total_score)?;
        sheet.write_string(row, next(), r.political.level.key())?;
        sheet.write_string(row, next(), r.signals.urgency.key())?;
        sheet.write_string(row, next(), r.signals.sentiment.key())?;
        let amount_col = next();
        if let Some(amount) = r.facts.largest_amount() {
            sheet.write_number(row, amount_col, amount)?;
        }
        write_text(sheet, row, next(), &r.facts.timeframes.join("; "), &r.id)?;
    }
    Ok(())
}

fn write_summary(
    sheet: &mut Worksheet,
    summary: &PrioritizationSummary,
    header: &Format,
) -> Result<(), XlsxError> {
    sheet.write_string_with_format(0, 0, "metric", header)?;
    sheet.write_string_with_format(0, 1, "value", header)?;
    sheet.set_column_width(0, 48)?;

    let avg = &summary.averages;
    let mut rows: Vec<(String, f64)> = vec![
        (
            "total_recommendations".into(),
            summary.total_recommendations as f64,
        ),
        ("quick_wins".into(), summary.quick_wins as f64),
        ("high_priority".into(), summary.high_priority as f64),
        (
            "institutional_reforms".into(),
            summary.institutional_reforms as f64,
        ),
        ("fiscally_optimal".into(), summary.fiscally_optimal as f64),
        ("avg_feasibility".into(), avg.feasibility),
        ("avg_impact".into(), avg.impact),
        ("avg_cost".into(), avg.cost),
        ("avg_roi".into(), avg.roi),
        ("avg_growth_priority".into(), avg.growth_priority),
        ("avg_fiscal_priority".into(), avg.fiscal_priority),
        ("avg_political_feasibility".into(), avg.political_feasibility),
    ];
    for (sector, stat) in &summary.by_sector {
        rows.push((format!("sector:{sector}"), stat.count as f64));
    }
    for (year, count) in &summary.by_year {
        rows.push((format!("year:{year}"), *count as f64));
    }
    push_counts(&mut rows, "category", &summary.by_category);
    push_counts(&mut rows, "fiscal_tier", &summary.by_fiscal_tier);
    push_counts(
        &mut rows,
        "binding_constraint",
        &summary.by_binding_constraint,
    );
    for t in &summary.themes {
        rows.push((format!("theme:{}", t.theme), t.count as f64));
    }

    for (i, (label, value)) in rows.iter().enumerate() {
        let row = i as u32 + 1;
        write_text(sheet, row, 0, label, "summary")?;
        sheet.write_number(row, 1, *value)?;
    }
    Ok(())
}

fn push_counts(rows: &mut Vec<(String, f64)>, prefix: &str, counts: &BTreeMap<String, u64>) {
    for (label, count) in counts {
        rows.push((format!("{prefix}:{label}"), *count as f64));
    }
}

fn write_text(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &str,
    owner: &str,
) -> Result<(), XlsxError> {
    sheet.write_string(row, col, cell_text(value, owner))?;
    Ok(())
}

/// Cut `value` to [`MAX_CELL_CHARS`] at a char boundary. `owner` names the row in the log.
pub fn cell_text<'a>(value: &'a str, owner: &str) -> &'a str {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((at, _)) => {
            warn!(
                record = owner,
                chars = value.chars().count(),
                limit = MAX_CELL_CHARS,
                "cell text truncated to the xlsx limit"
            );
            &value[..at]
        }
        None => value,
    }
}

fn reform_cell(r: &ScoredRecommendation) -> String {
    if r.institutional_reform_tags.is_empty() {
        "None".to_string()
    } else {
        r.institutional_reform_tags
            .iter()
            .map(|t| t.label())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

fn title_case(s: &str) -> String {
    if s.trim().is_empty() {
        return "Unknown".to_string();
    }
    s.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Strip characters Excel rejects in sheet names and cut to 31 characters.
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c => c,
        })
        .collect();
    let cut: String = cleaned.trim().chars().take(MAX_SHEET_NAME).collect();
    let cut = trim_sheet_edges(&cut).to_string();
    if cut.is_empty() || cut.eq_ignore_ascii_case("history") {
        format!("Sheet {cut}").trim().to_string()
    } else {
        cut
    }
}

/// Excel rejects names that start or end with an apostrophe.
fn trim_sheet_edges(name: &str) -> &str {
    name.trim_matches(|c: char| c == '\'' || c.is_whitespace())
}

/// Hands out sanitized sheet names, suffixing repeats. Excel compares names case-insensitively.
#[derive(Debug, Default)]
struct SheetNames {
    taken: BTreeSet<String>,
}

impl SheetNames {
    fn claim(&mut self, wanted: &str) -> String {
        let base = sanitize_sheet_name(wanted);
        let mut candidate = base.clone();
        let mut n = 2;
        while self.taken.contains(&candidate.to_lowercase()) {
            let suffix = format!(" ({n})");
            let room = MAX_SHEET_NAME - suffix.chars().count();
            let head: String = base.chars().take(room).collect();
            candidate = format!("{}{}", trim_sheet_edges(&head), suffix);
            n += 1;
        }
        self.taken.insert(candidate.to_lowercase());
        candidate
    }
}

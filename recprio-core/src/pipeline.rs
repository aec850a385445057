//! Core prioritize and extract pipelines, extracted from the CLI.
//!
//! These entry points are I/O-agnostic for reads of the record table and for every artifact
//! write: both go through the port traits.

use crate::ports::{RecordSource, WritePort};
use crate::settings::{ExtractSettings, PrioritizeSettings};
use anyhow::Context;
use camino::Utf8Path;
use chrono::{SecondsFormat, Utc};
use recprio_domain::scoring::classify_category;
use recprio_domain::{Anomaly, AnomalyKind, Prioritizer, RuleError, Ruleset};
use recprio_render::{render_memo_md, render_summary_md};
use recprio_types::record::RawRecommendation;
use recprio_types::report::{
    ReportArtifacts, ReportCounts, ReportFinding, ReportInputs, ReportRunInfo, ReportSeverity,
    ReportStatus, ReportToolInfo, ReportVerdict, RunReport,
};
use recprio_types::scored::ScoredDataset;
use recprio_types::summary::PrioritizationSummary;
use recprio_workbook::{WORKBOOK_FILE_NAME, render_workbook};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

pub const SCORED_FILE_NAME: &str = "scored.json";
pub const SUMMARY_FILE_NAME: &str = "summary.json";
pub const REPORT_FILE_NAME: &str = "report.json";
pub const SUMMARY_MD_FILE_NAME: &str = "summary.md";
pub const MEMO_FILE_NAME: &str = "memo.md";

/// Finding code for a workbook that could not be rendered.
pub const WORKBOOK_FAILED_CODE: &str = "artifact.workbook_failed";

/// Error type for pipeline results. Exit code 2 = configuration error, 1 = tool error.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("invalid rule tables: {0}")]
    InvalidRules(#[from] RuleError),
    #[error("invalid configuration: {0:#}")]
    Config(anyhow::Error),
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ToolError::InvalidRules(_) | ToolError::Config(_) => 2,
            ToolError::Internal(_) => 1,
        }
    }
}

/// Outcome of `run_prioritize`.
#[derive(Debug, Clone)]
pub struct PrioritizeOutcome {
    pub dataset: ScoredDataset,
    pub summary: PrioritizationSummary,
    pub anomalies: Vec<Anomaly>,
    pub report: RunReport,
}

/// Run the prioritize pipeline. Returns the scored dataset, its summary and the run report.
///
/// The caller is responsible for writing artifacts (via `WritePort`) or the convenience
/// `write_prioritize_artifacts` helper.
pub fn run_prioritize(
    settings: &PrioritizeSettings,
    source: &dyn RecordSource,
    tool: ReportToolInfo,
) -> Result<PrioritizeOutcome, ToolError> {
    let started_at = Utc::now();

    let rules = Ruleset::compile(&settings.rules)?;
    debug!(fingerprint = rules.fingerprint(), "compiled rule tables");

    let entries = source.load_records().context("load record table")?;
    let prioritizer = Prioritizer::new(rules, settings.prioritizer.clone());
    let result = prioritizer.prioritize(&entries);

    let ended_at = Utc::now();
    let run = ReportRunInfo {
        started_at: started_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        ended_at: Some(ended_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
        duration_ms: u64::try_from((ended_at - started_at).num_milliseconds()).ok(),
    };

    let report = report_from_run(
        settings,
        tool,
        run,
        &result.dataset,
        &result.summary,
        &result.anomalies,
        result.records_read,
    );

    Ok(PrioritizeOutcome {
        dataset: result.dataset,
        summary: result.summary,
        anomalies: result.anomalies,
        report,
    })
}

fn severity(kind: AnomalyKind) -> ReportSeverity {
    match kind {
        AnomalyKind::RecordRejected => ReportSeverity::Warn,
        AnomalyKind::NoiseDropped
        | AnomalyKind::DuplicateRemoved
        | AnomalyKind::MissingField
        | AnomalyKind::InvalidHint => ReportSeverity::Info,
    }
}

fn report_from_run(
    settings: &PrioritizeSettings,
    tool: ReportToolInfo,
    run: ReportRunInfo,
    dataset: &ScoredDataset,
    summary: &PrioritizationSummary,
    anomalies: &[Anomaly],
    records_read: usize,
) -> RunReport {
    let mut counts = ReportCounts::default();
    let mut by_kind: BTreeMap<AnomalyKind, u64> = BTreeMap::new();
    let findings: Vec<ReportFinding> = anomalies
        .iter()
        .map(|a| {
            let sev = severity(a.kind);
            match sev {
                ReportSeverity::Info => counts.info += 1,
                ReportSeverity::Warn => counts.warn += 1,
                ReportSeverity::Error => counts.error += 1,
            }
            *by_kind.entry(a.kind).or_default() += 1;
            ReportFinding {
                severity: sev,
                code: a.kind.code().to_string(),
                message: a.message.clone(),
                index: Some(a.index),
                record_id: a.record_id.clone(),
            }
        })
        .collect();

    let status = if anomalies.is_empty() {
        ReportStatus::Pass
    } else {
        ReportStatus::Warn
    };
    let reasons = by_kind
        .into_iter()
        .map(|(kind, n)| format!("{}: {}", kind.code(), n))
        .collect();

    RunReport {
        schema: recprio_types::schema::RECPRIO_REPORT_V1.to_string(),
        tool,
        run,
        verdict: ReportVerdict {
            status,
            counts,
            reasons,
        },
        findings,
        inputs: Some(ReportInputs {
            available: vec![settings.input.to_string()],
            partial: anomalies
                .iter()
                .any(|a| a.kind == AnomalyKind::RecordRejected),
            records_read: records_read as u64,
            records_scored: dataset.records.len() as u64,
        }),
        artifacts: Some(ReportArtifacts {
            scored: Some(SCORED_FILE_NAME.to_string()),
            summary: Some(SUMMARY_FILE_NAME.to_string()),
            markdown: Some(SUMMARY_MD_FILE_NAME.to_string()),
            memo: settings.write_memo.then(|| MEMO_FILE_NAME.to_string()),
            workbook: settings
                .write_workbook
                .then(|| WORKBOOK_FILE_NAME.to_string()),
        }),
        data: Some(serde_json::json!({
            "rules_fingerprint": dataset.rules_fingerprint,
            "quick_wins": summary.quick_wins,
            "high_priority": summary.high_priority,
            "institutional_reforms": summary.institutional_reforms,
            "fiscally_optimal": summary.fiscally_optimal,
            "avg_roi": summary.averages.roi,
        })),
    }
}

/// A failed workbook drops its artifact pointer and downgrades a passing verdict to warn.
fn note_workbook_failure(report: &mut RunReport, message: &str) {
    report.findings.push(ReportFinding {
        severity: ReportSeverity::Error,
        code: WORKBOOK_FAILED_CODE.to_string(),
        message: format!("render workbook: {message}"),
        index: None,
        record_id: None,
    });
    report.verdict.counts.error += 1;
    report
        .verdict
        .reasons
        .push(format!("{WORKBOOK_FAILED_CODE}: 1"));
    if report.verdict.status == ReportStatus::Pass {
        report.verdict.status = ReportStatus::Warn;
    }
    if let Some(artifacts) = report.artifacts.as_mut() {
        artifacts.workbook = None;
    }
}

fn write_json<T: serde::Serialize>(
    writer: &dyn WritePort,
    path: &Utf8Path,
    value: &T,
    what: &str,
) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).with_context(|| format!("serialize {what}"))?;
    writer.write_file(path, json.as_bytes())
}

/// Write all prioritize artifacts to `settings.out_dir`.
pub fn write_prioritize_artifacts(
    outcome: &PrioritizeOutcome,
    settings: &PrioritizeSettings,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    let out_dir = &settings.out_dir;
    writer.create_dir_all(out_dir)?;

    write_json(
        writer,
        &out_dir.join(SCORED_FILE_NAME),
        &outcome.dataset,
        "scored dataset",
    )?;
    write_json(
        writer,
        &out_dir.join(SUMMARY_FILE_NAME),
        &outcome.summary,
        "summary",
    )?;

    let summary_md = render_summary_md(&outcome.dataset, &outcome.summary);
    writer.write_file(&out_dir.join(SUMMARY_MD_FILE_NAME), summary_md.as_bytes())?;

    if settings.write_memo {
        let memo = render_memo_md(&outcome.dataset, &outcome.summary, &settings.memo);
        writer.write_file(&out_dir.join(MEMO_FILE_NAME), memo.as_bytes())?;
    }

    let mut report = outcome.report.clone();
    if settings.write_workbook {
        match render_workbook(&outcome.dataset, &outcome.summary, &settings.workbook) {
            Ok(bytes) => writer.write_file(&out_dir.join(WORKBOOK_FILE_NAME), &bytes)?,
            Err(e) => {
                warn!(error = %e, "workbook not written");
                note_workbook_failure(&mut report, &e.to_string());
            }
        }
    }

    write_json(writer, &out_dir.join(REPORT_FILE_NAME), &report, "report")?;

    info!(
        out_dir = %out_dir,
        records = outcome.dataset.records.len(),
        "wrote prioritize artifacts"
    );
    Ok(())
}

/// Outcome of `run_extract`.
#[derive(Debug, Clone)]
pub struct ExtractOutcome {
    pub records: Vec<RawRecommendation>,
    pub reports_scanned: usize,
}

/// Segment every report under `settings.text_dir` into raw records with a classified category.
pub fn run_extract(settings: &ExtractSettings) -> Result<ExtractOutcome, ToolError> {
    let rules = Ruleset::compile(&settings.rules)?;
    let reports = recprio_records::extract_dir(&settings.text_dir)
        .with_context(|| format!("extract reports under {}", settings.text_dir))?;

    let reports_scanned = reports.len();
    let records: Vec<RawRecommendation> = reports
        .into_iter()
        .flat_map(|r| r.records)
        .map(|mut rec| {
            let category = classify_category(&rules, &rec.recommendation.to_lowercase());
            rec.category = Some(category.label().to_string());
            rec
        })
        .collect();

    info!(
        reports = reports_scanned,
        records = records.len(),
        "extraction complete"
    );
    Ok(ExtractOutcome {
        records,
        reports_scanned,
    })
}

/// Write the extracted table to `settings.out` as a JSON array.
pub fn write_extract_artifacts(
    outcome: &ExtractOutcome,
    settings: &ExtractSettings,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    if let Some(parent) = settings.out.parent()
        && !parent.as_str().is_empty()
    {
        writer.create_dir_all(parent)?;
    }
    write_json(writer, &settings.out, &outcome.records, "extracted records")
}

mod config;
mod explain;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use config::{ConfigMerger, PrioritizeOverrides, RecprioConfig};
use recprio_core::adapters::{FsRecordSource, FsWritePort};
use recprio_core::{
    ToolError, run_extract, run_prioritize, write_extract_artifacts, write_prioritize_artifacts,
};
use recprio_types::report::ReportToolInfo;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "recprio",
    version,
    about = "Rule-based scoring and prioritization of budget-review recommendations."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score, tier and rank a recommendation table, then write the artifacts.
    Prioritize(PrioritizeArgs),
    /// Segment a tree of report text files into a raw recommendation table.
    Extract(ExtractArgs),
    /// Explain how a score, tier or overlay is computed.
    Explain(ExplainArgs),
    /// List all scoring rules.
    ListRules(ListRulesArgs),
}

#[derive(Debug, Parser)]
struct PrioritizeArgs {
    /// Recommendation table (default: data/recommendations.json).
    #[arg(long)]
    input: Option<Utf8PathBuf>,

    /// Output directory for recprio artifacts (default: artifacts/recprio).
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,

    /// Config file (default: ./recprio.toml when present).
    #[arg(long)]
    config: Option<Utf8PathBuf>,

    /// Similarity above which a record is dropped as a near-duplicate, in (0, 1].
    #[arg(long)]
    dedup_threshold: Option<f64>,

    /// First year listed on the workbook's Recent sheet (default: newest year minus 2).
    #[arg(long)]
    recent_since: Option<i32>,

    /// Skip the xlsx workbook.
    #[arg(long, default_value_t = false)]
    no_workbook: bool,

    /// Skip the policy memo.
    #[arg(long, default_value_t = false)]
    no_memo: bool,
}

#[derive(Debug, Parser)]
struct ExtractArgs {
    /// Directory of `<sector>/<report>.txt` files.
    #[arg(long)]
    text_dir: Utf8PathBuf,

    /// Output table (default: data/recommendations.json).
    #[arg(long)]
    out: Option<Utf8PathBuf>,

    /// Config file (default: ./recprio.toml when present).
    #[arg(long)]
    config: Option<Utf8PathBuf>,
}

#[derive(Debug, Parser)]
struct ExplainArgs {
    /// Rule key or field name to explain (e.g., "quick-win", "roi_score").
    rule_key: String,
}

#[derive(Debug, Parser)]
struct ListRulesArgs {
    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        error!("{}", e);
        return ExitCode::from(e.exit_code());
    }
    ExitCode::from(0)
}

fn real_main() -> Result<(), ToolError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Prioritize(args) => cmd_prioritize(args),
        Command::Extract(args) => cmd_extract(args),
        Command::Explain(args) => cmd_explain(args).map_err(ToolError::Internal),
        Command::ListRules(args) => cmd_list_rules(args).map_err(ToolError::Internal),
    }
}

/// An explicit `--config` must exist; otherwise `recprio.toml` in the working directory is used
/// when present.
fn load_file_config(explicit: Option<&Utf8Path>) -> Result<RecprioConfig, ToolError> {
    let loaded = match explicit {
        Some(path) => config::load_config(path),
        None => config::load_or_default(Utf8Path::new(".")),
    };
    loaded
        .context("load recprio.toml config")
        .map_err(ToolError::Config)
}

fn cmd_prioritize(args: PrioritizeArgs) -> Result<(), ToolError> {
    let file_config = load_file_config(args.config.as_deref())?;
    let overrides = PrioritizeOverrides {
        input: args.input,
        out_dir: args.out_dir,
        dedup_threshold: args.dedup_threshold,
        recent_since: args.recent_since,
        no_workbook: args.no_workbook,
        no_memo: args.no_memo,
    };
    let settings = ConfigMerger::new(file_config)
        .merge_prioritize_args(&overrides)
        .map_err(ToolError::Config)?;
    debug!(
        input = %settings.input,
        out_dir = %settings.out_dir,
        dedup_threshold = settings.prioritizer.normalize.dedup_threshold,
        workbook = settings.write_workbook,
        memo = settings.write_memo,
        "merged config"
    );

    let source = FsRecordSource::new(settings.input.clone());
    let outcome = run_prioritize(&settings, &source, tool_info())?;
    write_prioritize_artifacts(&outcome, &settings, &FsWritePort)?;

    let s = &outcome.summary;
    println!(
        "scored {} recommendations: {} quick wins, {} high priority, {} institutional reforms, {} fiscally optimal ({} anomalies)",
        s.total_recommendations,
        s.quick_wins,
        s.high_priority,
        s.institutional_reforms,
        s.fiscally_optimal,
        outcome.anomalies.len()
    );
    info!("wrote prioritize artifacts to {}", settings.out_dir);
    Ok(())
}

fn cmd_extract(args: ExtractArgs) -> Result<(), ToolError> {
    let file_config = load_file_config(args.config.as_deref())?;
    let settings = ConfigMerger::new(file_config).merge_extract_args(args.text_dir, args.out);

    let outcome = run_extract(&settings)?;
    write_extract_artifacts(&outcome, &settings, &FsWritePort)?;

    println!(
        "extracted {} recommendations from {} reports into {}",
        outcome.records.len(),
        outcome.reports_scanned,
        settings.out
    );
    Ok(())
}

fn tool_info() -> ReportToolInfo {
    ReportToolInfo {
        name: "recprio".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

fn cmd_explain(args: ExplainArgs) -> anyhow::Result<()> {
    use explain::{format_rule_kind, list_rule_keys, lookup_rule};

    let Some(rule) = lookup_rule(&args.rule_key) else {
        let available = list_rule_keys().join(", ");
        anyhow::bail!(
            "Unknown rule key: '{}'\n\nAvailable rules: {}",
            args.rule_key,
            available
        );
    };

    println!("================================================================================");
    println!("RULE: {}", rule.title);
    println!("================================================================================");
    println!();
    println!("Key:     {}", rule.key);
    println!("Field:   {}", rule.rule_id);
    println!("Kind:    {}", format_rule_kind(rule.kind));
    println!();

    println!("DESCRIPTION");
    println!("--------------------------------------------------------------------------------");
    println!("{}", rule.description);
    println!();

    println!("CONFIGURATION");
    println!("--------------------------------------------------------------------------------");
    if rule.config_sections.is_empty() {
        println!("Not configurable.");
    } else {
        println!("Tuned in recprio.toml under:");
        println!();
        for section in rule.config_sections {
            println!("  - {}", section);
        }
    }
    println!();

    Ok(())
}

fn cmd_list_rules(args: ListRulesArgs) -> anyhow::Result<()> {
    use explain::{RULE_REGISTRY, format_rule_kind};

    match args.format {
        OutputFormat::Text => {
            println!("Available rules:\n");
            println!("  {:<22} {:<10} TITLE", "KEY", "KIND");
            println!("  {:<22} {:<10} -----", "---", "----");
            for rule in RULE_REGISTRY.iter() {
                println!(
                    "  {:<22} {:<10} {}",
                    rule.key,
                    format_rule_kind(rule.kind),
                    rule.title
                );
            }
            println!();
            println!("Use 'recprio explain <key>' for details.");
        }
        OutputFormat::Json => {
            let rules: Vec<_> = RULE_REGISTRY
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "key": r.key,
                        "rule_id": r.rule_id,
                        "title": r.title,
                        "kind": format_rule_kind(r.kind).to_lowercase(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rules)?);
        }
    }
    Ok(())
}

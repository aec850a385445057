//! Configuration file loading for recprio.
//!
//! Discovers and loads `recprio.toml` from the working directory.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use recprio_core::{ExtractSettings, PrioritizeSettings};
use recprio_domain::{NormalizeConfig, PrioritizerConfig, RuleTables, TierThresholds};
use recprio_render::MemoOptions;
use recprio_workbook::WorkbookOptions;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "recprio.toml";

/// Top-level configuration from recprio.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecprioConfig {
    /// Input, output and normalization settings.
    pub pipeline: PipelineConfig,

    /// Which optional artifacts to write.
    pub output: OutputConfig,

    /// Rule table overrides. Omitted tables keep their built-in values.
    pub rules: RuleTables,

    /// Tier cut-offs.
    pub tiers: TierThresholds,
}

/// Pipeline section of the config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Record table to prioritize.
    pub input: Option<Utf8PathBuf>,

    /// Output directory for artifacts.
    pub out_dir: Option<Utf8PathBuf>,

    /// Text shorter than this is dropped as table debris.
    pub min_text_len: Option<usize>,

    /// Text whose digit share exceeds this is dropped as table debris.
    pub max_digit_ratio: Option<f64>,

    /// Similarity above which a record counts as a near-duplicate.
    pub dedup_threshold: Option<f64>,

    /// First year listed on the workbook's Recent sheet.
    pub recent_since: Option<i32>,

    /// Rows on the Top ROI sheet.
    pub top_roi: Option<usize>,

    /// Rows on the Top Growth Priorities sheet.
    pub top_growth: Option<usize>,

    /// Quick wins listed in the memo.
    pub memo_quick_wins: Option<usize>,

    /// High priority records listed per sector in the memo.
    pub memo_per_sector: Option<usize>,
}

/// Output section of the config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub workbook: bool,
    pub memo: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            workbook: true,
            memo: true,
        }
    }
}

/// Discover the recprio.toml config file.
///
/// Searches for `recprio.toml` in `root`. Returns `None` if no config file is found.
pub fn discover_config(root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a recprio.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<RecprioConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<RecprioConfig> {
    let config: RecprioConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from `root`, or return default if not found.
pub fn load_or_default(root: &Utf8Path) -> anyhow::Result<RecprioConfig> {
    match discover_config(root) {
        Some(path) => load_config(&path),
        None => Ok(RecprioConfig::default()),
    }
}

/// Prioritize arguments that can override the config file.
#[derive(Debug, Clone, Default)]
pub struct PrioritizeOverrides {
    pub input: Option<Utf8PathBuf>,
    pub out_dir: Option<Utf8PathBuf>,
    pub dedup_threshold: Option<f64>,
    pub recent_since: Option<i32>,
    pub no_workbook: bool,
    pub no_memo: bool,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: RecprioConfig,
}

impl ConfigMerger {
    /// Create a new merger from a loaded config.
    pub fn new(config: RecprioConfig) -> Self {
        Self { config }
    }

    /// Merge with prioritize command CLI arguments.
    ///
    /// Values given on the command line win; `--no-workbook` / `--no-memo` can only switch an
    /// output off.
    pub fn merge_prioritize_args(
        self,
        cli: &PrioritizeOverrides,
    ) -> anyhow::Result<PrioritizeSettings> {
        let defaults = PrioritizeSettings::default();
        let p = self.config.pipeline;

        let base_normalize = NormalizeConfig::default();
        let normalize = NormalizeConfig {
            min_text_len: p.min_text_len.unwrap_or(base_normalize.min_text_len),
            max_digit_ratio: p.max_digit_ratio.unwrap_or(base_normalize.max_digit_ratio),
            dedup_threshold: cli
                .dedup_threshold
                .or(p.dedup_threshold)
                .unwrap_or(base_normalize.dedup_threshold),
        };
        validate_ratio("dedup_threshold", normalize.dedup_threshold)?;
        validate_ratio("max_digit_ratio", normalize.max_digit_ratio)?;
        self.config.tiers.validate()?;

        let base_workbook = WorkbookOptions::default();
        let base_memo = MemoOptions::default();

        Ok(PrioritizeSettings {
            input: cli.input.clone().or(p.input).unwrap_or(defaults.input),
            out_dir: cli.out_dir.clone().or(p.out_dir).unwrap_or(defaults.out_dir),
            rules: self.config.rules,
            prioritizer: PrioritizerConfig {
                normalize,
                tiers: self.config.tiers,
            },
            write_workbook: self.config.output.workbook && !cli.no_workbook,
            write_memo: self.config.output.memo && !cli.no_memo,
            workbook: WorkbookOptions {
                recent_since: cli.recent_since.or(p.recent_since),
                top_roi: p.top_roi.unwrap_or(base_workbook.top_roi),
                top_growth: p.top_growth.unwrap_or(base_workbook.top_growth),
            },
            memo: MemoOptions {
                quick_wins: p.memo_quick_wins.unwrap_or(base_memo.quick_wins),
                per_sector: p.memo_per_sector.unwrap_or(base_memo.per_sector),
                text_limit: base_memo.text_limit,
            },
        })
    }

    /// Merge with extract command CLI arguments. Only the rule tables come from the config.
    pub fn merge_extract_args(self, text_dir: Utf8PathBuf, out: Option<Utf8PathBuf>) -> ExtractSettings {
        let defaults = ExtractSettings::default();
        ExtractSettings {
            text_dir,
            out: out.unwrap_or(defaults.out),
            rules: self.config.rules,
        }
    }
}

fn validate_ratio(name: &str, value: f64) -> anyhow::Result<()> {
    if !(value > 0.0 && value <= 1.0) {
        anyhow::bail!("{name} must be in (0, 1], got {value}");
    }
    Ok(())
}

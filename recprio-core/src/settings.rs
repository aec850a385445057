//! Clap-free settings for the prioritize and extract pipelines.

use camino::Utf8PathBuf;
use recprio_domain::{PrioritizerConfig, RuleTables};
use recprio_render::MemoOptions;
use recprio_workbook::WorkbookOptions;

/// Settings for the prioritize pipeline.
#[derive(Debug, Clone)]
pub struct PrioritizeSettings {
    /// Record table the source reads from. Only reported, never opened here.
    pub input: Utf8PathBuf,
    pub out_dir: Utf8PathBuf,

    // Scoring
    pub rules: RuleTables,
    pub prioritizer: PrioritizerConfig,

    // Outputs
    pub write_workbook: bool,
    pub write_memo: bool,
    pub workbook: WorkbookOptions,
    pub memo: MemoOptions,
}

impl Default for PrioritizeSettings {
    fn default() -> Self {
        Self {
            input: Utf8PathBuf::from("data/recommendations.json"),
            out_dir: Utf8PathBuf::from("artifacts/recprio"),
            rules: RuleTables::default(),
            prioritizer: PrioritizerConfig::default(),
            write_workbook: true,
            write_memo: true,
            workbook: WorkbookOptions::default(),
            memo: MemoOptions::default(),
        }
    }
}

/// Settings for the extract pipeline.
#[derive(Debug, Clone)]
pub struct ExtractSettings {
    /// Root of the `<sector>/<report>.txt` tree.
    pub text_dir: Utf8PathBuf,
    pub out: Utf8PathBuf,
    /// Used to classify the category of each extracted record.
    pub rules: RuleTables,
}

impl Default for ExtractSettings {
    fn default() -> Self {
        Self {
            text_dir: Utf8PathBuf::from("data/text"),
            out: Utf8PathBuf::from("data/recommendations.json"),
            rules: RuleTables::default(),
        }
    }
}

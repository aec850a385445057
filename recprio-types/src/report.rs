use serde::{Deserialize, Serialize};

/// `report.json`: the run envelope. One finding per pipeline anomaly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub schema: String,
    pub tool: ReportToolInfo,
    pub run: ReportRunInfo,
    pub verdict: ReportVerdict,

    #[serde(default)]
    pub findings: Vec<ReportFinding>,

    /// Which inputs were read and whether any were only partly usable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<ReportInputs>,

    /// Pointers to related artifact files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<ReportArtifacts>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportToolInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRunInfo {
    pub started_at: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportVerdict {
    pub status: ReportStatus,
    pub counts: ReportCounts,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pass,
    Warn,
    Fail,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportCounts {
    pub info: u64,
    pub warn: u64,
    pub error: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportFinding {
    pub severity: ReportSeverity,
    pub code: String,
    pub message: String,

    /// Zero-based position of the offending entry in the input table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSeverity {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportInputs {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub available: Vec<String>,

    /// True if some entries could not be used.
    #[serde(default)]
    pub partial: bool,

    pub records_read: u64,
    pub records_scored: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportArtifacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scored: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workbook: Option<String>,
}

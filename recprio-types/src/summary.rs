use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `summary.json`: aggregate statistics over one scored dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrioritizationSummary {
    pub schema: String,
    pub total_recommendations: u64,
    pub quick_wins: u64,
    pub high_priority: u64,
    pub institutional_reforms: u64,
    pub fiscally_optimal: u64,
    pub averages: AverageScores,

    #[serde(default)]
    pub by_sector: BTreeMap<String, SectorStat>,
    #[serde(default)]
    pub by_year: BTreeMap<i32, u64>,
    #[serde(default)]
    pub by_category: BTreeMap<String, u64>,
    #[serde(default)]
    pub by_fiscal_tier: BTreeMap<String, u64>,
    #[serde(default)]
    pub by_binding_constraint: BTreeMap<String, u64>,
    #[serde(default)]
    pub by_political_level: BTreeMap<String, u64>,
    #[serde(default)]
    pub by_urgency: BTreeMap<String, u64>,

    /// Recurring themes, most frequent first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub themes: Vec<ThemeStat>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_barriers: Vec<CountEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_enablers: Vec<CountEntry>,
}

/// Means over the dataset, rounded to two decimals. All zero for an empty dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AverageScores {
    pub feasibility: f64,
    pub impact: f64,
    pub cost: f64,
    pub roi: f64,
    pub growth_priority: f64,
    pub fiscal_priority: f64,
    pub political_feasibility: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectorStat {
    pub count: u64,
    pub quick_wins: u64,
    pub high_priority: u64,
    pub avg_roi: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeStat {
    pub theme: String,
    pub count: u64,

    /// Distinct years the theme appears in, ascending.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub years: Vec<i32>,
}

impl ThemeStat {
    /// A theme is persistent when it recurs in at least three distinct years.
    pub fn is_persistent(&self) -> bool {
        self.years.len() >= 3
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountEntry {
    pub label: String,
    pub count: u64,
}

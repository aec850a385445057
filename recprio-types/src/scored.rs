use crate::score::ScoreCard;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Thematic category of a recommendation. Declaration order is classification order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Budget/Fiscal")]
    BudgetFiscal,
    #[serde(rename = "Governance/Accountability")]
    GovernanceAccountability,
    #[serde(rename = "Capacity Building")]
    CapacityBuilding,
    #[serde(rename = "Infrastructure")]
    Infrastructure,
    #[serde(rename = "Policy/Legislation")]
    PolicyLegislation,
    #[serde(rename = "Service Delivery")]
    ServiceDelivery,
    #[serde(rename = "Institutional Reform")]
    InstitutionalReform,
    #[serde(rename = "Monitoring & Evaluation")]
    MonitoringEvaluation,
    #[serde(rename = "Other")]
    Other,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::BudgetFiscal,
        Category::GovernanceAccountability,
        Category::CapacityBuilding,
        Category::Infrastructure,
        Category::PolicyLegislation,
        Category::ServiceDelivery,
        Category::InstitutionalReform,
        Category::MonitoringEvaluation,
        Category::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::BudgetFiscal => "Budget/Fiscal",
            Category::GovernanceAccountability => "Governance/Accountability",
            Category::CapacityBuilding => "Capacity Building",
            Category::Infrastructure => "Infrastructure",
            Category::PolicyLegislation => "Policy/Legislation",
            Category::ServiceDelivery => "Service Delivery",
            Category::InstitutionalReform => "Institutional Reform",
            Category::MonitoringEvaluation => "Monitoring & Evaluation",
            Category::Other => "Other",
        }
    }

    /// Case-insensitive lookup by display label.
    pub fn from_label(label: &str) -> Option<Category> {
        let wanted = label.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(wanted))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReformTag {
    #[serde(rename = "Legislative Reform")]
    LegislativeReform,
    #[serde(rename = "Institutional Restructuring")]
    InstitutionalRestructuring,
    #[serde(rename = "Governance Reform")]
    GovernanceReform,
    #[serde(rename = "Process Reform")]
    ProcessReform,
    #[serde(rename = "Capacity Building")]
    CapacityBuilding,
    #[serde(rename = "Systems & Technology")]
    SystemsTechnology,
    #[serde(rename = "Policy Framework")]
    PolicyFramework,
}

impl ReformTag {
    pub const ALL: [ReformTag; 7] = [
        ReformTag::LegislativeReform,
        ReformTag::InstitutionalRestructuring,
        ReformTag::GovernanceReform,
        ReformTag::ProcessReform,
        ReformTag::CapacityBuilding,
        ReformTag::SystemsTechnology,
        ReformTag::PolicyFramework,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ReformTag::LegislativeReform => "Legislative Reform",
            ReformTag::InstitutionalRestructuring => "Institutional Restructuring",
            ReformTag::GovernanceReform => "Governance Reform",
            ReformTag::ProcessReform => "Process Reform",
            ReformTag::CapacityBuilding => "Capacity Building",
            ReformTag::SystemsTechnology => "Systems & Technology",
            ReformTag::PolicyFramework => "Policy Framework",
        }
    }
}

/// Priority tier membership. A record may carry any combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierTag {
    QuickWin,
    HighPriority,
    InstitutionalReform,
    FiscallyOptimal,
}

impl TierTag {
    pub fn key(self) -> &'static str {
        match self {
            TierTag::QuickWin => "quick_win",
            TierTag::HighPriority => "high_priority",
            TierTag::InstitutionalReform => "institutional_reform",
            TierTag::FiscallyOptimal => "fiscally_optimal",
        }
    }
}

/// Implementation horizon given fiscal feasibility and impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FiscalTier {
    #[serde(rename = "tier_1_immediate")]
    Immediate,
    #[serde(rename = "tier_2_near_term")]
    NearTerm,
    #[serde(rename = "tier_3_medium_term")]
    MediumTerm,
    #[serde(rename = "tier_4_phased")]
    Phased,
    #[serde(rename = "tier_5_future")]
    Future,
}

impl FiscalTier {
    pub const ALL: [FiscalTier; 5] = [
        FiscalTier::Immediate,
        FiscalTier::NearTerm,
        FiscalTier::MediumTerm,
        FiscalTier::Phased,
        FiscalTier::Future,
    ];

    pub fn number(self) -> u8 {
        match self {
            FiscalTier::Immediate => 1,
            FiscalTier::NearTerm => 2,
            FiscalTier::MediumTerm => 3,
            FiscalTier::Phased => 4,
            FiscalTier::Future => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FiscalTier::Immediate => "Tier 1: Immediate (Fiscally Neutral, High Impact)",
            FiscalTier::NearTerm => "Tier 2: Near-Term (Low Cost, High Impact)",
            FiscalTier::MediumTerm => "Tier 3: Medium-Term (Low Cost, Moderate Impact)",
            FiscalTier::Phased => "Tier 4: Phased (Moderate Cost - requires business case)",
            FiscalTier::Future => "Tier 5: Future (High Cost - awaiting fiscal space)",
        }
    }
}

/// Primary growth bottleneck a recommendation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingConstraint {
    Energy,
    LogisticsPortsRail,
    WaterSanitation,
    PermitsLicenses,
    SkillsVisas,
    MunicipalCollapse,
    CrimeCorruption,
    CompetitionEntry,
    DigitalConnectivity,
    Other,
}

impl BindingConstraint {
    pub fn key(self) -> &'static str {
        match self {
            BindingConstraint::Energy => "energy",
            BindingConstraint::LogisticsPortsRail => "logistics_ports_rail",
            BindingConstraint::WaterSanitation => "water_sanitation",
            BindingConstraint::PermitsLicenses => "permits_licenses",
            BindingConstraint::SkillsVisas => "skills_visas",
            BindingConstraint::MunicipalCollapse => "municipal_collapse",
            BindingConstraint::CrimeCorruption => "crime_corruption",
            BindingConstraint::CompetitionEntry => "competition_entry",
            BindingConstraint::DigitalConnectivity => "digital_connectivity",
            BindingConstraint::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeasibilityLevel {
    High,
    Medium,
    Low,
    VeryLow,
}

impl FeasibilityLevel {
    pub fn from_score(total: f64) -> Self {
        if total >= 0.7 {
            FeasibilityLevel::High
        } else if total >= 0.5 {
            FeasibilityLevel::Medium
        } else if total >= 0.3 {
            FeasibilityLevel::Low
        } else {
            FeasibilityLevel::VeryLow
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            FeasibilityLevel::High => "HIGH",
            FeasibilityLevel::Medium => "MEDIUM",
            FeasibilityLevel::Low => "LOW",
            FeasibilityLevel::VeryLow => "VERY_LOW",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    High,
    Medium,
    Low,
}

impl Urgency {
    pub fn key(self) -> &'static str {
        match self {
            Urgency::High => "high",
            Urgency::Medium => "medium",
            Urgency::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn key(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FiscalImpact {
    Savings,
    #[default]
    Neutral,
    LowCost,
    CapexHeavy,
}

impl FiscalImpact {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "savings" => Some(FiscalImpact::Savings),
            "neutral" => Some(FiscalImpact::Neutral),
            "low_cost" => Some(FiscalImpact::LowCost),
            "capex_heavy" => Some(FiscalImpact::CapexHeavy),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceConfidence {
    High,
    #[default]
    Medium,
    Low,
}

impl EvidenceConfidence {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Some(EvidenceConfidence::High),
            "medium" => Some(EvidenceConfidence::Medium),
            "low" => Some(EvidenceConfidence::Low),
            _ => None,
        }
    }
}

/// Fiscal-space overlay: how a recommendation sits against current budget constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiscalOverlay {
    /// 1 (needs new money) to 4 (fiscally neutral).
    pub fiscal_feasibility: u8,
    pub fiscal_tier: FiscalTier,
    pub fiscal_priority_score: f64,

    /// Matched MTBPS priority areas, at most two. Empty means general reform.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mtbps_alignment: Vec<String>,
}

impl FiscalOverlay {
    pub fn is_aligned(&self) -> bool {
        !self.mtbps_alignment.is_empty()
    }

    pub fn alignment_label(&self) -> String {
        if self.mtbps_alignment.is_empty() {
            "General Reform".to_string()
        } else {
            self.mtbps_alignment.join(", ")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthOverlay {
    pub binding_constraint: BindingConstraint,
    pub growth_elasticity: u8,
    pub fiscal_impact: FiscalImpact,
    pub evidence_confidence: EvidenceConfidence,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocker_type: Option<String>,

    pub growth_priority_score: f64,
}

/// The seven political-economy factors, each in `[0, 1]`. Higher is more feasible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoliticalFactors {
    pub executive_alignment: f64,
    pub legislative_complexity: f64,
    pub coordination_complexity: f64,
    pub stakeholder_opposition: f64,
    pub public_support: f64,
    pub fiscal_implications: f64,
    pub time_horizon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoliticalAssessment {
    pub total_score: f64,
    pub level: FeasibilityLevel,
    pub factors: PoliticalFactors,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub barriers: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enablers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordSignals {
    pub urgency: Urgency,
    pub urgency_count: u32,
    pub sentiment: Sentiment,
    pub sentiment_score: f64,
}

/// Amounts and time references quoted in the text, in order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextFacts {
    /// Rand amounts with their unit applied, rounded to cents.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub monetary_values: Vec<f64>,

    /// Financial years, years, durations and deadline words, each listed once.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub timeframes: Vec<String>,
}

impl TextFacts {
    pub fn largest_amount(&self) -> Option<f64> {
        self.monetary_values.iter().copied().reduce(f64::max)
    }
}

/// A fully scored recommendation. Built once per run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecommendation {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    pub sector: String,
    pub report: String,
    pub text: String,
    pub category: Category,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub institutional_reform_tags: BTreeSet<ReformTag>,

    pub scores: ScoreCard,

    #[serde(default)]
    pub tiers: BTreeSet<TierTag>,

    pub fiscal: FiscalOverlay,
    pub growth: GrowthOverlay,
    pub political: PoliticalAssessment,
    pub signals: KeywordSignals,

    #[serde(default)]
    pub facts: TextFacts,
}

impl ScoredRecommendation {
    pub fn is_quick_win(&self) -> bool {
        self.tiers.contains(&TierTag::QuickWin)
    }

    pub fn is_high_priority(&self) -> bool {
        self.tiers.contains(&TierTag::HighPriority)
    }

    pub fn is_institutional_reform(&self) -> bool {
        self.tiers.contains(&TierTag::InstitutionalReform)
    }

    pub fn is_fiscally_optimal(&self) -> bool {
        self.tiers.contains(&TierTag::FiscallyOptimal)
    }
}

/// `scored.json` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDataset {
    pub schema: String,

    /// SHA-256 of the canonical rule tables the records were scored with.
    pub rules_fingerprint: String,

    #[serde(default)]
    pub records: Vec<ScoredRecommendation>,
}

/// Sort `records` by `key` descending, ties broken by id ascending.
///
/// Every ranked listing (memo, workbook sheets) goes through here so that equal keys never
/// depend on input order.
pub fn ranked_by<'a>(
    records: impl IntoIterator<Item = &'a ScoredRecommendation>,
    key: impl Fn(&ScoredRecommendation) -> f64,
) -> Vec<&'a ScoredRecommendation> {
    let mut out: Vec<&ScoredRecommendation> = records.into_iter().collect();
    out.sort_by(|a, b| key(b).total_cmp(&key(a)).then_with(|| a.id.cmp(&b.id)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_round_trip_through_serde() {
        for c in Category::ALL {
            let json = serde_json::to_string(&c).expect("ser");
            assert_eq!(json, format!("\"{}\"", c.label()));
            assert_eq!(Category::from_label(c.label()), Some(c));
        }
    }

    #[test]
    fn from_label_is_case_insensitive() {
        assert_eq!(
            Category::from_label("  budget/fiscal "),
            Some(Category::BudgetFiscal)
        );
        assert_eq!(Category::from_label("Agriculture"), None);
    }

    #[test]
    fn feasibility_level_thresholds() {
        assert_eq!(FeasibilityLevel::from_score(0.7), FeasibilityLevel::High);
        assert_eq!(FeasibilityLevel::from_score(0.69), FeasibilityLevel::Medium);
        assert_eq!(FeasibilityLevel::from_score(0.3), FeasibilityLevel::Low);
        assert_eq!(FeasibilityLevel::from_score(0.29), FeasibilityLevel::VeryLow);
    }

    #[test]
    fn tier_tags_serialize_snake_case() {
        let tags: BTreeSet<TierTag> = [TierTag::FiscallyOptimal, TierTag::QuickWin]
            .into_iter()
            .collect();
        assert_eq!(
            serde_json::to_string(&tags).expect("ser"),
            r#"["quick_win","fiscally_optimal"]"#
        );
    }

    #[test]
    fn hint_parsers_reject_unknown_values() {
        assert_eq!(FiscalImpact::parse("CAPEX_HEAVY"), Some(FiscalImpact::CapexHeavy));
        assert_eq!(FiscalImpact::parse("cheap"), None);
        assert_eq!(EvidenceConfidence::parse("Low"), Some(EvidenceConfidence::Low));
    }
}

//! Keyword and pattern tables that drive every score, tag and overlay.
//!
//! [`RuleTables`] is plain configuration: serde-friendly, `Default` is the built-in set, and any
//! subset can be overridden from `recprio.toml`. [`Ruleset::compile`] validates it, lowercases
//! keywords, compiles the regex tables once, and fingerprints the result.

use recprio_types::scored::{BindingConstraint, Category, ReformTag};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Case-insensitive substring test against already-lowercased text.
pub(crate) fn contains_any(text_lower: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| text_lower.contains(k.as_str()))
}

pub(crate) fn count_matches(text_lower: &str, keywords: &[String]) -> usize {
    keywords
        .iter()
        .filter(|k| text_lower.contains(k.as_str()))
        .count()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordGroup {
    pub score: u8,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: Category,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReformRule {
    pub tag: ReformTag,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintRule {
    pub constraint: BindingConstraint,
    pub elasticity: u8,
    pub keywords: Vec<String>,
}

/// A named keyword list: MTBPS areas, executive priority areas, recurring themes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaRule {
    pub name: String,
    pub keywords: Vec<String>,
}

impl AreaRule {
    fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: words(keywords),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeasibilityRules {
    /// Evaluated in order; the first group with a matching keyword wins.
    pub groups: Vec<KeywordGroup>,
    pub default: u8,
}

impl Default for FeasibilityRules {
    fn default() -> Self {
        Self {
            groups: vec![
                KeywordGroup {
                    score: 5,
                    keywords: words(&[
                        "report",
                        "submit",
                        "provide information",
                        "inform",
                        "clarify",
                        "communicate",
                        "explain",
                        "respond",
                        "update",
                        "notify",
                    ]),
                },
                KeywordGroup {
                    score: 4,
                    keywords: words(&[
                        "improve",
                        "enhance",
                        "strengthen",
                        "coordinate",
                        "collaborate",
                        "streamline",
                        "expedite",
                        "accelerate",
                        "prioritise",
                        "prioritize",
                    ]),
                },
                KeywordGroup {
                    score: 3,
                    keywords: words(&[
                        "develop",
                        "implement",
                        "establish",
                        "create",
                        "introduce",
                        "review",
                        "assess",
                        "evaluate",
                        "monitor",
                    ]),
                },
                KeywordGroup {
                    score: 2,
                    keywords: words(&[
                        "legislation",
                        "act",
                        "law",
                        "constitutional",
                        "parliament",
                        "restructure",
                        "major reform",
                        "overhaul",
                    ]),
                },
                KeywordGroup {
                    score: 1,
                    keywords: words(&[
                        "billion",
                        "r billion",
                        "significant funding",
                        "major investment",
                        "substantial resources",
                    ]),
                },
            ],
            default: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactRules {
    pub base: u8,
    /// Exact (case-insensitive) sector names that add one point.
    pub sectors: Vec<String>,
    pub high_impact: Vec<String>,
    pub broad_reach: Vec<String>,
    pub sme: Vec<String>,
}

impl Default for ImpactRules {
    fn default() -> Self {
        Self {
            base: 3,
            sectors: words(&["energy", "finance", "labour"]),
            high_impact: words(&[
                "unemployment",
                "job creation",
                "employment",
                "economic growth",
                "gdp",
                "investment",
                "energy crisis",
                "load shedding",
                "loadshedding",
                "poverty",
                "inequality",
                "service delivery",
                "corruption",
                "fiscal",
                "revenue",
                "tax",
                "budget deficit",
            ]),
            broad_reach: words(&[
                "all",
                "national",
                "country-wide",
                "population",
                "citizens",
                "businesses",
                "economy",
                "sector-wide",
            ]),
            sme: words(&["sme", "small business", "informal sector"]),
        }
    }
}

/// Cost score for a stated amount in millions: the first band whose `above` is exceeded wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountBand {
    pub above: u64,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostRules {
    pub billion_pattern: String,
    pub billion_score: u8,
    /// Must capture the amount in group 1.
    pub million_pattern: String,
    pub million_bands: Vec<AmountBand>,
    pub million_floor: u8,
    /// Activity groups in evaluation order.
    pub activities: Vec<KeywordGroup>,
    pub default: u8,
}

impl Default for CostRules {
    fn default() -> Self {
        Self {
            billion_pattern: r"\d+\s*billion".to_string(),
            billion_score: 1,
            million_pattern: r"(\d+)\s*million".to_string(),
            million_bands: vec![
                AmountBand {
                    above: 100,
                    score: 2,
                },
                AmountBand {
                    above: 10,
                    score: 3,
                },
            ],
            million_floor: 4,
            activities: vec![
                KeywordGroup {
                    score: 1,
                    keywords: words(&[
                        "construction",
                        "infrastructure",
                        "major investment",
                        "capital",
                        "build",
                        "establish new",
                        "procure",
                        "large-scale",
                    ]),
                },
                KeywordGroup {
                    score: 3,
                    keywords: words(&[
                        "system",
                        "software",
                        "technology",
                        "equipment",
                        "hiring",
                        "training programme",
                        "capacity building",
                    ]),
                },
                KeywordGroup {
                    score: 5,
                    keywords: words(&[
                        "policy",
                        "regulation",
                        "report",
                        "guideline",
                        "framework",
                        "clarification",
                        "communication",
                        "coordination",
                        "monitoring",
                    ]),
                },
            ],
            default: 3,
        }
    }
}

fn default_categories() -> Vec<CategoryRule> {
    let rule = |category, keywords: &[&str]| CategoryRule {
        category,
        keywords: words(keywords),
    };
    vec![
        rule(
            Category::BudgetFiscal,
            &[
                "budget",
                "fiscal",
                "funding",
                "appropriation",
                "allocation",
                "expenditure",
                "revenue",
            ],
        ),
        rule(
            Category::GovernanceAccountability,
            &[
                "accountability",
                "governance",
                "oversight",
                "compliance",
                "audit",
                "reporting",
                "transparency",
            ],
        ),
        rule(
            Category::CapacityBuilding,
            &[
                "capacity",
                "skills",
                "training",
                "development",
                "human resources",
                "staffing",
            ],
        ),
        rule(
            Category::Infrastructure,
            &[
                "infrastructure",
                "construction",
                "maintenance",
                "facilities",
                "equipment",
            ],
        ),
        rule(
            Category::PolicyLegislation,
            &[
                "policy",
                "legislation",
                "law",
                "regulation",
                "act",
                "bill",
                "framework",
            ],
        ),
        rule(
            Category::ServiceDelivery,
            &[
                "service delivery",
                "implementation",
                "roll-out",
                "delivery",
                "services",
            ],
        ),
        rule(
            Category::InstitutionalReform,
            &[
                "reform",
                "restructure",
                "transformation",
                "institutional",
                "reorganization",
            ],
        ),
        rule(
            Category::MonitoringEvaluation,
            &[
                "monitoring",
                "evaluation",
                "performance",
                "indicators",
                "targets",
                "metrics",
            ],
        ),
    ]
}

fn default_reforms() -> Vec<ReformRule> {
    let rule = |tag, keywords: &[&str]| ReformRule {
        tag,
        keywords: words(keywords),
    };
    vec![
        rule(
            ReformTag::LegislativeReform,
            &[
                "amend act",
                "amend legislation",
                "new law",
                "bill",
                "legislative",
            ],
        ),
        rule(
            ReformTag::InstitutionalRestructuring,
            &[
                "restructure",
                "reorganize",
                "consolidate",
                "merge",
                "establish new entity",
            ],
        ),
        rule(
            ReformTag::GovernanceReform,
            &[
                "board",
                "governance framework",
                "oversight",
                "accountability framework",
            ],
        ),
        rule(
            ReformTag::ProcessReform,
            &[
                "streamline",
                "simplify",
                "process improvement",
                "efficiency",
            ],
        ),
        rule(
            ReformTag::CapacityBuilding,
            &[
                "training",
                "skills development",
                "capacity building",
                "competency",
            ],
        ),
        rule(
            ReformTag::SystemsTechnology,
            &["system", "database", "digital", "technology", "automation"],
        ),
        rule(
            ReformTag::PolicyFramework,
            &[
                "policy",
                "framework",
                "guidelines",
                "strategy",
                "regulations",
            ],
        ),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintRules {
    /// First matching group wins.
    pub groups: Vec<ConstraintRule>,
    /// Elasticity for [`BindingConstraint::Other`].
    pub other_elasticity: u8,
}

impl Default for ConstraintRules {
    fn default() -> Self {
        let rule = |constraint, elasticity, keywords: &[&str]| ConstraintRule {
            constraint,
            elasticity,
            keywords: words(keywords),
        };
        Self {
            groups: vec![
                rule(
                    BindingConstraint::Energy,
                    5,
                    &[
                        "eskom",
                        "load shedding",
                        "loadshedding",
                        "grid",
                        "nersa",
                        "ipp",
                        "wheeling",
                    ],
                ),
                rule(
                    BindingConstraint::LogisticsPortsRail,
                    5,
                    &[
                        "transnet",
                        "rail",
                        "port",
                        "terminal",
                        "dwell",
                        "berth",
                        "container",
                    ],
                ),
                rule(
                    BindingConstraint::WaterSanitation,
                    4,
                    &[
                        "water use licence",
                        "water-use licence",
                        "waste water",
                        "sanitation",
                        "non-revenue water",
                    ],
                ),
                rule(
                    BindingConstraint::PermitsLicenses,
                    4,
                    &[
                        "permit",
                        "licence",
                        "license",
                        "authorisation",
                        "authorization",
                        "eia",
                        "development charge",
                    ],
                ),
                rule(
                    BindingConstraint::SkillsVisas,
                    4,
                    &["visa", "work permit", "critical skill", "home affairs"],
                ),
                rule(
                    BindingConstraint::MunicipalCollapse,
                    4,
                    &[
                        "municipal",
                        "equitable share",
                        "section 71",
                        "section 72",
                        "mfico",
                        "mig",
                    ],
                ),
                rule(
                    BindingConstraint::CrimeCorruption,
                    4,
                    &[
                        "irregular expenditure",
                        "fruitless",
                        "wasteful",
                        "siu",
                        "npa",
                        "forensic",
                        "procurement deviation",
                    ],
                ),
                rule(
                    BindingConstraint::CompetitionEntry,
                    3,
                    &[
                        "competition commission",
                        "market inquiry",
                        "barrier to entry",
                        "cartel",
                        "price fixing",
                    ],
                ),
                rule(
                    BindingConstraint::DigitalConnectivity,
                    3,
                    &["spectrum", "broadband", "4g", "5g", "fibre", "fiber"],
                ),
            ],
            other_elasticity: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiscalRules {
    /// Text that signals a fiscally neutral or positive measure.
    pub neutral: Vec<String>,
    /// Lifts a moderate-cost measure by one fiscal step.
    pub efficiency: Vec<String>,
    pub alignment: Vec<AreaRule>,
    pub max_alignment: usize,
    pub alignment_bonus: f64,
}

impl Default for FiscalRules {
    fn default() -> Self {
        Self {
            neutral: words(&[
                "reduce irregular",
                "reduce wasteful",
                "reduce fruitless",
                "improve collection",
                "improve compliance",
                "consequence management",
                "report",
                "monitor",
                "oversight",
                "accountability",
                "streamline",
                "simplify",
                "coordinate",
            ]),
            efficiency: words(&["efficiency", "optimization", "automation", "digitization"]),
            alignment: vec![
                AreaRule::new(
                    "Infrastructure",
                    &[
                        "infrastructure",
                        "maintenance",
                        "project management",
                        "delivery capacity",
                    ],
                ),
                AreaRule::new(
                    "Energy",
                    &[
                        "energy",
                        "electricity",
                        "generation",
                        "transmission",
                        "grid",
                        "private sector",
                    ],
                ),
                AreaRule::new(
                    "Tax Admin",
                    &["tax", "revenue", "collection", "sars", "compliance"],
                ),
                AreaRule::new(
                    "SOE Reform",
                    &[
                        "state-owned",
                        "soe",
                        "eskom",
                        "transnet",
                        "governance",
                        "operational efficiency",
                    ],
                ),
                AreaRule::new(
                    "Public Sector Efficiency",
                    &[
                        "expenditure management",
                        "budget execution",
                        "irregular expenditure",
                        "procurement",
                        "digitalization",
                        "automation",
                    ],
                ),
                AreaRule::new(
                    "Employment",
                    &[
                        "job creation",
                        "employment",
                        "unemployment",
                        "skills",
                        "training",
                    ],
                ),
            ],
            max_alignment: 2,
            alignment_bonus: 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiscalWeights {
    pub savings: f64,
    pub neutral: f64,
    pub low_cost: f64,
    pub capex_heavy: f64,
}

impl Default for FiscalWeights {
    fn default() -> Self {
        Self {
            savings: 1.0,
            neutral: 0.8,
            low_cost: 0.5,
            capex_heavy: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceWeights {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Default for EvidenceWeights {
    fn default() -> Self {
        Self {
            high: 1.0,
            medium: 0.7,
            low: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthRules {
    pub fiscal_weights: FiscalWeights,
    pub evidence_weights: EvidenceWeights,
    /// Blocker types that subtract `blocker_penalty`.
    pub penalized_blockers: Vec<String>,
    pub blocker_penalty: f64,
}

impl Default for GrowthRules {
    fn default() -> Self {
        Self {
            fiscal_weights: FiscalWeights::default(),
            evidence_weights: EvidenceWeights::default(),
            penalized_blockers: words(&["legislation", "institutional_capacity", "intergov_coord"]),
            blocker_penalty: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoliticalWeights {
    pub executive_alignment: f64,
    pub legislative_complexity: f64,
    pub coordination_complexity: f64,
    pub stakeholder_opposition: f64,
    pub public_support: f64,
    pub fiscal_implications: f64,
    pub time_horizon: f64,
}

impl PoliticalWeights {
    pub fn sum(&self) -> f64 {
        self.executive_alignment
            + self.legislative_complexity
            + self.coordination_complexity
            + self.stakeholder_opposition
            + self.public_support
            + self.fiscal_implications
            + self.time_horizon
    }
}

impl Default for PoliticalWeights {
    fn default() -> Self {
        Self {
            executive_alignment: 0.20,
            legislative_complexity: 0.15,
            coordination_complexity: 0.15,
            stakeholder_opposition: 0.15,
            public_support: 0.10,
            fiscal_implications: 0.15,
            time_horizon: 0.10,
        }
    }
}

/// Political-economy tables. Every list except `executive_priorities` and `priority_sectors`
/// holds regular expressions, matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoliticalRules {
    pub weights: PoliticalWeights,
    pub executive_priorities: Vec<AreaRule>,
    pub priority_sectors: Vec<String>,
    pub requires_legislation: Vec<String>,
    pub administrative_only: Vec<String>,
    pub inter_departmental: Vec<String>,
    pub stakeholder_opposition: Vec<String>,
    pub public_support: Vec<String>,
    pub high_cost: Vec<String>,
    pub low_cost: Vec<String>,
    pub quick_implementation: Vec<String>,
    pub long_term: Vec<String>,
}

impl Default for PoliticalRules {
    fn default() -> Self {
        Self {
            weights: PoliticalWeights::default(),
            executive_priorities: vec![
                AreaRule::new(
                    "energy",
                    &[
                        "electricity",
                        "renewable",
                        "ipp",
                        "eskom",
                        "grid",
                        "generation",
                        "transmission",
                    ],
                ),
                AreaRule::new(
                    "logistics",
                    &["port", "rail", "transnet", "freight", "logistics", "export"],
                ),
                AreaRule::new(
                    "water",
                    &["water", "sanitation", "reservoir", "dam", "municipal"],
                ),
                AreaRule::new(
                    "digital",
                    &["spectrum", "broadband", "digital", "connectivity", "5g"],
                ),
                AreaRule::new("visa", &["visa", "tourism", "immigration", "e-visa"]),
                AreaRule::new(
                    "green_economy",
                    &["green", "climate", "carbon", "renewable", "just transition"],
                ),
            ],
            priority_sectors: words(&["energy", "infrastructure", "trade", "science_tech"]),
            requires_legislation: words(&[
                r"amend(ment)?\s+(act|law|legislation|bill)",
                r"(new|draft|pass)\s+(act|law|legislation|bill)",
                r"legislative\s+(change|amendment|reform)",
                r"(repeal|enact)",
            ]),
            administrative_only: words(&[
                r"(review|improve|strengthen|enhance)\s+(process|procedure|guideline)",
                r"(develop|implement|establish)\s+(policy|guideline|framework|protocol)",
                r"(ensure|require)\s+(compliance|reporting|monitoring)",
                r"(expedite|fast.?track|accelerate)\s+approval",
            ]),
            inter_departmental: words(&[
                r"inter.?department(al)?",
                r"cross.?sector(al)?",
                r"coordinat(e|ion|ed)\s+with",
                r"collaborat(e|ion|ive)",
                r"(multiple|various)\s+(department|ministr)",
                r"whole.?of.?government",
            ]),
            stakeholder_opposition: words(&[
                r"(union|labour|organized\s+labour)",
                r"(private\s+sector|business|industry)\s+(opposition|resistance)",
                r"vested\s+interest",
                r"(monopol|cartel|oligopol)",
                r"(rent.?seek|capture|corrupt)",
                r"(tender.?preneur|politically\s+connected)",
            ]),
            public_support: words(&[
                r"(job|employment|unemploy)",
                r"(service\s+delivery|basic\s+service)",
                r"(electricity|water|sanitation|housing)",
                r"(education|health|safety)",
                r"(cost\s+of\s+living|afford)",
                r"(poverty|inequal)",
            ]),
            high_cost: words(&[
                r"R\s?\d+\s*(billion|bn)",
                r"significant\s+(invest|fund|capital)",
                r"major\s+(infrastructure|capital)",
                r"(multi.?year|long.?term)\s+fund",
            ]),
            low_cost: words(&[
                r"(no|minimal|low)\s+(cost|budget)",
                r"cost.?neutral",
                r"(administrative|regulatory)\s+(change|reform)",
                r"(already|existing)\s+(fund|budget|appropriat)",
            ]),
            quick_implementation: words(&[
                r"immediate(ly)?",
                r"(within|next)\s+\d+\s+(day|week|month)",
                r"short.?term",
                r"(expedite|fast.?track|urgent)",
            ]),
            long_term: words(&[
                r"(medium|long).?term",
                r"(multi.?year|phased)",
                r"\d+\s*year\s*(plan|program|horizon)",
                r"(structural|fundamental)\s+reform",
            ]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalRules {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    pub urgency: Vec<String>,
    pub high_urgency_at: u32,
}

impl Default for SignalRules {
    fn default() -> Self {
        Self {
            positive: words(&[
                "improve",
                "increase",
                "enhance",
                "strengthen",
                "progress",
                "achieve",
                "success",
                "effective",
                "efficient",
                "positive",
                "growth",
                "opportunity",
                "recommend",
                "support",
                "develop",
                "advance",
                "better",
                "good",
                "excellent",
                "commend",
                "encourage",
            ]),
            negative: words(&[
                "concern",
                "decline",
                "decrease",
                "fail",
                "failure",
                "inadequate",
                "insufficient",
                "poor",
                "weak",
                "underperform",
                "delay",
                "overdue",
                "irregular",
                "wasteful",
                "fruitless",
                "corrupt",
                "mismanagement",
                "crisis",
                "problem",
                "issue",
                "challenge",
                "risk",
                "threat",
                "deteriorate",
                "collapse",
                "lack",
                "shortage",
                "deficit",
                "breach",
            ]),
            urgency: words(&[
                "urgent",
                "immediate",
                "critical",
                "priority",
                "must",
                "imperative",
                "essential",
                "crucial",
                "vital",
                "serious",
                "severe",
                "grave",
                "alarming",
                "emergency",
                "expedite",
                "accelerate",
                "without delay",
                "as soon as possible",
                "forthwith",
            ]),
            high_urgency_at: 3,
        }
    }
}

fn default_themes() -> Vec<AreaRule> {
    vec![
        AreaRule::new(
            "Budget Execution & Spending",
            &[
                "underspend",
                "under-spend",
                "expenditure",
                "budget implementation",
                "spending",
            ],
        ),
        AreaRule::new(
            "Irregular/Wasteful Expenditure",
            &[
                "irregular expenditure",
                "fruitless",
                "wasteful",
                "consequence management",
            ],
        ),
        AreaRule::new(
            "Vacant Posts & HR",
            &[
                "vacant",
                "vacancies",
                "filled",
                "staffing",
                "human resources",
            ],
        ),
        AreaRule::new(
            "Energy Crisis",
            &[
                "load shedding",
                "loadshedding",
                "energy crisis",
                "electricity",
                "eskom",
            ],
        ),
        AreaRule::new(
            "SOE Governance",
            &["state-owned", "soe", "public entities", "boards"],
        ),
        AreaRule::new(
            "Unemployment & Jobs",
            &["unemployment", "job creation", "employment", "jobs"],
        ),
        AreaRule::new(
            "SME Support",
            &["sme", "small business", "smme", "entrepreneurship"],
        ),
        AreaRule::new(
            "Compliance & Reporting",
            &[
                "compliance",
                "reporting",
                "submit",
                "provide",
                "inform parliament",
            ],
        ),
        AreaRule::new(
            "Procurement",
            &["procurement", "tender", "supply chain", "scm"],
        ),
        AreaRule::new(
            "Service Delivery",
            &[
                "service delivery",
                "backlogs",
                "targets",
                "implementation",
            ],
        ),
    ]
}

/// All rule tables. Missing sections in a config file fall back to the built-in tables.
/// Patterns that pull quoted amounts and time references out of the text.
///
/// Every money pattern captures the amount in group 1 and an optional unit (billion, bn,
/// million, m, thousand, k) in group 2. Patterns run in order; a match overlapping an earlier
/// one is skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactRules {
    pub money: Vec<String>,
    pub timeframes: Vec<String>,
}

impl Default for FactRules {
    fn default() -> Self {
        Self {
            money: words(&[
                r"R\s?(\d+(?:,\d{3})*(?:\.\d+)?)\s*(billion|million|thousand|bn|m|k)?",
                r"(\d+(?:,\d{3})*(?:\.\d+)?)\s*(billion|million|thousand|bn|m|k)?\s*rand",
            ]),
            timeframes: words(&[
                r"\d{4}/\d{2,4}",
                r"20\d{2}",
                r"\d+\s*(?:day|week|month|year)s?",
                r"(?:immediate|urgent|within|by|before|after|during)",
            ]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleTables {
    pub feasibility: FeasibilityRules,
    pub impact: ImpactRules,
    pub cost: CostRules,
    pub categories: Vec<CategoryRule>,
    pub reforms: Vec<ReformRule>,
    pub constraints: ConstraintRules,
    pub fiscal: FiscalRules,
    pub growth: GrowthRules,
    pub political: PoliticalRules,
    pub signals: SignalRules,
    pub facts: FactRules,
    pub themes: Vec<AreaRule>,
}

impl Default for RuleTables {
    fn default() -> Self {
        Self {
            feasibility: FeasibilityRules::default(),
            impact: ImpactRules::default(),
            cost: CostRules::default(),
            categories: default_categories(),
            reforms: default_reforms(),
            constraints: ConstraintRules::default(),
            fiscal: FiscalRules::default(),
            growth: GrowthRules::default(),
            political: PoliticalRules::default(),
            signals: SignalRules::default(),
            facts: FactRules::default(),
            themes: default_themes(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuleError {
    #[error("invalid pattern in {table}: {pattern}: {message}")]
    InvalidPattern {
        table: String,
        pattern: String,
        message: String,
    },

    #[error("score {value} in {table} is outside 1..=5")]
    ScoreOutOfRange { table: String, value: u8 },

    #[error("{table}: {message}")]
    Invalid { table: String, message: String },

    #[error("political weights sum to {sum}, expected 1.0")]
    Weights { sum: f64 },

    #[error("fingerprint serialization failed: {message}")]
    Fingerprint { message: String },
}

#[derive(Debug, Clone)]
pub(crate) struct PoliticalPatterns {
    pub(crate) requires_legislation: Vec<Regex>,
    pub(crate) administrative_only: Vec<Regex>,
    pub(crate) inter_departmental: Vec<Regex>,
    pub(crate) stakeholder_opposition: Vec<Regex>,
    pub(crate) public_support: Vec<Regex>,
    pub(crate) high_cost: Vec<Regex>,
    pub(crate) low_cost: Vec<Regex>,
    pub(crate) quick_implementation: Vec<Regex>,
    pub(crate) long_term: Vec<Regex>,
}

#[derive(Debug, Clone)]
pub(crate) struct FactPatterns {
    pub(crate) money: Vec<Regex>,
    pub(crate) timeframes: Vec<Regex>,
}

/// Validated, compiled rule tables.
#[derive(Debug, Clone)]
pub struct Ruleset {
    tables: RuleTables,
    pub(crate) billion: Regex,
    pub(crate) million: Regex,
    pub(crate) political: PoliticalPatterns,
    pub(crate) facts: FactPatterns,
    fingerprint: String,
}

impl Ruleset {
    pub fn compile(tables: &RuleTables) -> Result<Self, RuleError> {
        let tables = lowercased(tables.clone());
        validate(&tables)?;

        let billion = compile_one("cost.billion_pattern", &tables.cost.billion_pattern)?;
        let million = compile_one("cost.million_pattern", &tables.cost.million_pattern)?;
        if million.captures_len() < 2 {
            return Err(RuleError::Invalid {
                table: "cost.million_pattern".to_string(),
                message: "pattern must capture the amount in group 1".to_string(),
            });
        }

        let p = &tables.political;
        let political = PoliticalPatterns {
            requires_legislation: compile_all(
                "political.requires_legislation",
                &p.requires_legislation,
            )?,
            administrative_only: compile_all(
                "political.administrative_only",
                &p.administrative_only,
            )?,
            inter_departmental: compile_all("political.inter_departmental", &p.inter_departmental)?,
            stakeholder_opposition: compile_all(
                "political.stakeholder_opposition",
                &p.stakeholder_opposition,
            )?,
            public_support: compile_all("political.public_support", &p.public_support)?,
            high_cost: compile_all("political.high_cost", &p.high_cost)?,
            low_cost: compile_all("political.low_cost", &p.low_cost)?,
            quick_implementation: compile_all(
                "political.quick_implementation",
                &p.quick_implementation,
            )?,
            long_term: compile_all("political.long_term", &p.long_term)?,
        };

        let facts = FactPatterns {
            money: compile_all("facts.money", &tables.facts.money)?,
            timeframes: compile_all("facts.timeframes", &tables.facts.timeframes)?,
        };
        if let Some((i, _)) = facts
            .money
            .iter()
            .enumerate()
            .find(|(_, re)| re.captures_len() < 3)
        {
            return Err(RuleError::Invalid {
                table: "facts.money".to_string(),
                message: format!(
                    "pattern {} must capture the amount in group 1 and the unit in group 2",
                    tables.facts.money[i]
                ),
            });
        }

        let canonical = serde_json::to_vec(&tables).map_err(|e| RuleError::Fingerprint {
            message: e.to_string(),
        })?;
        let fingerprint = hex::encode(Sha256::digest(&canonical));

        Ok(Self {
            tables,
            billion,
            million,
            political,
            facts,
            fingerprint,
        })
    }

    /// The built-in tables, compiled.
    pub fn builtin() -> Result<Self, RuleError> {
        Self::compile(&RuleTables::default())
    }

    pub fn tables(&self) -> &RuleTables {
        &self.tables
    }

    /// Hex SHA-256 of the canonical JSON of the (lowercased) tables.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

fn compile_one(table: &str, pattern: &str) -> Result<Regex, RuleError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| RuleError::InvalidPattern {
            table: table.to_string(),
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

fn compile_all(table: &str, patterns: &[String]) -> Result<Vec<Regex>, RuleError> {
    patterns.iter().map(|p| compile_one(table, p)).collect()
}

fn lower_all(list: &mut [String]) {
    for k in list.iter_mut() {
        *k = k.to_lowercase();
    }
}

// Keyword lists only; regex tables keep their case and compile case-insensitive.
fn lowercased(mut t: RuleTables) -> RuleTables {
    for g in &mut t.feasibility.groups {
        lower_all(&mut g.keywords);
    }
    lower_all(&mut t.impact.sectors);
    lower_all(&mut t.impact.high_impact);
    lower_all(&mut t.impact.broad_reach);
    lower_all(&mut t.impact.sme);
    for g in &mut t.cost.activities {
        lower_all(&mut g.keywords);
    }
    for r in &mut t.categories {
        lower_all(&mut r.keywords);
    }
    for r in &mut t.reforms {
        lower_all(&mut r.keywords);
    }
    for r in &mut t.constraints.groups {
        lower_all(&mut r.keywords);
    }
    lower_all(&mut t.fiscal.neutral);
    lower_all(&mut t.fiscal.efficiency);
    for a in &mut t.fiscal.alignment {
        lower_all(&mut a.keywords);
    }
    lower_all(&mut t.growth.penalized_blockers);
    for a in &mut t.political.executive_priorities {
        lower_all(&mut a.keywords);
    }
    lower_all(&mut t.political.priority_sectors);
    lower_all(&mut t.signals.positive);
    lower_all(&mut t.signals.negative);
    lower_all(&mut t.signals.urgency);
    for a in &mut t.themes {
        lower_all(&mut a.keywords);
    }
    t
}

fn check_score(table: &str, value: u8) -> Result<(), RuleError> {
    if (1..=5).contains(&value) {
        Ok(())
    } else {
        Err(RuleError::ScoreOutOfRange {
            table: table.to_string(),
            value,
        })
    }
}

fn validate(t: &RuleTables) -> Result<(), RuleError> {
    for g in &t.feasibility.groups {
        check_score("feasibility.groups", g.score)?;
    }
    check_score("feasibility.default", t.feasibility.default)?;
    check_score("impact.base", t.impact.base)?;
    check_score("cost.billion_score", t.cost.billion_score)?;
    for b in &t.cost.million_bands {
        check_score("cost.million_bands", b.score)?;
    }
    check_score("cost.million_floor", t.cost.million_floor)?;
    for g in &t.cost.activities {
        check_score("cost.activities", g.score)?;
    }
    check_score("cost.default", t.cost.default)?;
    for g in &t.constraints.groups {
        check_score("constraints.groups", g.elasticity)?;
    }
    check_score("constraints.other_elasticity", t.constraints.other_elasticity)?;

    let sum = t.political.weights.sum();
    if (sum - 1.0).abs() > 1e-6 {
        return Err(RuleError::Weights { sum });
    }
    if t.signals.high_urgency_at == 0 {
        return Err(RuleError::Invalid {
            table: "signals.high_urgency_at".to_string(),
            message: "must be at least 1".to_string(),
        });
    }
    Ok(())
}

//! Domain logic: turn loaded recommendation records into a deterministic scored dataset.
//!
//! This crate owns *what* each record scores and why. It does not own where records come from or
//! where artifacts go; that is `recprio-core`.

pub mod aggregate;
pub mod normalize;
pub mod overlay;
pub mod political;
mod prioritizer;
pub mod rules;
pub mod scoring;
pub mod tiers;

pub use normalize::NormalizeConfig;
pub use prioritizer::{
    Anomaly, AnomalyKind, NormalizedRecord, PrioritizeResult, Prioritizer, PrioritizerConfig,
};
pub use rules::{RuleError, RuleTables, Ruleset};
pub use tiers::{TierMeta, TierRule, TierThresholds, builtin_tier_metas, builtin_tier_rules};

use crate::normalize::{
    Deduper, NormalizeConfig, clean_text, derive_id, is_numeric_noise, newest_first,
    similarity_key,
};
use crate::overlay::{OverlayHints, fiscal_overlay, growth_overlay, keyword_signals, text_facts};
use crate::rules::Ruleset;
use crate::scoring::{TextView, classify_category, reform_tags, score_card};
use crate::tiers::{TierInput, TierRule, TierThresholds, builtin_tier_rules, classify};
use crate::{aggregate, political};
use recprio_records::LoadedEntry;
use recprio_types::scored::{
    Category, EvidenceConfidence, FiscalImpact, ScoredDataset, ScoredRecommendation,
};
use recprio_types::summary::PrioritizationSummary;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrioritizerConfig {
    pub normalize: NormalizeConfig,
    pub tiers: TierThresholds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    RecordRejected,
    NoiseDropped,
    DuplicateRemoved,
    MissingField,
    InvalidHint,
}

impl AnomalyKind {
    pub fn code(self) -> &'static str {
        match self {
            AnomalyKind::RecordRejected => "record.rejected",
            AnomalyKind::NoiseDropped => "record.noise_dropped",
            AnomalyKind::DuplicateRemoved => "record.duplicate_removed",
            AnomalyKind::MissingField => "record.missing_field",
            AnomalyKind::InvalidHint => "record.invalid_hint",
        }
    }
}

/// Something about the input worth reporting that did not stop the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    /// Position in the input table.
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    pub message: String,
}

/// A cleaned input record, ready for scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub index: usize,
    pub id: String,
    pub year: Option<i32>,
    pub sector: String,
    pub report: String,
    pub text: String,
    pub category: Option<Category>,
    pub hints: OverlayHints,
}

#[derive(Debug, Clone)]
pub struct PrioritizeResult {
    pub dataset: ScoredDataset,
    pub summary: PrioritizationSummary,
    pub anomalies: Vec<Anomaly>,
    pub records_read: usize,
}

pub struct Prioritizer {
    rules: Ruleset,
    tier_rules: Vec<Box<dyn TierRule>>,
    config: PrioritizerConfig,
}

impl Prioritizer {
    pub fn new(rules: Ruleset, config: PrioritizerConfig) -> Self {
        Self {
            rules,
            tier_rules: builtin_tier_rules(),
            config,
        }
    }

    pub fn with_tier_rules(mut self, tier_rules: Vec<Box<dyn TierRule>>) -> Self {
        self.tier_rules = tier_rules;
        self
    }

    pub fn rules(&self) -> &Ruleset {
        &self.rules
    }

    pub fn config(&self) -> &PrioritizerConfig {
        &self.config
    }

    /// Clean, filter, identify and deduplicate loaded entries.
    ///
    /// Output order is newest year first, then input order.
    pub fn normalize(&self, entries: &[LoadedEntry]) -> (Vec<NormalizedRecord>, Vec<Anomaly>) {
        let cfg = &self.config.normalize;
        let mut anomalies = Vec::new();
        let mut records = Vec::new();

        for entry in entries {
            let raw = match &entry.record {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(index = entry.index, error = %e, "record rejected");
                    anomalies.push(Anomaly {
                        kind: AnomalyKind::RecordRejected,
                        index: entry.index,
                        record_id: None,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            let text = clean_text(&raw.recommendation);
            if is_numeric_noise(&text, cfg) {
                debug!(index = entry.index, "dropping short or numeric text");
                anomalies.push(Anomaly {
                    kind: AnomalyKind::NoiseDropped,
                    index: entry.index,
                    record_id: raw.id.clone(),
                    message: format!("text of {} chars is table debris", text.chars().count()),
                });
                continue;
            }

            let sector = raw.sector.trim().to_string();
            let id = raw
                .id
                .clone()
                .unwrap_or_else(|| derive_id(&sector, raw.year, &text));

            for (field, missing) in [("sector", sector.is_empty()), ("year", raw.year.is_none())] {
                if missing {
                    anomalies.push(Anomaly {
                        kind: AnomalyKind::MissingField,
                        index: entry.index,
                        record_id: Some(id.clone()),
                        message: format!("missing {field}"),
                    });
                }
            }

            let hints = self.hints(entry.index, &id, raw, &mut anomalies);
            records.push(NormalizedRecord {
                index: entry.index,
                id,
                year: raw.year,
                sector,
                report: raw.report.trim().to_string(),
                text,
                category: raw.category.as_deref().and_then(Category::from_label),
                hints,
            });
        }

        newest_first(&mut records, |r| r.year);

        let mut deduper = Deduper::new(cfg.dedup_threshold);
        let mut kept = Vec::with_capacity(records.len());
        for rec in records {
            if deduper.admit(&similarity_key(&rec.text)) {
                kept.push(rec);
            } else {
                debug!(id = %rec.id, "near-duplicate removed");
                anomalies.push(Anomaly {
                    kind: AnomalyKind::DuplicateRemoved,
                    index: rec.index,
                    record_id: Some(rec.id),
                    message: "near-duplicate of a newer record".to_string(),
                });
            }
        }

        anomalies.sort_by(|a, b| a.index.cmp(&b.index).then(a.kind.cmp(&b.kind)));
        (kept, anomalies)
    }

    fn hints(
        &self,
        index: usize,
        id: &str,
        raw: &recprio_types::record::RawRecommendation,
        anomalies: &mut Vec<Anomaly>,
    ) -> OverlayHints {
        let mut invalid = |field: &str, value: &str| {
            anomalies.push(Anomaly {
                kind: AnomalyKind::InvalidHint,
                index,
                record_id: Some(id.to_string()),
                message: format!("unrecognised {field} `{value}`, using default"),
            });
        };

        let fiscal_impact = raw.fiscal_impact.as_deref().and_then(|v| {
            let parsed = FiscalImpact::parse(v);
            if parsed.is_none() {
                invalid("fiscal_impact", v);
            }
            parsed
        });
        let evidence_confidence = raw.evidence_confidence.as_deref().and_then(|v| {
            let parsed = EvidenceConfidence::parse(v);
            if parsed.is_none() {
                invalid("evidence_confidence", v);
            }
            parsed
        });

        OverlayHints {
            fiscal_impact,
            evidence_confidence,
            blocker_type: raw.blocker_type.clone(),
        }
    }

    /// Score one normalized record. Pure: the same record and rules give the same output.
    pub fn score(&self, rec: &NormalizedRecord) -> ScoredRecommendation {
        let view = TextView::new(&rec.text, &rec.sector);
        let scores = score_card(&self.rules, &view);
        let category = rec
            .category
            .unwrap_or_else(|| classify_category(&self.rules, &view.text));
        let reforms = reform_tags(&self.rules, &view.text);
        let fiscal = fiscal_overlay(&self.rules, &view, &scores);
        let growth = growth_overlay(&self.rules, &view, &scores, &rec.hints);
        let tiers = classify(
            &self.tier_rules,
            &TierInput {
                scores: &scores,
                reform_tags: &reforms,
                fiscal_feasibility: fiscal.fiscal_feasibility,
            },
            &self.config.tiers,
        );

        ScoredRecommendation {
            id: rec.id.clone(),
            year: rec.year,
            sector: rec.sector.clone(),
            report: rec.report.clone(),
            text: rec.text.clone(),
            category,
            institutional_reform_tags: reforms,
            scores,
            tiers,
            fiscal,
            growth,
            political: political::assess(&self.rules, &view),
            signals: keyword_signals(&self.rules, &view.text),
            facts: text_facts(&self.rules, &view.text),
        }
    }

    pub fn prioritize(&self, entries: &[LoadedEntry]) -> PrioritizeResult {
        let (normalized, anomalies) = self.normalize(entries);
        let records: Vec<ScoredRecommendation> = normalized.iter().map(|r| self.score(r)).collect();
        let summary = aggregate::summarize(&self.rules, &records);

        info!(
            read = entries.len(),
            scored = records.len(),
            quick_wins = summary.quick_wins,
            high_priority = summary.high_priority,
            anomalies = anomalies.len(),
            "prioritization complete"
        );

        PrioritizeResult {
            dataset: ScoredDataset {
                schema: recprio_types::schema::RECPRIO_SCORED_V1.to_string(),
                rules_fingerprint: self.rules.fingerprint().to_string(),
                records,
            },
            summary,
            anomalies,
            records_read: entries.len(),
        }
    }
}

//! Bounded score types.
//!
//! A [`Score`] can only hold values in `1..=5`; a [`ScoreCard`] derives its ROI from its three
//! scores at construction and again on deserialization, so a stored ROI can never drift from
//! its inputs.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const SCORE_MIN: u8 = 1;
pub const SCORE_MAX: u8 = 5;

pub const ROI_MIN: f64 = 1.0;
pub const ROI_MAX: f64 = 10.0;

// Extremes of `impact * feasibility / cost` over the 1..=5 domain.
const RAW_ROI_MIN: f64 = 0.2;
const RAW_ROI_MAX: f64 = 25.0;

/// An integer score in `1..=5`.
///
/// For cost, higher means cheaper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const MIN: Score = Score(SCORE_MIN);
    pub const MAX: Score = Score(SCORE_MAX);
    pub const NEUTRAL: Score = Score(3);

    pub fn new(value: u8) -> Option<Self> {
        (SCORE_MIN..=SCORE_MAX)
            .contains(&value)
            .then_some(Self(value))
    }

    /// Clamp an arbitrary integer into the score range.
    pub fn saturating(value: i64) -> Self {
        Self(value.clamp(i64::from(SCORE_MIN), i64::from(SCORE_MAX)) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("score {0} is outside 1..=5")]
pub struct ScoreOutOfRange(pub u8);

impl TryFrom<u8> for Score {
    type Error = ScoreOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Score::new(value).ok_or(ScoreOutOfRange(value))
    }
}

impl From<Score> for u8 {
    fn from(s: Score) -> Self {
        s.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// ROI on a 1-10 scale.
///
/// `impact * feasibility / cost` is mapped linearly from its domain `[0.2, 25]` onto `[1, 10]`,
/// rounded to one decimal and clamped. `cost >= 1` holds by construction of [`Score`].
pub fn roi_score(feasibility: Score, impact: Score, cost: Score) -> f64 {
    let raw = f64::from(impact.get()) * f64::from(feasibility.get()) / f64::from(cost.get());
    let scaled = 1.0 + (raw - RAW_ROI_MIN) / (RAW_ROI_MAX - RAW_ROI_MIN) * 9.0;
    round_to(scaled, 1).clamp(ROI_MIN, ROI_MAX)
}

/// Feasibility, impact and cost plus the ROI derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "ScoreCardRepr", into = "ScoreCardRepr")]
pub struct ScoreCard {
    feasibility: Score,
    impact: Score,
    cost: Score,
    roi: f64,
}

impl ScoreCard {
    pub fn new(feasibility: Score, impact: Score, cost: Score) -> Self {
        Self {
            feasibility,
            impact,
            cost,
            roi: roi_score(feasibility, impact, cost),
        }
    }

    pub fn feasibility(&self) -> Score {
        self.feasibility
    }

    pub fn impact(&self) -> Score {
        self.impact
    }

    pub fn cost(&self) -> Score {
        self.cost
    }

    pub fn roi_score(&self) -> f64 {
        self.roi
    }
}

#[derive(Serialize, Deserialize)]
struct ScoreCardRepr {
    feasibility_score: Score,
    impact_score: Score,
    cost_score: Score,
    // Ignored on read; recomputed from the three scores.
    #[serde(default)]
    roi_score: f64,
}

impl From<ScoreCardRepr> for ScoreCard {
    fn from(r: ScoreCardRepr) -> Self {
        ScoreCard::new(r.feasibility_score, r.impact_score, r.cost_score)
    }
}

impl From<ScoreCard> for ScoreCardRepr {
    fn from(c: ScoreCard) -> Self {
        Self {
            feasibility_score: c.feasibility,
            impact_score: c.impact,
            cost_score: c.cost,
            roi_score: c.roi,
        }
    }
}

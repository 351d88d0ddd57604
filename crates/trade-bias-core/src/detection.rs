use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Score;

/// Scores strictly above this are reported as detected.
pub const DETECTION_THRESHOLD: Score = dec!(25);

/// Lower bound of the Moderate band.
pub const MODERATE_FROM: Score = dec!(30);

/// Lower bound of the High band.
pub const HIGH_FROM: Score = dec!(60);

pub const MAX_SCORE: Score = dec!(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Bias {
    #[serde(rename = "Overtrading")]
    Overtrading,
    #[serde(rename = "Loss Aversion")]
    LossAversion,
    #[serde(rename = "Revenge Trading")]
    RevengeTrading,
}

impl Bias {
    pub const ALL: [Bias; 3] = [Bias::Overtrading, Bias::LossAversion, Bias::RevengeTrading];

    pub fn label(&self) -> &'static str {
        match self {
            Bias::Overtrading => "Overtrading",
            Bias::LossAversion => "Loss Aversion",
            Bias::RevengeTrading => "Revenge Trading",
        }
    }
}

impl fmt::Display for Bias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Moderate,
    High,
}

impl Severity {
    pub fn from_score(score: Score) -> Self {
        if score < MODERATE_FROM {
            Severity::Low
        } else if score < HIGH_FROM {
            Severity::Moderate
        } else {
            Severity::High
        }
    }
}

/// Outcome of one bias detector.
///
/// `metrics` is None for insufficient-data outcomes, which are ordinary
/// non-detected results rather than errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult<M> {
    pub detected: bool,
    pub severity: Severity,
    pub score: Score,
    pub metrics: Option<M>,
    pub description: String,
}

/// Round to one decimal place, then clamp to [0, 100].
pub fn finalize_score(raw: Score) -> Score {
    raw.round_dp(1).clamp(Decimal::ZERO, MAX_SCORE)
}

impl<M> DetectionResult<M> {
    /// Severity and the detected flag are derived from the finalized score,
    /// so both always agree with the score that is reported.
    pub fn scored(raw_score: Score, metrics: M, describe: impl FnOnce(Severity) -> String) -> Self {
        let score = finalize_score(raw_score);
        let severity = Severity::from_score(score);
        DetectionResult {
            detected: score > DETECTION_THRESHOLD,
            severity,
            score,
            metrics: Some(metrics),
            description: describe(severity),
        }
    }

    pub fn not_detected(description: impl Into<String>) -> Self {
        DetectionResult {
            detected: false,
            severity: Severity::Low,
            score: Decimal::ZERO,
            metrics: None,
            description: description.into(),
        }
    }
}

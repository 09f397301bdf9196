use serde::{Deserialize, Serialize};

use crate::analytics::estimator::DEFAULT_INTENSITY;

/// Every tunable cutoff the engine classifies against.
///
/// Deserializes from partial JSON: omitted groups and fields keep their
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsThresholds {
    pub acr: AcrThresholds,
    pub load: LoadModel,
    pub trend: TrendThresholds,
    pub recovery: RecoveryThresholds,
    pub balance: BalanceThresholds,
    pub comparison: ComparisonThresholds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcrThresholds {
    pub detraining_below: f64,
    pub optimal_max: f64,
    pub elevated_max: f64,
}

impl Default for AcrThresholds {
    fn default() -> Self {
        Self {
            detraining_below: 0.8,
            optimal_max: 1.3,
            elevated_max: 1.5,
        }
    }
}

/// Constants of the set-based load model.
///
/// Set duration and default intensity stand in for telemetry the app does not
/// record, so loads are heuristic estimates rather than measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadModel {
    pub acute_days: usize,
    pub chronic_days: usize,
    pub set_duration_minutes: f64,
    /// Intensity (0-100) assumed for sets logged without RPE.
    pub default_intensity: f64,
}

impl Default for LoadModel {
    fn default() -> Self {
        Self {
            acute_days: 7,
            chronic_days: 28,
            set_duration_minutes: 3.0,
            default_intensity: DEFAULT_INTENSITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendThresholds {
    /// Fitted percent change beyond which a regression trend is not stable.
    pub percent_change: f64,
    /// Points on the 0-100 scale separating first and last third means.
    pub recovery_margin: f64,
}

impl Default for TrendThresholds {
    fn default() -> Self {
        Self {
            percent_change: 5.0,
            recovery_margin: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryThresholds {
    pub low_score: f64,
    pub poor_sleep: f64,
    pub high_soreness: f64,
}

impl Default for RecoveryThresholds {
    fn default() -> Self {
        Self {
            low_score: 60.0,
            poor_sleep: 6.0,
            high_soreness: 6.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceThresholds {
    pub push_pull_ratio: f64,
    /// Minimum leg volume as a share of combined push and pull volume.
    pub min_leg_share: f64,
    pub major_ratio: f64,
}

impl Default for BalanceThresholds {
    fn default() -> Self {
        Self {
            push_pull_ratio: 1.5,
            min_leg_share: 0.3,
            major_ratio: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonThresholds {
    pub change_percent: f64,
}

impl Default for ComparisonThresholds {
    fn default() -> Self {
        Self {
            change_percent: 5.0,
        }
    }
}

//! Composite recovery score from sleep, HRV and soreness signals.
//!
//! The engine never generates signals itself: it asks a [`RecoverySignalSource`]
//! for each day of the window. Until wearable data is available the service
//! runs on [`SimulatedSource`], which derives plausible values from that day's
//! training load.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use chrono::{Datelike, NaiveDate};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::analytics::load::{DailyLoadPoint, daily_loads};
use crate::analytics::model::{DateRange, WorkoutSession, mean, round2, validate_sessions};
use crate::analytics::thresholds::AnalyticsThresholds;
use crate::analytics::trend::{RecoveryTrend, TrendPoint, thirds_trend};
use crate::error::AnalyticsError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoverySignal {
    pub date: NaiveDate,
    /// 0-10
    pub sleep_quality: f64,
    /// Milliseconds; 90 scores as full recovery.
    pub hrv: f64,
    /// 0-10
    pub soreness: f64,
}

pub trait RecoverySignalSource: Send + Sync {
    /// Signal for the given day, or `None` when nothing was recorded.
    fn signal(&self, day: &DailyLoadPoint) -> Option<RecoverySignal>;
}

/// Deterministic stand-in for wearable telemetry.
#[derive(Debug, Clone)]
pub struct SimulatedSource {
    seed: u64,
}

impl SimulatedSource {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn rng_for(&self, date: NaiveDate) -> ChaCha8Rng {
        let day = u64::from(date.num_days_from_ce().unsigned_abs());
        ChaCha8Rng::seed_from_u64(self.seed ^ day.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }
}

impl RecoverySignalSource for SimulatedSource {
    fn signal(&self, day: &DailyLoadPoint) -> Option<RecoverySignal> {
        let mut rng = self.rng_for(day.date);
        // 40 TSS is roughly a hard full-body session.
        let strain = (day.tss / 40.0).min(1.0);

        let sleep_quality = 7.5 - strain * 1.5 + rng.gen_range(-1.0..1.0);
        let hrv = 65.0 - strain * 15.0 + rng.gen_range(-8.0..8.0);
        let soreness = 1.5 + strain * 5.0 + rng.gen_range(-1.0..1.0);

        Some(RecoverySignal {
            date: day.date,
            sleep_quality: round1(sleep_quality.clamp(0.0, 10.0)),
            hrv: round1(hrv.clamp(20.0, 100.0)),
            soreness: round1(soreness.clamp(0.0, 10.0)),
        })
    }
}

/// Recorded signals keyed by day.
#[derive(Debug, Clone, Default)]
pub struct MeasuredSource {
    signals: BTreeMap<NaiveDate, RecoverySignal>,
}

impl MeasuredSource {
    pub fn new(signals: impl IntoIterator<Item = RecoverySignal>) -> Self {
        Self {
            signals: signals
                .into_iter()
                .map(|signal| (signal.date, signal))
                .collect(),
        }
    }

    /// Loads a JSON array of signals.
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let body = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read recovery telemetry {}", path.display()))?;
        let signals: Vec<RecoverySignal> = serde_json::from_str(&body)
            .map_err(|e| anyhow::anyhow!("Failed to parse recovery telemetry: {}", e))?;
        Ok(Self::new(signals))
    }
}

impl RecoverySignalSource for MeasuredSource {
    fn signal(&self, day: &DailyLoadPoint) -> Option<RecoverySignal> {
        self.signals.get(&day.date).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryPoint {
    pub date: NaiveDate,
    pub sleep_quality: f64,
    pub hrv: f64,
    pub soreness: f64,
    pub recovery_score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryReport {
    pub data: Vec<RecoveryPoint>,
    pub average_recovery: f64,
    pub average_sleep: f64,
    #[serde(rename = "averageHRV")]
    pub average_hrv: f64,
    pub average_soreness: f64,
    pub trend: RecoveryTrend,
    pub recommendation: String,
}

/// Weighted 0-100 score: 40% sleep, 30% HRV, 30% inverse soreness.
pub fn recovery_score(sleep_quality: f64, hrv: f64, soreness: f64) -> u32 {
    let sleep = sleep_quality / 10.0 * 100.0;
    let heart = hrv / 90.0 * 100.0;
    let freshness = (10.0 - soreness) / 10.0 * 100.0;
    let score = 0.4 * sleep + 0.3 * heart + 0.3 * freshness;
    if score.is_nan() {
        return 0;
    }
    score.round().clamp(0.0, 100.0) as u32
}

/// Picks the single recommendation for a window, first matching rule wins.
pub fn recovery_recommendation(
    average_recovery: f64,
    trend: RecoveryTrend,
    average_sleep: f64,
    average_soreness: f64,
    thresholds: &AnalyticsThresholds,
) -> &'static str {
    let limits = &thresholds.recovery;
    if average_recovery < limits.low_score {
        "Recovery is low. Prioritize rest and consider a lighter training day."
    } else if trend == RecoveryTrend::Declining {
        "Recovery is trending down. Reduce training volume for a few days."
    } else if average_sleep < limits.poor_sleep {
        "Sleep quality is limiting recovery. Aim for longer, more consistent sleep."
    } else if average_soreness > limits.high_soreness {
        "Muscle soreness is elevated. Add mobility work or an active recovery day."
    } else {
        "Recovery looks good. You're ready for quality training."
    }
}

pub fn recovery_points(
    daily: &[DailyLoadPoint],
    source: &dyn RecoverySignalSource,
) -> Vec<RecoveryPoint> {
    daily
        .iter()
        .filter_map(|day| source.signal(day))
        .map(|signal| RecoveryPoint {
            date: signal.date,
            sleep_quality: signal.sleep_quality,
            hrv: signal.hrv,
            soreness: signal.soreness,
            recovery_score: recovery_score(signal.sleep_quality, signal.hrv, signal.soreness),
        })
        .collect()
}

/// Daily recovery scores over `range` as a trend series.
pub fn recovery_series(
    sessions: &[WorkoutSession],
    range: &DateRange,
    source: &dyn RecoverySignalSource,
    thresholds: &AnalyticsThresholds,
) -> Result<Vec<TrendPoint>, AnalyticsError> {
    validate_sessions(sessions)?;
    let daily = daily_loads(sessions, range, &thresholds.load);
    Ok(recovery_points(&daily, source)
        .into_iter()
        .map(|point| TrendPoint {
            date: point.date,
            value: f64::from(point.recovery_score),
        })
        .collect())
}

pub fn recovery_report(
    sessions: &[WorkoutSession],
    range: &DateRange,
    source: &dyn RecoverySignalSource,
    thresholds: &AnalyticsThresholds,
) -> Result<RecoveryReport, AnalyticsError> {
    validate_sessions(sessions)?;
    let daily = daily_loads(sessions, range, &thresholds.load);
    let data = recovery_points(&daily, source);

    if data.is_empty() {
        return Ok(RecoveryReport {
            data,
            average_recovery: 0.0,
            average_sleep: 0.0,
            average_hrv: 0.0,
            average_soreness: 0.0,
            trend: RecoveryTrend::Stable,
            recommendation: "No recovery data recorded for this period.".to_string(),
        });
    }

    let scores: Vec<f64> = data.iter().map(|p| f64::from(p.recovery_score)).collect();
    let sleep: Vec<f64> = data.iter().map(|p| p.sleep_quality).collect();
    let hrv: Vec<f64> = data.iter().map(|p| p.hrv).collect();
    let soreness: Vec<f64> = data.iter().map(|p| p.soreness).collect();

    let average_recovery = mean(&scores);
    let average_sleep = mean(&sleep);
    let average_soreness = mean(&soreness);
    let trend = thirds_trend(&scores, &thresholds.trend);
    let recommendation = recovery_recommendation(
        average_recovery,
        trend,
        average_sleep,
        average_soreness,
        thresholds,
    );

    Ok(RecoveryReport {
        average_recovery: average_recovery.round(),
        average_sleep: round2(average_sleep),
        average_hrv: round2(mean(&hrv)),
        average_soreness: round2(average_soreness),
        trend,
        recommendation: recommendation.to_string(),
        data,
    })
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

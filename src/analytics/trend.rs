use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analytics::model::{
    DateRange, WorkoutSession, completed_in, mean, round2, validate_sessions,
};
use crate::analytics::thresholds::TrendThresholds;
use crate::error::AnalyticsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendMetric {
    Volume,
    Strength,
    Recovery,
}

impl FromStr for TrendMetric {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "volume" => Ok(Self::Volume),
            "strength" => Ok(Self::Strength),
            "recovery" => Ok(Self::Recovery),
            other => Err(AnalyticsError::invalid_input(format!(
                "unknown trend metric '{}', expected volume, strength or recovery",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Stable,
    Decreasing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryTrend {
    Improving,
    Stable,
    Declining,
}

impl From<RecoveryTrend> for TrendDirection {
    fn from(trend: RecoveryTrend) -> Self {
        match trend {
            RecoveryTrend::Improving => Self::Increasing,
            RecoveryTrend::Stable => Self::Stable,
            RecoveryTrend::Declining => Self::Decreasing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendResult {
    pub trend: TrendDirection,
    pub percent_change: f64,
    pub slope: f64,
}

impl TrendResult {
    fn flat() -> Self {
        Self {
            trend: TrendDirection::Stable,
            percent_change: 0.0,
            slope: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub metric: TrendMetric,
    pub series: Vec<TrendPoint>,
    #[serde(flatten)]
    pub result: TrendResult,
}

/// Ordinary least squares over `(index, value)`, classified by the percent
/// change between the first and last fitted values.
///
/// Series shorter than two points, or whose first fitted value is zero or
/// negative, are reported as stable with no change. A non-positive baseline
/// would flip the sign of the percent change.
pub fn linear_trend(values: &[f64], thresholds: &TrendThresholds) -> TrendResult {
    if values.len() < 2 {
        return TrendResult::flat();
    }

    let n = values.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = mean(values);

    let (covariance, variance) = values.iter().enumerate().fold(
        (0.0, 0.0),
        |(covariance, variance), (index, value)| {
            let dx = index as f64 - mean_x;
            (covariance + dx * (value - mean_y), variance + dx * dx)
        },
    );
    let slope = covariance / variance;
    let intercept = mean_y - slope * mean_x;

    let first_fitted = intercept;
    let last_fitted = slope * (n - 1.0) + intercept;
    if first_fitted < f64::EPSILON {
        return TrendResult {
            slope: round2(slope),
            ..TrendResult::flat()
        };
    }

    let percent_change = (last_fitted - first_fitted) / first_fitted * 100.0;
    let trend = if percent_change > thresholds.percent_change {
        TrendDirection::Increasing
    } else if percent_change < -thresholds.percent_change {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    };

    TrendResult {
        trend,
        percent_change: round2(percent_change),
        slope: round2(slope),
    }
}

/// Compares the mean of the last third of the series against the first third.
pub fn thirds_trend(values: &[f64], thresholds: &TrendThresholds) -> RecoveryTrend {
    let third = values.len() / 3;
    if third == 0 {
        return RecoveryTrend::Stable;
    }

    let first = mean(&values[..third]);
    let last = mean(&values[values.len() - third..]);

    if last > first + thresholds.recovery_margin {
        RecoveryTrend::Improving
    } else if last < first - thresholds.recovery_margin {
        RecoveryTrend::Declining
    } else {
        RecoveryTrend::Stable
    }
}

/// Total `weight * reps` per session day, optionally for one exercise.
pub fn volume_series(
    sessions: &[WorkoutSession],
    range: &DateRange,
    exercise_id: Option<&str>,
) -> Vec<TrendPoint> {
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for session in completed_in(sessions, range) {
        let volume: f64 = session
            .sets
            .iter()
            .filter(|set| exercise_id.is_none_or(|id| set.exercise_id == id))
            .map(|set| set.volume())
            .sum();
        if exercise_id.is_none() || volume > 0.0 {
            *by_day.entry(session.date).or_default() += volume;
        }
    }
    into_series(by_day)
}

/// Best estimated 1RM per session day for one exercise.
pub fn strength_series(
    sessions: &[WorkoutSession],
    range: &DateRange,
    exercise_id: &str,
) -> Vec<TrendPoint> {
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for session in completed_in(sessions, range) {
        let best = session
            .sets
            .iter()
            .filter(|set| set.exercise_id == exercise_id)
            .filter_map(|set| set.estimated_one_rep_max())
            .max_by(f64::total_cmp);
        if let Some(best) = best {
            let entry = by_day.entry(session.date).or_insert(best);
            *entry = entry.max(best);
        }
    }
    into_series(by_day)
}

fn into_series(by_day: BTreeMap<NaiveDate, f64>) -> Vec<TrendPoint> {
    by_day
        .into_iter()
        .map(|(date, value)| TrendPoint { date, value })
        .collect()
}

pub fn trend_report(
    metric: TrendMetric,
    series: Vec<TrendPoint>,
    thresholds: &TrendThresholds,
) -> TrendReport {
    let values: Vec<f64> = series.iter().map(|point| point.value).collect();
    let result = linear_trend(&values, thresholds);
    TrendReport {
        metric,
        series: series
            .into_iter()
            .map(|point| TrendPoint {
                value: round2(point.value),
                ..point
            })
            .collect(),
        result,
    }
}

/// Trend of daily recovery scores.
///
/// The direction comes from the thirds comparison, the same verdict the
/// recovery report gives; slope and percent change are the regression figures.
pub fn recovery_trend_report(
    series: Vec<TrendPoint>,
    thresholds: &TrendThresholds,
) -> TrendReport {
    let values: Vec<f64> = series.iter().map(|point| point.value).collect();
    let direction = thirds_trend(&values, thresholds).into();

    let mut report = trend_report(TrendMetric::Recovery, series, thresholds);
    report.result.trend = direction;
    report
}

/// Regression trend of a session-derived metric over `range`.
///
/// Recovery trends need recovery signals and are built by the recovery module
/// instead; asking for one here is rejected.
pub fn analyze_trend(
    metric: TrendMetric,
    sessions: &[WorkoutSession],
    range: &DateRange,
    exercise_id: Option<&str>,
    thresholds: &TrendThresholds,
) -> Result<TrendReport, AnalyticsError> {
    validate_sessions(sessions)?;

    let series = match (metric, exercise_id) {
        (TrendMetric::Volume, exercise_id) => volume_series(sessions, range, exercise_id),
        (TrendMetric::Strength, Some(exercise_id)) => {
            strength_series(sessions, range, exercise_id)
        }
        (TrendMetric::Strength, None) => {
            return Err(AnalyticsError::invalid_input(
                "strength trend requires an exercise id",
            ));
        }
        (TrendMetric::Recovery, _) => {
            return Err(AnalyticsError::invalid_input(
                "recovery trend is computed from recovery signals, not sessions",
            ));
        }
    };

    Ok(trend_report(metric, series, thresholds))
}

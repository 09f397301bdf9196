//! Set-based training load (TSS/TRIMP) and acute:chronic ratio.
//!
//! Neither heart rate nor set duration is recorded, so each set is assumed to
//! last a fixed number of minutes at an intensity derived from its RPE. The
//! resulting scores are heuristic estimates of training stress, not
//! measurements.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::analytics::estimator::intensity_from_rpe;
use crate::analytics::model::{
    DateRange, SetRecord, WorkoutSession, completed_in, round2, validate_sessions,
};
use crate::analytics::thresholds::{AcrThresholds, AnalyticsThresholds, LoadModel};
use crate::error::AnalyticsError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyLoadPoint {
    pub date: NaiveDate,
    pub tss: f64,
    pub trimp: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RollingWindow {
    pub acute_load: f64,
    pub chronic_load: f64,
    pub ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AcrStatus {
    Optimal,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcrAssessment {
    pub status: AcrStatus,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadPoint {
    pub date: NaiveDate,
    pub tss: f64,
    pub trimp: f64,
    pub acute_load: f64,
    pub chronic_load: f64,
    pub acr: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadSummary {
    #[serde(rename = "currentTSS")]
    pub current_tss: f64,
    pub weekly_average: f64,
    pub acr: f64,
    pub status: AcrStatus,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingLoadReport {
    pub data: Vec<LoadPoint>,
    pub summary: LoadSummary,
}

pub fn set_tss(set: &SetRecord, model: &LoadModel) -> f64 {
    let intensity = intensity_from_rpe(set.rpe, model.default_intensity);
    model.set_duration_minutes * intensity * intensity / 3600.0
}

pub fn set_trimp(set: &SetRecord, model: &LoadModel) -> f64 {
    let intensity = intensity_from_rpe(set.rpe, model.default_intensity);
    model.set_duration_minutes * (intensity / 100.0) * 10.0
}

/// One point per calendar day of `range`, zero on rest days.
pub fn daily_loads(
    sessions: &[WorkoutSession],
    range: &DateRange,
    model: &LoadModel,
) -> Vec<DailyLoadPoint> {
    let mut by_day: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
    for session in completed_in(sessions, range) {
        let entry = by_day.entry(session.date).or_default();
        for set in &session.sets {
            entry.0 += set_tss(set, model);
            entry.1 += set_trimp(set, model);
        }
    }

    range
        .days()
        .map(|date| {
            let (tss, trimp) = by_day.get(&date).copied().unwrap_or_default();
            DailyLoadPoint { date, tss, trimp }
        })
        .collect()
}

/// Trailing acute/chronic means for every day of `daily`, clamped to the
/// start of the series.
pub fn rolling_windows(daily: &[DailyLoadPoint], model: &LoadModel) -> Vec<RollingWindow> {
    let mut prefix = Vec::with_capacity(daily.len() + 1);
    prefix.push(0.0);
    for point in daily {
        let total = prefix[prefix.len() - 1] + point.tss;
        prefix.push(total);
    }

    let trailing_mean = |end: usize, window: usize| {
        let count = window.max(1).min(end + 1);
        (prefix[end + 1] - prefix[end + 1 - count]) / count as f64
    };

    (0..daily.len())
        .map(|index| {
            let acute_load = trailing_mean(index, model.acute_days);
            let chronic_load = trailing_mean(index, model.chronic_days);
            let ratio = if chronic_load > 0.0 {
                acute_load / chronic_load
            } else {
                1.0
            };
            RollingWindow {
                acute_load,
                chronic_load,
                ratio,
            }
        })
        .collect()
}

pub fn classify_acr(ratio: f64, thresholds: &AcrThresholds) -> AcrAssessment {
    let (status, recommendation) = if ratio < thresholds.detraining_below {
        (
            AcrStatus::Warning,
            "Training load is dropping. Gradually increase volume to avoid detraining.",
        )
    } else if ratio <= thresholds.optimal_max {
        (
            AcrStatus::Optimal,
            "Training load is in the optimal range. Keep progressing steadily.",
        )
    } else if ratio <= thresholds.elevated_max {
        (
            AcrStatus::Warning,
            "Training load is elevated. Monitor recovery and avoid further spikes.",
        )
    } else {
        (
            AcrStatus::Danger,
            "Training load spike detected. Reduce volume to lower injury risk.",
        )
    };

    AcrAssessment {
        status,
        recommendation: recommendation.to_string(),
    }
}

pub fn training_load(
    sessions: &[WorkoutSession],
    display: &DateRange,
    thresholds: &AnalyticsThresholds,
) -> Result<TrainingLoadReport, AnalyticsError> {
    validate_sessions(sessions)?;

    let model = &thresholds.load;
    let seed_days = model.chronic_days;
    let extended = display.extended_back(seed_days as i64);
    let daily = daily_loads(sessions, &extended, model);
    let windows = rolling_windows(&daily, model);

    let data: Vec<LoadPoint> = daily
        .iter()
        .zip(&windows)
        .skip(seed_days)
        .map(|(point, window)| LoadPoint {
            date: point.date,
            tss: round2(point.tss),
            trimp: round2(point.trimp),
            acute_load: round2(window.acute_load),
            chronic_load: round2(window.chronic_load),
            acr: round2(window.ratio),
        })
        .collect();

    let (current_tss, latest) = match (daily.last(), windows.last()) {
        (Some(point), Some(window)) => (point.tss, *window),
        _ => (
            0.0,
            RollingWindow {
                acute_load: 0.0,
                chronic_load: 0.0,
                ratio: 1.0,
            },
        ),
    };
    let assessment = classify_acr(latest.ratio, &thresholds.acr);

    Ok(TrainingLoadReport {
        data,
        summary: LoadSummary {
            current_tss: round2(current_tss),
            weekly_average: round2(latest.acute_load),
            acr: round2(latest.ratio),
            status: assessment.status,
            recommendation: assessment.recommendation,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::model::fixtures::*;

    fn model() -> LoadModel {
        LoadModel::default()
    }

    #[test]
    fn test_two_rpe_8_sets_on_one_day() {
        let sessions = vec![session(
            "s1",
            "2025-03-01",
            vec![
                set("bench", 100.0, 5, Some(8.0)),
                set("bench", 100.0, 5, Some(8.0)),
            ],
        )];
        let daily = daily_loads(&sessions, &range("2025-03-01", "2025-03-01"), &model());

        assert_eq!(daily.len(), 1);
        assert!((daily[0].tss - 2.0 * (3.0 * 6400.0) / 3600.0).abs() < 1e-9);
        assert!((daily[0].tss - 10.67).abs() < 0.01);
        assert!((daily[0].trimp - 48.0).abs() < 1e-9);
    }

    #[test]
    fn test_sessions_on_same_day_are_merged() {
        let sessions = vec![
            session("am", "2025-03-01", vec![set("squat", 100.0, 5, None)]),
            session("pm", "2025-03-01", vec![set("row", 60.0, 8, None)]),
        ];
        let daily = daily_loads(&sessions, &range("2025-02-28", "2025-03-02"), &model());

        assert_eq!(daily.len(), 3);
        assert_eq!(daily[0].tss, 0.0);
        let single = 3.0 * 70.0 * 70.0 / 3600.0;
        assert!((daily[1].tss - 2.0 * single).abs() < 1e-9);
        assert_eq!(daily[2].tss, 0.0);
    }

    #[test]
    fn test_rolling_windows_clamp_to_series_start() {
        let daily: Vec<DailyLoadPoint> = range("2025-03-01", "2025-03-03")
            .days()
            .map(|date| DailyLoadPoint {
                date,
                tss: 10.0,
                trimp: 0.0,
            })
            .collect();
        let windows = rolling_windows(&daily, &model());

        assert_eq!(windows.len(), 3);
        for window in &windows {
            assert!((window.acute_load - 10.0).abs() < 1e-9);
            assert!((window.chronic_load - 10.0).abs() < 1e-9);
            assert!((window.ratio - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_rolling_windows_are_non_negative_and_trailing() {
        let daily: Vec<DailyLoadPoint> = range("2025-01-01", "2025-02-15")
            .days()
            .enumerate()
            .map(|(index, date)| DailyLoadPoint {
                date,
                tss: if index % 3 == 0 { 12.0 } else { 0.0 },
                trimp: 0.0,
            })
            .collect();
        let windows = rolling_windows(&daily, &model());

        for (index, window) in windows.iter().enumerate() {
            assert!(window.acute_load >= 0.0);
            assert!(window.chronic_load >= 0.0);
            let start = index.saturating_sub(6);
            let expected = daily[start..=index].iter().map(|p| p.tss).sum::<f64>()
                / (index - start + 1) as f64;
            assert!((window.acute_load - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_chronic_load_gives_neutral_ratio() {
        let daily = vec![DailyLoadPoint {
            date: date("2025-03-01"),
            tss: 0.0,
            trimp: 0.0,
        }];
        let windows = rolling_windows(&daily, &model());
        assert_eq!(windows[0].ratio, 1.0);
    }

    #[test]
    fn test_acr_classification_boundaries() {
        let thresholds = AcrThresholds::default();

        assert_eq!(classify_acr(0.79, &thresholds).status, AcrStatus::Warning);
        assert_eq!(classify_acr(0.8, &thresholds).status, AcrStatus::Optimal);
        assert_eq!(classify_acr(1.3, &thresholds).status, AcrStatus::Optimal);
        assert_eq!(classify_acr(1.31, &thresholds).status, AcrStatus::Warning);
        assert_eq!(classify_acr(1.5, &thresholds).status, AcrStatus::Warning);
        assert_eq!(classify_acr(1.51, &thresholds).status, AcrStatus::Danger);
    }

    #[test]
    fn test_training_load_seeds_chronic_window_from_history() {
        let thresholds = AnalyticsThresholds::default();
        // Steady load over the four weeks before the display window.
        let sessions: Vec<WorkoutSession> = range("2025-02-01", "2025-02-28")
            .days()
            .map(|day| WorkoutSession {
                id: day.to_string(),
                date: day,
                completed: true,
                sets: vec![set("squat", 100.0, 5, Some(8.0))],
            })
            .collect();

        let report =
            training_load(&sessions, &range("2025-03-01", "2025-03-07"), &thresholds).unwrap();

        assert_eq!(report.data.len(), 7);
        assert_eq!(report.data[0].date, date("2025-03-01"));
        // The first displayed day already sees 27 loaded days in its chronic window.
        assert!(report.data[0].chronic_load > 5.0);
        assert!((report.data[0].acr - 0.89).abs() < 0.01);
        assert_eq!(report.data[6].acr, 0.0);
        assert_eq!(report.summary.status, AcrStatus::Warning);
        assert_eq!(report.summary.current_tss, 0.0);
    }

    #[test]
    fn test_training_load_empty_history() {
        let report = training_load(
            &[],
            &range("2025-03-01", "2025-03-31"),
            &AnalyticsThresholds::default(),
        )
        .unwrap();

        assert_eq!(report.data.len(), 31);
        assert!(report.data.iter().all(|p| p.tss == 0.0 && p.acr == 1.0));
        assert_eq!(report.summary.acr, 1.0);
        assert_eq!(report.summary.status, AcrStatus::Optimal);
    }

    #[test]
    fn test_training_load_is_idempotent() {
        let sessions = vec![
            session("s1", "2025-03-01", vec![set("bench", 80.0, 8, Some(7.0))]),
            session("s2", "2025-03-04", vec![set("squat", 120.0, 5, None)]),
        ];
        let window = range("2025-03-01", "2025-03-10");
        let thresholds = AnalyticsThresholds::default();

        let first = serde_json::to_string(&training_load(&sessions, &window, &thresholds).unwrap())
            .unwrap();
        let second =
            serde_json::to_string(&training_load(&sessions, &window, &thresholds).unwrap())
                .unwrap();
        assert_eq!(first, second);
    }
}

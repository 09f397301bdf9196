use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::analytics::model::{
    DateRange, SetRecord, WorkoutSession, completed_in, mean, validate_sessions,
};
use crate::error::AnalyticsError;

/// Average RPE assumed when none of the sets logged effort.
const DEFAULT_AVERAGE_RPE: f64 = 7.5;
/// Sets considered at each end of the history for progression.
const PROGRESSION_SAMPLE: usize = 10;
const WEIGHT_BAND: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RadarAxis {
    Strength,
    Volume,
    Consistency,
    Progression,
    Intensity,
    Technique,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RadarMetric {
    pub axis: RadarAxis,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarSummary {
    pub overall_score: f64,
    pub strengths: Vec<RadarAxis>,
    pub weaknesses: Vec<RadarAxis>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarReport {
    pub exercise_id: String,
    pub metrics: Vec<RadarMetric>,
    pub summary: RadarSummary,
}

struct ExerciseSet<'a> {
    date: NaiveDate,
    session_id: &'a str,
    set: &'a SetRecord,
}

pub fn performance_radar(
    sessions: &[WorkoutSession],
    range: &DateRange,
    exercise_id: &str,
) -> Result<RadarReport, AnalyticsError> {
    validate_sessions(sessions)?;

    let mut sets: Vec<ExerciseSet<'_>> = completed_in(sessions, range)
        .flat_map(|session| {
            session
                .sets
                .iter()
                .filter(move |set| set.exercise_id == exercise_id)
                .map(move |set| ExerciseSet {
                    date: session.date,
                    session_id: &session.id,
                    set,
                })
        })
        .collect();
    sets.sort_by_key(|entry| entry.date);

    if sets.is_empty() {
        return Ok(RadarReport {
            exercise_id: exercise_id.to_string(),
            metrics: axes([0.0; 6]),
            summary: RadarSummary {
                overall_score: 0.0,
                strengths: Vec::new(),
                weaknesses: Vec::new(),
            },
        });
    }

    let metrics = axes([
        strength_score(&sets),
        volume_score(&sets),
        consistency_score(&sets),
        progression_score(&sets),
        intensity_score(&sets),
        technique_score(&sets),
    ]);
    let summary = summarize(&metrics);

    Ok(RadarReport {
        exercise_id: exercise_id.to_string(),
        metrics,
        summary,
    })
}

fn axes(values: [f64; 6]) -> Vec<RadarMetric> {
    [
        RadarAxis::Strength,
        RadarAxis::Volume,
        RadarAxis::Consistency,
        RadarAxis::Progression,
        RadarAxis::Intensity,
        RadarAxis::Technique,
    ]
    .into_iter()
    .zip(values)
    .map(|(axis, value)| RadarMetric {
        axis,
        value: value.round(),
    })
    .collect()
}

fn summarize(metrics: &[RadarMetric]) -> RadarSummary {
    let values: Vec<f64> = metrics.iter().map(|metric| metric.value).collect();

    // Stable sorts keep axis order on ties.
    let mut descending = metrics.to_vec();
    descending.sort_by(|a, b| b.value.total_cmp(&a.value));
    let mut ascending = metrics.to_vec();
    ascending.sort_by(|a, b| a.value.total_cmp(&b.value));

    RadarSummary {
        overall_score: mean(&values).round(),
        strengths: descending.iter().take(2).map(|m| m.axis).collect(),
        weaknesses: ascending.iter().take(2).map(|m| m.axis).collect(),
    }
}

fn one_rep_maxes(sets: &[ExerciseSet<'_>]) -> Vec<f64> {
    sets.iter()
        .filter_map(|entry| entry.set.estimated_one_rep_max())
        .collect()
}

fn strength_score(sets: &[ExerciseSet<'_>]) -> f64 {
    let estimates = one_rep_maxes(sets);
    let average = mean(&estimates);
    if average <= 0.0 {
        return 0.0;
    }
    let best = estimates.iter().copied().fold(0.0, f64::max);
    (best / (average * 1.2) * 100.0).min(100.0)
}

fn unique_sessions(sets: &[ExerciseSet<'_>]) -> usize {
    sets.iter()
        .map(|entry| entry.session_id)
        .collect::<HashSet<_>>()
        .len()
}

fn volume_score(sets: &[ExerciseSet<'_>]) -> f64 {
    let sessions = unique_sessions(sets);
    if sessions == 0 {
        return 0.0;
    }
    let total: f64 = sets.iter().map(|entry| entry.set.volume()).sum();
    (total / sessions as f64 / 1000.0 * 10.0).min(100.0)
}

/// Sessions performed against one per week across the span of the history.
/// A history spanning a single day expects one session.
fn consistency_score(sets: &[ExerciseSet<'_>]) -> f64 {
    let (Some(first), Some(last)) = (sets.first(), sets.last()) else {
        return 0.0;
    };
    let days_between = (last.date - first.date).num_days() as f64;
    let expected = if days_between > 0.0 {
        days_between / 7.0
    } else {
        1.0
    };
    (unique_sessions(sets) as f64 / expected * 100.0).min(100.0)
}

fn progression_score(sets: &[ExerciseSet<'_>]) -> f64 {
    let estimates = one_rep_maxes(sets);
    if estimates.is_empty() {
        return 50.0;
    }
    let sample = PROGRESSION_SAMPLE.min(estimates.len());
    let early = mean(&estimates[..sample]);
    let recent = mean(&estimates[estimates.len() - sample..]);
    let improvement_rate = if early > 0.0 {
        (recent - early) / early * 100.0
    } else {
        0.0
    };
    (50.0 + improvement_rate * 2.0).clamp(0.0, 100.0)
}

fn intensity_score(sets: &[ExerciseSet<'_>]) -> f64 {
    let rpes: Vec<f64> = sets.iter().filter_map(|entry| entry.set.rpe).collect();
    let average = if rpes.is_empty() {
        DEFAULT_AVERAGE_RPE
    } else {
        mean(&rpes)
    };
    average / 10.0 * 100.0
}

/// Rep consistency within 5 kg weight bands. Bands holding a single set carry
/// no variance and are left out of the average.
fn technique_score(sets: &[ExerciseSet<'_>]) -> f64 {
    let mut bands: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for entry in sets {
        let band = (entry.set.weight / WEIGHT_BAND).floor() as i64;
        bands
            .entry(band)
            .or_default()
            .push(f64::from(entry.set.reps));
    }

    let variances: Vec<f64> = bands
        .values()
        .filter(|reps| reps.len() > 1)
        .map(|reps| {
            let average = mean(reps);
            reps.iter().map(|r| (r - average).powi(2)).sum::<f64>() / reps.len() as f64
        })
        .collect();

    (100.0 - mean(&variances) * 10.0).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::model::fixtures::*;

    fn value(report: &RadarReport, axis: RadarAxis) -> f64 {
        report
            .metrics
            .iter()
            .find(|metric| metric.axis == axis)
            .map(|metric| metric.value)
            .unwrap()
    }

    fn weekly_bench(weeks: usize) -> Vec<WorkoutSession> {
        (0..weeks)
            .map(|week| {
                let day = date("2025-01-06") + chrono::Duration::weeks(week as i64);
                WorkoutSession {
                    id: format!("w{}", week),
                    date: day,
                    completed: true,
                    sets: vec![
                        set("bench", 100.0 + week as f64 * 2.5, 5, Some(8.0)),
                        set("bench", 100.0 + week as f64 * 2.5, 5, Some(8.0)),
                    ],
                }
            })
            .collect()
    }

    #[test]
    fn test_empty_history_scores_zero() {
        let report =
            performance_radar(&[], &range("2025-01-01", "2025-12-31"), "bench").unwrap();

        assert_eq!(report.metrics.len(), 6);
        assert!(report.metrics.iter().all(|metric| metric.value == 0.0));
        assert_eq!(report.summary.overall_score, 0.0);
        assert!(report.summary.strengths.is_empty());
        assert!(report.summary.weaknesses.is_empty());
    }

    #[test]
    fn test_weekly_progressing_lifter() {
        let sessions = weekly_bench(12);
        let report =
            performance_radar(&sessions, &range("2025-01-01", "2025-12-31"), "bench").unwrap();

        // 12 sessions over 77 days is more than one per week.
        assert_eq!(value(&report, RadarAxis::Consistency), 100.0);
        assert_eq!(value(&report, RadarAxis::Intensity), 80.0);
        // Identical reps in every weight band.
        assert_eq!(value(&report, RadarAxis::Technique), 100.0);
        assert!(value(&report, RadarAxis::Progression) > 50.0);
        // 2 sets * ~5 reps * ~114 kg per session.
        assert!((value(&report, RadarAxis::Volume) - 11.0).abs() <= 1.0);
    }

    #[test]
    fn test_strength_axis() {
        let sessions = vec![session(
            "s1",
            "2025-03-01",
            vec![set("squat", 100.0, 1, None), set("squat", 100.0, 1, None)],
        )];
        let report =
            performance_radar(&sessions, &range("2025-03-01", "2025-03-01"), "squat").unwrap();

        // max / (avg * 1.2) = 1 / 1.2
        assert_eq!(value(&report, RadarAxis::Strength), 83.0);
        assert_eq!(value(&report, RadarAxis::Intensity), 75.0);
        assert_eq!(value(&report, RadarAxis::Progression), 50.0);
        assert_eq!(value(&report, RadarAxis::Consistency), 100.0);
    }

    #[test]
    fn test_technique_ignores_single_set_bands() {
        let sessions = vec![session(
            "s1",
            "2025-03-01",
            vec![
                set("row", 60.0, 8, None),
                set("row", 61.0, 12, None),
                set("row", 80.0, 3, None),
            ],
        )];
        let report =
            performance_radar(&sessions, &range("2025-03-01", "2025-03-01"), "row").unwrap();

        // Band 60-65 has reps 8 and 12 (variance 4); the 80 kg band is excluded.
        assert_eq!(value(&report, RadarAxis::Technique), 60.0);
    }

    #[test]
    fn test_summary_ties_keep_axis_order() {
        let metrics = axes([50.0, 50.0, 50.0, 50.0, 50.0, 50.0]);
        let summary = summarize(&metrics);

        assert_eq!(summary.strengths, vec![RadarAxis::Strength, RadarAxis::Volume]);
        assert_eq!(summary.weaknesses, vec![RadarAxis::Strength, RadarAxis::Volume]);
        assert_eq!(summary.overall_score, 50.0);
    }

    #[test]
    fn test_summary_picks_extremes() {
        let metrics = axes([90.0, 10.0, 70.0, 20.0, 95.0, 60.0]);
        let summary = summarize(&metrics);

        assert_eq!(summary.strengths, vec![RadarAxis::Intensity, RadarAxis::Strength]);
        assert_eq!(summary.weaknesses, vec![RadarAxis::Volume, RadarAxis::Progression]);
        assert_eq!(summary.overall_score, 58.0);
    }
}

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::analytics::model::{
    DateRange, WorkoutSession, completed_in, mean, round2, validate_sessions,
};
use crate::analytics::thresholds::ComparisonThresholds;
use crate::error::AnalyticsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMetric {
    Volume,
    Workouts,
    AverageIntensity,
    PersonalRecords,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodTrend {
    Improving,
    Stable,
    Declining,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStats {
    pub total_volume: f64,
    pub workout_count: u32,
    /// Mean RPE of the sets that logged one; 0 when none did.
    pub average_intensity: f64,
    pub personal_records: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricComparison {
    pub metric: ComparisonMetric,
    pub current: f64,
    pub previous: f64,
    pub change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallTrend {
    pub status: PeriodTrend,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    pub current_range: DateRange,
    pub previous_range: DateRange,
    pub data: Vec<MetricComparison>,
    pub overall_trend: OverallTrend,
}

/// Best estimated 1RM per exercise over every completed session strictly
/// before `before`, built in a single pass.
pub fn historical_bests(sessions: &[WorkoutSession], before: NaiveDate) -> HashMap<String, f64> {
    let mut bests: HashMap<String, f64> = HashMap::new();
    for session in sessions
        .iter()
        .filter(|session| session.completed && session.date < before)
    {
        for set in &session.sets {
            let Some(estimate) = set.estimated_one_rep_max() else {
                continue;
            };
            bests
                .entry(set.exercise_id.clone())
                .and_modify(|best| *best = best.max(estimate))
                .or_insert(estimate);
        }
    }
    bests
}

/// Exercises whose best estimated 1RM in `range` beats `prior_bests`, or that
/// have no prior history at all.
pub fn count_personal_records(
    sessions: &[WorkoutSession],
    range: &DateRange,
    prior_bests: &HashMap<String, f64>,
) -> u32 {
    let mut current_bests: HashMap<&str, f64> = HashMap::new();
    for session in completed_in(sessions, range) {
        for set in &session.sets {
            if let Some(estimate) = set.estimated_one_rep_max() {
                let best = current_bests.entry(set.exercise_id.as_str()).or_insert(estimate);
                *best = best.max(estimate);
            }
        }
    }

    current_bests
        .into_iter()
        .filter(|(exercise_id, best)| {
            prior_bests
                .get(*exercise_id)
                .is_none_or(|prior| best > prior)
        })
        .count() as u32
}

pub fn period_stats(sessions: &[WorkoutSession], range: &DateRange) -> PeriodStats {
    let prior_bests = historical_bests(sessions, range.start);

    let mut stats = PeriodStats::default();
    let mut rpes = Vec::new();
    for session in completed_in(sessions, range) {
        stats.workout_count += 1;
        for set in &session.sets {
            stats.total_volume += set.volume();
            rpes.extend(set.rpe);
        }
    }
    stats.average_intensity = mean(&rpes);
    stats.personal_records = count_personal_records(sessions, range, &prior_bests);
    stats
}

/// `(current - previous) / previous * 100`, or 0 when there is no baseline.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        0.0
    } else {
        (current - previous) / previous * 100.0
    }
}

pub fn classify_period(average_change: f64, thresholds: &ComparisonThresholds) -> OverallTrend {
    let (status, message) = if average_change > thresholds.change_percent {
        (
            PeriodTrend::Improving,
            "Great progress! Your training is trending up compared to the previous period.",
        )
    } else if average_change < -thresholds.change_percent {
        (
            PeriodTrend::Declining,
            "Training dropped compared to the previous period. Consider getting back on track.",
        )
    } else {
        (
            PeriodTrend::Stable,
            "Your training is consistent with the previous period.",
        )
    };
    OverallTrend {
        status,
        message: message.to_string(),
    }
}

pub fn period_comparison(
    sessions: &[WorkoutSession],
    current: &DateRange,
    previous: &DateRange,
    thresholds: &ComparisonThresholds,
) -> Result<ComparisonReport, AnalyticsError> {
    validate_sessions(sessions)?;
    if previous.end + Duration::days(1) != current.start
        || previous.len_days() != current.len_days()
    {
        return Err(AnalyticsError::invalid_input(format!(
            "comparison periods must be adjacent and of equal length ({} to {} vs {} to {})",
            previous.start, previous.end, current.start, current.end
        )));
    }

    let now = period_stats(sessions, current);
    let before = period_stats(sessions, previous);

    let data: Vec<MetricComparison> = [
        (ComparisonMetric::Volume, now.total_volume, before.total_volume),
        (
            ComparisonMetric::Workouts,
            f64::from(now.workout_count),
            f64::from(before.workout_count),
        ),
        (
            ComparisonMetric::AverageIntensity,
            now.average_intensity,
            before.average_intensity,
        ),
        (
            ComparisonMetric::PersonalRecords,
            f64::from(now.personal_records),
            f64::from(before.personal_records),
        ),
    ]
    .into_iter()
    .map(|(metric, current, previous)| MetricComparison {
        metric,
        current: round2(current),
        previous: round2(previous),
        change: percent_change(current, previous),
    })
    .collect();

    let changes: Vec<f64> = data.iter().map(|metric| metric.change).collect();
    let overall_trend = classify_period(mean(&changes), thresholds);

    Ok(ComparisonReport {
        current_range: *current,
        previous_range: *previous,
        data: data
            .into_iter()
            .map(|metric| MetricComparison {
                change: round2(metric.change),
                ..metric
            })
            .collect(),
        overall_trend,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::model::fixtures::*;

    #[test]
    fn test_percent_change_guards() {
        assert_eq!(percent_change(50.0, 0.0), 0.0);
        assert_eq!(percent_change(0.0, 0.0), 0.0);
        assert_eq!(percent_change(80.0, 80.0), 0.0);
        assert_eq!(percent_change(150.0, 100.0), 50.0);
    }

    #[test]
    fn test_first_time_exercise_is_a_pr() {
        let sessions = vec![session("s1", "2025-03-05", vec![set("deadlift", 140.0, 5, None)])];
        let window = range("2025-03-01", "2025-03-31");
        let bests = historical_bests(&sessions, window.start);

        assert!(bests.is_empty());
        assert_eq!(count_personal_records(&sessions, &window, &bests), 1);
    }

    #[test]
    fn test_lower_estimate_later_is_not_a_pr() {
        let sessions = vec![
            session("s1", "2025-02-10", vec![set("deadlift", 140.0, 5, None)]),
            session("s2", "2025-03-05", vec![set("deadlift", 130.0, 5, None)]),
        ];
        let window = range("2025-03-01", "2025-03-31");
        let bests = historical_bests(&sessions, window.start);

        assert_eq!(bests.len(), 1);
        assert_eq!(count_personal_records(&sessions, &window, &bests), 0);
    }

    #[test]
    fn test_higher_estimate_is_a_pr() {
        let sessions = vec![
            session("s1", "2025-02-10", vec![set("bench", 100.0, 5, None)]),
            session(
                "s2",
                "2025-03-05",
                vec![set("bench", 105.0, 5, None), set("row", 60.0, 10, None)],
            ),
        ];
        let stats = period_stats(&sessions, &range("2025-03-01", "2025-03-31"));

        assert_eq!(stats.personal_records, 2);
        assert_eq!(stats.workout_count, 1);
        assert_eq!(stats.total_volume, 1125.0);
        assert_eq!(stats.average_intensity, 0.0);
    }

    #[test]
    fn test_period_comparison_improving() {
        let sessions = vec![
            session("p1", "2025-02-10", vec![set("squat", 100.0, 5, Some(7.0))]),
            session("c1", "2025-03-03", vec![set("squat", 110.0, 5, Some(8.0))]),
            session("c2", "2025-03-10", vec![set("squat", 110.0, 5, Some(8.0))]),
        ];
        let current = range("2025-03-01", "2025-03-28");
        let previous = current.preceding();

        let report = period_comparison(
            &sessions,
            &current,
            &previous,
            &ComparisonThresholds::default(),
        )
        .unwrap();

        assert_eq!(report.data.len(), 4);
        assert_eq!(report.data[0].metric, ComparisonMetric::Volume);
        assert_eq!(report.data[0].current, 1100.0);
        assert_eq!(report.data[0].previous, 500.0);
        assert_eq!(report.data[0].change, 120.0);
        assert_eq!(report.data[1].change, 100.0);
        assert_eq!(report.overall_trend.status, PeriodTrend::Improving);
    }

    #[test]
    fn test_period_comparison_identical_periods_are_stable() {
        let sessions = vec![
            session("p1", "2025-02-10", vec![set("squat", 100.0, 5, Some(8.0))]),
            session("c1", "2025-03-10", vec![set("squat", 100.0, 5, Some(8.0))]),
        ];
        let current = range("2025-03-01", "2025-03-28");

        let report = period_comparison(
            &sessions,
            &current,
            &current.preceding(),
            &ComparisonThresholds::default(),
        )
        .unwrap();

        // Same volume, count and RPE; the PR count drops from 1 to 0.
        assert_eq!(report.data[0].change, 0.0);
        assert_eq!(report.data[1].change, 0.0);
        assert_eq!(report.data[2].change, 0.0);
        assert_eq!(report.data[3].change, -100.0);
        assert_eq!(report.overall_trend.status, PeriodTrend::Declining);
    }

    #[test]
    fn test_period_comparison_empty_history() {
        let current = range("2025-03-01", "2025-03-28");
        let report = period_comparison(
            &[],
            &current,
            &current.preceding(),
            &ComparisonThresholds::default(),
        )
        .unwrap();

        assert!(report.data.iter().all(|metric| metric.change == 0.0));
        assert_eq!(report.overall_trend.status, PeriodTrend::Stable);
    }

    #[test]
    fn test_period_comparison_rejects_gaps() {
        let result = period_comparison(
            &[],
            &range("2025-03-01", "2025-03-28"),
            &range("2025-01-01", "2025-01-28"),
            &ComparisonThresholds::default(),
        );
        assert!(matches!(result, Err(AnalyticsError::InvalidInput(_))));
    }
}

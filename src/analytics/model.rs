use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::analytics::estimator;
use crate::error::AnalyticsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MuscleGroup {
    Legs,
    Push,
    Pull,
    Core,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub muscle_group: MuscleGroup,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetRecord {
    pub exercise_id: String,
    pub weight: f64,
    pub reps: u32,
    pub rpe: Option<f64>,
}

impl SetRecord {
    pub fn volume(&self) -> f64 {
        self.weight * f64::from(self.reps)
    }

    /// Estimated 1RM, or `None` for sets without reps.
    pub fn estimated_one_rep_max(&self) -> Option<f64> {
        estimator::estimated_one_rep_max(self.weight, self.reps).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub id: String,
    pub date: NaiveDate,
    pub completed: bool,
    pub sets: Vec<SetRecord>,
}

/// Inclusive calendar-day range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AnalyticsError> {
        if start > end {
            return Err(AnalyticsError::invalid_input(format!(
                "date range starts after it ends ({} > {})",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let start = self.start;
        (0..self.len_days()).map(move |offset| start + Duration::days(offset))
    }

    pub fn extended_back(&self, days: i64) -> Self {
        Self {
            start: self.start - Duration::days(days),
            end: self.end,
        }
    }

    /// The equal-length range ending the day before this one starts.
    pub fn preceding(&self) -> Self {
        let length = self.len_days();
        let end = self.start - Duration::days(1);
        Self {
            start: end - Duration::days(length - 1),
            end,
        }
    }
}

pub fn validate_sessions(sessions: &[WorkoutSession]) -> Result<(), AnalyticsError> {
    for session in sessions {
        for set in &session.sets {
            if !set.weight.is_finite() || set.weight < 0.0 {
                return Err(AnalyticsError::invalid_input(format!(
                    "session {} has a set with invalid weight {}",
                    session.id, set.weight
                )));
            }
            if let Some(rpe) = set.rpe
                && !(0.0..=10.0).contains(&rpe)
            {
                return Err(AnalyticsError::invalid_input(format!(
                    "session {} has a set with RPE {} outside 0-10",
                    session.id, rpe
                )));
            }
        }
    }
    Ok(())
}

pub fn completed_in<'a>(
    sessions: &'a [WorkoutSession],
    range: &'a DateRange,
) -> impl Iterator<Item = &'a WorkoutSession> + 'a {
    sessions
        .iter()
        .filter(move |session| session.completed && range.contains(session.date))
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_date_range_rejects_inverted_bounds() {
        let result = DateRange::new(date("2025-03-10"), date("2025-03-01"));
        assert!(matches!(result, Err(AnalyticsError::InvalidInput(_))));
    }

    #[test]
    fn test_date_range_days_and_preceding() {
        let current = range("2025-03-01", "2025-03-07");
        assert_eq!(current.len_days(), 7);
        assert_eq!(current.days().count(), 7);

        let previous = current.preceding();
        assert_eq!(previous, range("2025-02-22", "2025-02-28"));
        assert_eq!(previous.len_days(), current.len_days());
    }

    #[test]
    fn test_validate_sessions() {
        let valid = vec![session("s1", "2025-03-01", vec![set("bench", 100.0, 5, Some(8.0))])];
        assert!(validate_sessions(&valid).is_ok());

        let negative = vec![session("s1", "2025-03-01", vec![set("bench", -5.0, 5, None)])];
        assert!(matches!(
            validate_sessions(&negative),
            Err(AnalyticsError::InvalidInput(_))
        ));

        let bad_rpe = vec![session("s1", "2025-03-01", vec![set("bench", 50.0, 5, Some(11.0))])];
        assert!(validate_sessions(&bad_rpe).is_err());
    }

    #[test]
    fn test_completed_in_skips_incomplete_and_out_of_range() {
        let mut draft = session("s2", "2025-03-02", vec![]);
        draft.completed = false;
        let sessions = vec![
            session("s1", "2025-03-01", vec![]),
            draft,
            session("s3", "2025-04-01", vec![]),
        ];
        let window = range("2025-03-01", "2025-03-31");
        let ids: Vec<_> = completed_in(&sessions, &window)
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, vec!["s1"]);
    }
}

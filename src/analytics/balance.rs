use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::analytics::model::{
    DateRange, Exercise, MuscleGroup, WorkoutSession, completed_in, round2, validate_sessions,
};
use crate::analytics::thresholds::BalanceThresholds;
use crate::error::AnalyticsError;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MuscleGroupVolume {
    pub muscle_group: MuscleGroup,
    pub volume: f64,
    pub sets: u32,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImbalanceKind {
    PushPull,
    LegsUpper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImbalanceSeverity {
    Minor,
    Major,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Imbalance {
    pub kind: ImbalanceKind,
    /// Stronger side over weaker side; `None` when the weaker side has no volume.
    pub ratio: Option<f64>,
    pub severity: ImbalanceSeverity,
    pub message: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BalanceStatus {
    Balanced,
    MinorImbalance,
    MajorImbalance,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceAnalysis {
    pub status: BalanceStatus,
    pub imbalances: Vec<Imbalance>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceReport {
    pub muscle_groups: Vec<MuscleGroupVolume>,
    pub total_volume: f64,
    pub total_sets: u32,
    pub balance_analysis: BalanceAnalysis,
}

pub fn muscle_balance(
    sessions: &[WorkoutSession],
    catalog: &HashMap<String, Exercise>,
    range: &DateRange,
    thresholds: &BalanceThresholds,
) -> Result<BalanceReport, AnalyticsError> {
    validate_sessions(sessions)?;

    let mut totals: BTreeMap<MuscleGroup, (f64, u32)> = BTreeMap::new();
    for session in completed_in(sessions, range) {
        for set in &session.sets {
            let group = catalog
                .get(&set.exercise_id)
                .map_or(MuscleGroup::Other, |exercise| exercise.muscle_group);
            let entry = totals.entry(group).or_default();
            entry.0 += set.volume();
            entry.1 += 1;
        }
    }

    let total_volume: f64 = totals.values().map(|(volume, _)| volume).sum();
    let total_sets: u32 = totals.values().map(|(_, sets)| sets).sum();
    let volume_of = |group: MuscleGroup| totals.get(&group).map_or(0.0, |(volume, _)| *volume);

    let mut muscle_groups: Vec<MuscleGroupVolume> = totals
        .iter()
        .map(|(group, (volume, sets))| MuscleGroupVolume {
            muscle_group: *group,
            volume: round2(*volume),
            sets: *sets,
            percentage: if total_volume > 0.0 {
                round2(volume / total_volume * 100.0)
            } else {
                0.0
            },
        })
        .collect();
    muscle_groups.sort_by(|a, b| b.volume.total_cmp(&a.volume));

    let imbalances: Vec<Imbalance> = [
        push_pull_imbalance(volume_of(MuscleGroup::Push), volume_of(MuscleGroup::Pull), thresholds),
        leg_imbalance(
            volume_of(MuscleGroup::Legs),
            volume_of(MuscleGroup::Push) + volume_of(MuscleGroup::Pull),
            thresholds,
        ),
    ]
    .into_iter()
    .flatten()
    .collect();

    let status = if imbalances.is_empty() {
        BalanceStatus::Balanced
    } else if imbalances
        .iter()
        .any(|imbalance| imbalance.severity == ImbalanceSeverity::Major)
    {
        BalanceStatus::MajorImbalance
    } else {
        BalanceStatus::MinorImbalance
    };

    Ok(BalanceReport {
        muscle_groups,
        total_volume: round2(total_volume),
        total_sets,
        balance_analysis: BalanceAnalysis { status, imbalances },
    })
}

fn side_ratio(stronger: f64, weaker: f64) -> Option<f64> {
    (weaker > 0.0).then(|| stronger / weaker)
}

fn severity(factor: Option<f64>, thresholds: &BalanceThresholds) -> ImbalanceSeverity {
    if factor.is_none_or(|factor| factor > thresholds.major_ratio) {
        ImbalanceSeverity::Major
    } else {
        ImbalanceSeverity::Minor
    }
}

fn push_pull_imbalance(push: f64, pull: f64, thresholds: &BalanceThresholds) -> Option<Imbalance> {
    if push <= 0.0 && pull <= 0.0 {
        return None;
    }

    let (stronger, weaker, message, recommendation) = if push >= pull {
        (
            push,
            pull,
            "Push volume outweighs pull volume",
            "Add more pulling work such as rows and pull-ups.",
        )
    } else {
        (
            pull,
            push,
            "Pull volume outweighs push volume",
            "Add more pressing work such as bench and overhead press.",
        )
    };

    let ratio = side_ratio(stronger, weaker);
    if ratio.is_some_and(|ratio| ratio <= thresholds.push_pull_ratio) {
        return None;
    }

    Some(Imbalance {
        kind: ImbalanceKind::PushPull,
        ratio: ratio.map(round2),
        severity: severity(ratio, thresholds),
        message: message.to_string(),
        recommendation: recommendation.to_string(),
    })
}

/// Legs are graded by how far they fall short of the minimum share: the
/// imbalance is major once the minimum is more than `major_ratio` times the
/// actual leg volume.
fn leg_imbalance(legs: f64, upper: f64, thresholds: &BalanceThresholds) -> Option<Imbalance> {
    let minimum = thresholds.min_leg_share * upper;
    if upper <= 0.0 || legs >= minimum {
        return None;
    }

    Some(Imbalance {
        kind: ImbalanceKind::LegsUpper,
        ratio: side_ratio(upper, legs).map(round2),
        severity: severity(side_ratio(minimum, legs), thresholds),
        message: "Leg volume is low compared to upper body volume".to_string(),
        recommendation: "Increase leg work such as squats, deadlifts and lunges.".to_string(),
    })
}

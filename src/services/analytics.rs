use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::analytics::balance::{self, BalanceReport};
use crate::analytics::comparison::{self, ComparisonReport};
use crate::analytics::load::{self, TrainingLoadReport};
use crate::analytics::radar::{self, RadarReport};
use crate::analytics::recovery::{self, RecoveryReport, RecoverySignalSource};
use crate::analytics::thresholds::AnalyticsThresholds;
use crate::analytics::trend::{self, TrendMetric, TrendReport};
use crate::error::AnalyticsError;
use crate::services::data_loader::{History, HistoryCache};
use crate::services::periods;

/// One request: fetch history once, then run the pure engine over it.
#[derive(Clone)]
pub struct AnalyticsService {
    history: HistoryCache,
    recovery_source: Arc<dyn RecoverySignalSource>,
    thresholds: Arc<AnalyticsThresholds>,
}

impl AnalyticsService {
    pub fn new(
        history: HistoryCache,
        recovery_source: Arc<dyn RecoverySignalSource>,
        thresholds: AnalyticsThresholds,
    ) -> Self {
        Self {
            history,
            recovery_source,
            thresholds: Arc::new(thresholds),
        }
    }

    async fn load(&self) -> Result<Arc<History>, AnalyticsError> {
        self.history.get().await.map_err(|e| {
            tracing::error!(error = %e, "failed to load workout history");
            AnalyticsError::Fetch(e)
        })
    }

    pub async fn refresh_history(&self) -> Result<usize, AnalyticsError> {
        let history = self.history.refresh().await.map_err(|e| {
            tracing::error!(error = %e, "failed to refresh workout history");
            AnalyticsError::Fetch(e)
        })?;
        Ok(history.sessions.len())
    }

    pub async fn training_load(
        &self,
        period: &str,
        today: NaiveDate,
    ) -> Result<TrainingLoadReport, AnalyticsError> {
        let range = periods::lookback_range(period, today)?;
        let history = self.load().await?;

        let report = load::training_load(&history.sessions, &range, &self.thresholds)?;
        info!(
            %period,
            days = report.data.len(),
            acr = report.summary.acr,
            status = ?report.summary.status,
            "analytics.training_load"
        );
        Ok(report)
    }

    pub async fn trend(
        &self,
        metric: TrendMetric,
        period: &str,
        exercise_id: Option<&str>,
        today: NaiveDate,
    ) -> Result<TrendReport, AnalyticsError> {
        let range = periods::lookback_range(period, today)?;
        let history = self.load().await?;
        if let Some(exercise_id) = exercise_id {
            ensure_known_exercise(&history, exercise_id)?;
        }

        let report = match metric {
            TrendMetric::Recovery => {
                let series = recovery::recovery_series(
                    &history.sessions,
                    &range,
                    self.recovery_source.as_ref(),
                    &self.thresholds,
                )?;
                trend::recovery_trend_report(series, &self.thresholds.trend)
            }
            _ => trend::analyze_trend(
                metric,
                &history.sessions,
                &range,
                exercise_id,
                &self.thresholds.trend,
            )?,
        };
        info!(
            ?metric,
            %period,
            points = report.series.len(),
            trend = ?report.result.trend,
            "analytics.trend"
        );
        Ok(report)
    }

    pub async fn recovery(
        &self,
        period: &str,
        today: NaiveDate,
    ) -> Result<RecoveryReport, AnalyticsError> {
        let range = periods::lookback_range(period, today)?;
        let history = self.load().await?;

        let report = recovery::recovery_report(
            &history.sessions,
            &range,
            self.recovery_source.as_ref(),
            &self.thresholds,
        )?;
        info!(
            %period,
            days = report.data.len(),
            average_recovery = report.average_recovery,
            trend = ?report.trend,
            "analytics.recovery"
        );
        Ok(report)
    }

    pub async fn radar(
        &self,
        exercise_id: &str,
        period: &str,
        today: NaiveDate,
    ) -> Result<RadarReport, AnalyticsError> {
        let range = periods::lookback_range(period, today)?;
        let history = self.load().await?;
        ensure_known_exercise(&history, exercise_id)?;

        let report = radar::performance_radar(&history.sessions, &range, exercise_id)?;
        info!(
            %exercise_id,
            %period,
            overall_score = report.summary.overall_score,
            "analytics.radar"
        );
        Ok(report)
    }

    pub async fn balance(
        &self,
        period: &str,
        today: NaiveDate,
    ) -> Result<BalanceReport, AnalyticsError> {
        let range = periods::lookback_range(period, today)?;
        let history = self.load().await?;

        let report = balance::muscle_balance(
            &history.sessions,
            &history.catalog,
            &range,
            &self.thresholds.balance,
        )?;
        info!(
            %period,
            total_sets = report.total_sets,
            status = ?report.balance_analysis.status,
            "analytics.balance"
        );
        Ok(report)
    }

    pub async fn comparison(
        &self,
        period: &str,
        today: NaiveDate,
    ) -> Result<ComparisonReport, AnalyticsError> {
        let (current, previous) = periods::comparison_ranges(period, today)?;
        let history = self.load().await?;

        let report = comparison::period_comparison(
            &history.sessions,
            &current,
            &previous,
            &self.thresholds.comparison,
        )?;
        info!(
            %period,
            status = ?report.overall_trend.status,
            "analytics.comparison"
        );
        Ok(report)
    }
}

fn ensure_known_exercise(history: &History, exercise_id: &str) -> Result<(), AnalyticsError> {
    if history.catalog.contains_key(exercise_id) {
        Ok(())
    } else {
        Err(AnalyticsError::NotFound(format!("exercise {}", exercise_id)))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::Utc;

    use super::*;
    use crate::analytics::model::{Exercise, MuscleGroup};

    fn history_with(ids: &[&str]) -> History {
        History {
            sessions: Vec::new(),
            catalog: ids
                .iter()
                .map(|id| {
                    (
                        id.to_string(),
                        Exercise {
                            id: id.to_string(),
                            name: id.to_string(),
                            muscle_group: MuscleGroup::Push,
                        },
                    )
                })
                .collect::<HashMap<_, _>>(),
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn test_ensure_known_exercise() {
        let history = history_with(&["bench"]);

        assert!(ensure_known_exercise(&history, "bench").is_ok());
        assert!(matches!(
            ensure_known_exercise(&history, "curl"),
            Err(AnalyticsError::NotFound(_))
        ));
    }
}

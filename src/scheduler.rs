use tokio_cron_scheduler::{Job, JobScheduler};

use crate::services::analytics::AnalyticsService;

pub async fn start_scheduler(
    schedule: &str,
    analytics_service: AnalyticsService,
) -> anyhow::Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    scheduler
        .add(Job::new_async(schedule, move |_uuid, _l| {
            let analytics_service = analytics_service.clone();
            Box::pin(async move {
                if let Err(e) = run_sync(&analytics_service).await {
                    tracing::error!(error = %e, "cron.sync_failed");
                }
            })
        })?)
        .await?;

    scheduler.start().await?;
    tracing::info!(%schedule, "cron.scheduled");
    Ok(scheduler)
}

pub async fn run_sync(analytics_service: &AnalyticsService) -> anyhow::Result<()> {
    tracing::info!("cron.sync_started");

    let session_count = analytics_service.refresh_history().await?;

    tracing::info!(session_count, "cron.sync_completed");
    Ok(())
}

use std::env;
use std::path::PathBuf;

use anyhow::Context;

use crate::analytics::thresholds::AnalyticsThresholds;

#[derive(Debug, Clone, PartialEq)]
pub enum RecoverySourceConfig {
    Simulated { seed: u64 },
    Measured { telemetry_path: PathBuf },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub hevy_api_key: String,
    pub hevy_api_url: String,
    pub api_token: String,
    pub port: String,
    pub sync_cron: String,
    pub history_ttl_minutes: i64,
    pub recovery_source: RecoverySourceConfig,
    pub thresholds: AnalyticsThresholds,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let hevy_api_key = env::var("HEVY_API_KEY").context("HEVY_API_KEY must be set")?;
        let api_token = env::var("API_TOKEN").context("API_TOKEN must be set")?;
        let port = env::var("PORT").context("PORT must be set")?;
        let base_url =
            env::var("BASE_URL").unwrap_or_else(|_| "https://api.hevyapp.com".to_string());
        let sync_cron = env::var("SYNC_CRON").unwrap_or_else(|_| "0 */15 * * * *".to_string());
        let history_ttl_minutes = match env::var("HISTORY_TTL_MINUTES") {
            Ok(value) => value
                .parse()
                .with_context(|| format!("Invalid HISTORY_TTL_MINUTES: {}", value))?,
            Err(_) => 30,
        };

        let recovery_source = parse_recovery_source(
            env::var("RECOVERY_SOURCE").ok().as_deref(),
            env::var("RECOVERY_SEED").ok().as_deref(),
            env::var("RECOVERY_TELEMETRY_PATH").ok(),
        )?;

        let thresholds = match env::var("ANALYTICS_THRESHOLDS_PATH") {
            Ok(path) => load_thresholds(&path)?,
            Err(_) => AnalyticsThresholds::default(),
        };

        Ok(Self {
            hevy_api_key,
            api_token,
            port,
            hevy_api_url: base_url,
            sync_cron,
            history_ttl_minutes,
            recovery_source,
            thresholds,
        })
    }
}

fn parse_recovery_source(
    kind: Option<&str>,
    seed: Option<&str>,
    telemetry_path: Option<String>,
) -> anyhow::Result<RecoverySourceConfig> {
    match kind.unwrap_or("simulated") {
        "simulated" => {
            let seed = match seed {
                Some(value) => value
                    .parse()
                    .with_context(|| format!("Invalid RECOVERY_SEED: {}", value))?,
                None => 42,
            };
            Ok(RecoverySourceConfig::Simulated { seed })
        }
        "measured" => {
            let telemetry_path = telemetry_path.ok_or_else(|| {
                anyhow::anyhow!("RECOVERY_TELEMETRY_PATH must be set when RECOVERY_SOURCE=measured")
            })?;
            Ok(RecoverySourceConfig::Measured {
                telemetry_path: PathBuf::from(telemetry_path),
            })
        }
        other => Err(anyhow::anyhow!("Unknown RECOVERY_SOURCE: {}", other)),
    }
}

fn load_thresholds(path: &str) -> anyhow::Result<AnalyticsThresholds> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read thresholds file {}", path))?;
    serde_json::from_str(&body).map_err(|e| anyhow::anyhow!("Failed to parse thresholds: {}", e))
}

use crate::clients::models::responses::{ExerciseTemplatesListResponse, WorkoutsListResponse};
use crate::config::Config;
use anyhow::Result;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

const WORKOUTS_ENDPOINT: &str = "/v1/workouts";
const EXERCISE_TEMPLATES_ENDPOINT: &str = "/v1/exercise_templates";

#[derive(Clone)]
pub struct HevyClient {
    http: Client,
    base: Url,
    api_key: String,
}

impl HevyClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
            base: Url::parse(&config.hevy_api_url)?,
            api_key: config.hevy_api_key.clone(),
        })
    }

    pub async fn get_workouts(&self, page: i32, page_size: i32) -> Result<WorkoutsListResponse> {
        self.get_page(WORKOUTS_ENDPOINT, page, page_size)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to fetch workouts page {}: {}", page, e))
    }

    pub async fn get_exercise_templates(
        &self,
        page: i32,
        page_size: i32,
    ) -> Result<ExerciseTemplatesListResponse> {
        self.get_page(EXERCISE_TEMPLATES_ENDPOINT, page, page_size)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to fetch exercise templates page {}: {}", page, e))
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        page: i32,
        page_size: i32,
    ) -> Result<T> {
        let mut url = self.base.join(endpoint)?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("pageSize", &page_size.to_string());

        tracing::debug!(%url, "hevy.request");

        let response = self
            .http
            .get(url)
            .header("api-key", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await?;
            return Err(anyhow::anyhow!(
                "API request failed with status {}: {}",
                status,
                body
            ));
        }

        let body = response.text().await?;
        let parsed: T = serde_json::from_str(&body)
            .map_err(|e| anyhow::anyhow!("Failed to parse response: {}", e))?;
        Ok(parsed)
    }
}

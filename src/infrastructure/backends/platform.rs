#[cfg(test)]
#[path = "platform_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Backend;
use crate::domain::models::BackendName;
use crate::domain::models::GenerationRequest;
use crate::domain::models::GenerationResult;
use crate::domain::models::GenerationStatus;
use crate::domain::models::SubmitOutcome;
use crate::infrastructure::api::ApiClient;

/// A submit answer is one of two shapes: a task id when the service queued
/// the work, or the finished image inline when it had capacity to answer
/// synchronously.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SubmitResponse {
    task_id: Option<String>,
    #[serde(flatten)]
    result: GenerationResult,
}

/// The platform's portrait-generation service.
pub struct Platform {
    url: String,
    api: ApiClient,
    timeout: String,
}

impl Default for Platform {
    fn default() -> Platform {
        return Platform {
            url: Config::get(ConfigKey::ApiUrl),
            api: ApiClient::default(),
            timeout: Config::get(ConfigKey::HealthCheckTimeout),
        };
    }
}

#[async_trait]
impl Backend for Platform {
    fn name(&self) -> BackendName {
        return BackendName::Platform;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        let res = reqwest::Client::new()
            .get(&self.url)
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?))
            .send()
            .await;

        if res.is_err() {
            tracing::error!(error = ?res.unwrap_err(), "The platform is not reachable");
            bail!("The platform is not reachable");
        }

        let res = res.unwrap();
        if res.status().as_u16() >= 500 {
            tracing::error!(status = res.status().as_u16(), "Platform health check failed");
            bail!("Platform health check failed");
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn submit(&self, request: GenerationRequest) -> Result<SubmitOutcome> {
        let res = self
            .api
            .post("/generate-image", &serde_json::to_value(&request)?)
            .await?;

        if !res.status().is_success() {
            tracing::error!(
                status = res.status().as_u16(),
                "Failed to submit a generation request"
            );
            bail!("The portrait service rejected the generation request");
        }

        let payload = res.json::<SubmitResponse>().await?;
        tracing::debug!(body = ?payload, "Submit response");

        if let Some(task_id) = payload.task_id {
            return Ok(SubmitOutcome::Accepted(task_id));
        }

        return Ok(SubmitOutcome::Completed(payload.result));
    }

    #[allow(clippy::implicit_return)]
    async fn status(&self, server_task_id: &str) -> Result<GenerationStatus> {
        let res = self
            .api
            .get(&format!("/generation-status/{server_task_id}"))
            .await?;

        if !res.status().is_success() {
            tracing::error!(
                status = res.status().as_u16(),
                task_id = server_task_id,
                "Failed to fetch generation status"
            );
            bail!("The portrait service failed to report status");
        }

        let payload = res.json::<GenerationStatus>().await?;
        tracing::debug!(body = ?payload, "Status response");

        return Ok(payload);
    }
}

#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum BackendName {
    Platform,
}

impl BackendName {
    pub fn parse(text: String) -> Option<BackendName> {
        return BackendName::iter().find(|e| return e.to_string() == text);
    }
}

/// The payload sent to the portrait service. Everything except the prompt
/// comes straight out of configuration at submission time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub character: String,
    pub prompt: String,
    pub negative_prompt: String,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub cfg_scale: f64,
    pub model: String,
    pub user_id: String,
    /// Portrait generations are never persisted server-side as chat history.
    pub skip_chat_history: bool,
}

/// An image payload as the service reports it, either inline in a
/// synchronous submit response or inside a poll result.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub image_url: Option<String>,
    pub cloud_url: Option<String>,
    pub filename: Option<String>,
    pub generation_time: Option<f64>,
}

impl GenerationResult {
    pub fn url(&self) -> Option<String> {
        if let Some(url) = &self.image_url {
            if !url.is_empty() {
                return Some(url.to_string());
            }
        }

        if let Some(url) = &self.cloud_url {
            if !url.is_empty() {
                return Some(url.to_string());
            }
        }

        return None;
    }
}

/// What the service answered to a submit: the finished image right away, or
/// a task id to poll.
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    Completed(GenerationResult),
    Accepted(String),
}

/// One status poll response. `progress` arrives as either a JSON number or
/// a string depending on the service's mood, so it is kept raw here and
/// normalized through `progress_percent`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationStatus {
    pub status: String,
    pub progress: Option<serde_json::Value>,
    pub result: Option<GenerationResult>,
    pub error: Option<String>,
}

impl GenerationStatus {
    pub fn is_completed(&self) -> bool {
        return self.status == "completed";
    }

    pub fn is_failed(&self) -> bool {
        return self.status == "failed";
    }

    pub fn progress_percent(&self) -> Option<u8> {
        let progress = self.progress.as_ref()?;

        if let Some(num) = progress.as_f64() {
            return Some(num.clamp(0.0, 100.0) as u8);
        }

        if let Some(text) = progress.as_str() {
            if let Ok(num) = text.trim().trim_end_matches('%').parse::<f64>() {
                return Some(num.clamp(0.0, 100.0) as u8);
            }
        }

        return None;
    }
}

#[async_trait]
pub trait Backend {
    fn name(&self) -> BackendName;

    /// Used at startup to verify the portrait service is reachable before
    /// admitting any generation requests.
    async fn health_check(&self) -> Result<()>;

    /// Sends a generation request. The service either answers with the
    /// finished image inline, or hands back a task id for status polling.
    async fn submit(&self, request: GenerationRequest) -> Result<SubmitOutcome>;

    /// Fetches the current status for an asynchronous generation task.
    async fn status(&self, server_task_id: &str) -> Result<GenerationStatus>;
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use base64::engine::general_purpose;
use base64::Engine;
use serde_json::json;

use super::ApiClient;
use crate::domain::models::Tag;
use crate::domain::models::Voice;

/// Read access to the platform's tag and voice catalogs, plus voice
/// cloning from a local audio sample.
#[derive(Default)]
pub struct CatalogClient {
    api: ApiClient,
}

impl CatalogClient {
    pub async fn tags(&self) -> Result<Vec<Tag>> {
        let res = self.api.get("/tags").await?;
        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "tag catalog fetch failed");
            bail!("The tag catalog could not be loaded.");
        }

        return Ok(res.json::<Vec<Tag>>().await?);
    }

    pub async fn voices(&self) -> Result<Vec<Voice>> {
        let res = self.api.get("/voices").await?;
        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "voice catalog fetch failed");
            bail!("The voice catalog could not be loaded.");
        }

        return Ok(res.json::<Vec<Voice>>().await?);
    }

    /// Clones a voice from raw audio. The sample travels base64-encoded in
    /// the JSON body; the platform answers with the new catalog entry.
    pub async fn clone_voice(&self, name: &str, audio: &[u8]) -> Result<Voice> {
        let payload = json!({
            "name": name,
            "audio": general_purpose::STANDARD.encode(audio),
        });

        let res = self.api.post("/voice/clone", &payload).await?;
        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "voice clone failed");
            bail!("Voice cloning failed. Try a cleaner audio sample.");
        }

        return Ok(res.json::<Voice>().await?);
    }
}

#[cfg(test)]
#[path = "characters_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;

use super::ApiClient;
use crate::domain::models::CharacterForm;
use crate::domain::models::CharacterRecord;
use crate::domain::models::Photo;

/// The shape the set-main-photos endpoint expects per photo.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct MainPhoto {
    id: String,
    url: String,
    generation_time: Option<f64>,
}

impl MainPhoto {
    fn from_photo(photo: &Photo) -> MainPhoto {
        return MainPhoto {
            id: photo.id.to_string(),
            url: photo.url.to_string(),
            generation_time: photo.generation_time_seconds,
        };
    }
}

#[derive(Default)]
pub struct CharacterClient {
    api: ApiClient,
}

impl CharacterClient {
    pub async fn get(&self, name: &str) -> Result<CharacterRecord> {
        let res = self.api.get(&format!("/characters/{name}")).await?;
        if !res.status().is_success() {
            tracing::error!(
                status = res.status().as_u16(),
                name = name,
                "character fetch failed"
            );
            bail!(format!("No character named {name} could be loaded."));
        }

        return Ok(res.json::<CharacterRecord>().await?);
    }

    /// Creates the character from a finished draft.
    pub async fn create(&self, form: &CharacterForm) -> Result<()> {
        form.validate()?;

        let res = self
            .api
            .post("/characters", &serde_json::to_value(form)?)
            .await?;
        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "character create failed");
            bail!("The platform rejected the character. Check the draft and try again.");
        }

        return Ok(());
    }

    /// Replaces the character's main-card photo set. Full-replace semantics:
    /// the payload is the entire new selection, so retries are idempotent.
    pub async fn set_main_photos(&self, character_name: &str, photos: &[Photo]) -> Result<()> {
        let payload = json!({
            "character_name": character_name,
            "photos": photos
                .iter()
                .map(|e| return MainPhoto::from_photo(e))
                .collect::<Vec<MainPhoto>>(),
        });

        let res = self.api.post("/characters/set-main-photos", &payload).await?;
        if !res.status().is_success() {
            tracing::error!(
                status = res.status().as_u16(),
                character = character_name,
                "selection write failed"
            );
            bail!(format!(
                "the platform answered with status {}",
                res.status().as_u16()
            ));
        }

        return Ok(());
    }
}

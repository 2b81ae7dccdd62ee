#[cfg(test)]
#[path = "character_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::Photo;

/// The wizard's working copy of a character. Everything is optional while
/// drafting; `validate` gates the final create call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterForm {
    pub name: String,
    pub personality: String,
    pub backstory: String,
    pub appearance: String,
    pub location: String,
    /// Set once the user has touched the prompt field. From then on it
    /// replaces the appearance/location assembly entirely.
    pub custom_prompt: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub voice_id: Option<String>,
}

impl CharacterForm {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("Your character needs a name before they can be created.");
        }

        if self.personality.trim().is_empty() {
            bail!("Give your character a personality before creating them.");
        }

        return Ok(());
    }
}

/// A character as the platform stores it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub name: String,
    #[serde(default)]
    pub photos: Vec<Photo>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub character_appearance: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub voice_id: Option<String>,
}

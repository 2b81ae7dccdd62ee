#[cfg(test)]
#[path = "drafts_test.rs"]
mod tests;

use std::path;

use anyhow::bail;
use anyhow::Result;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::models::CharacterForm;

/// Crash recovery for the character wizard. The in-progress form persists
/// as YAML under the cache directory so a new invocation picks up where the
/// last one stopped, and the file is deleted once the character is actually
/// created.
pub struct Drafts {
    pub cache_dir: path::PathBuf,
}

impl Default for Drafts {
    fn default() -> Drafts {
        let cache_dir = dirs::cache_dir().unwrap().join("maquette/drafts");

        return Drafts::new(cache_dir);
    }
}

impl Drafts {
    pub fn new(cache_dir: path::PathBuf) -> Drafts {
        return Drafts { cache_dir };
    }

    fn get_file_path(&self) -> path::PathBuf {
        return self.cache_dir.join("draft.yaml");
    }

    pub async fn load(&self) -> Result<CharacterForm> {
        let file_path = self.get_file_path();
        if !file_path.exists() {
            bail!("There is no draft in progress. Start one with 'draft set'.");
        }

        let payload = fs::read_to_string(file_path).await?;
        let form: CharacterForm = serde_yaml::from_str(&payload)?;

        return Ok(form);
    }

    /// Loads the draft, or hands back an empty form when none exists yet.
    pub async fn load_or_default(&self) -> Result<CharacterForm> {
        if !self.get_file_path().exists() {
            return Ok(CharacterForm::default());
        }

        return self.load().await;
    }

    pub async fn save(&self, form: &CharacterForm) -> Result<()> {
        let payload = serde_yaml::to_string(form)?;

        if !self.cache_dir.exists() {
            fs::create_dir_all(&self.cache_dir).await?;
        }

        let mut file = fs::File::create(self.get_file_path()).await?;
        file.write_all(payload.as_bytes()).await?;

        return Ok(());
    }

    pub async fn delete(&self) -> Result<()> {
        let file_path = self.get_file_path();
        if !file_path.exists() {
            return Ok(());
        }

        fs::remove_file(file_path).await?;
        return Ok(());
    }
}

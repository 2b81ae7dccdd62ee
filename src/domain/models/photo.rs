#[cfg(test)]
#[path = "photo_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;
use uuid::Uuid;

/// A generated portrait. `is_selected` marks membership in the character's
/// main card, the bounded set of photos shown on their public profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: String,
    pub url: String,
    pub generation_time_seconds: Option<f64>,
    #[serde(default)]
    pub is_selected: bool,
}

impl Photo {
    /// Builds a photo from a generation result. The id comes from the
    /// service-supplied filename when there is one; otherwise a random id is
    /// minted so the photo stays addressable in the gallery.
    pub fn new(url: &str, filename: Option<&str>, generation_time_seconds: Option<f64>) -> Photo {
        let id = filename
            .and_then(Photo::id_from_filename)
            .unwrap_or_else(|| return Uuid::new_v4().to_string());

        return Photo {
            id,
            url: url.to_string(),
            generation_time_seconds,
            is_selected: false,
        };
    }

    fn id_from_filename(filename: &str) -> Option<String> {
        let stem = match filename.rsplit_once('.') {
            Some((stem, _extension)) => stem,
            None => filename,
        };

        if stem.is_empty() {
            return None;
        }

        return Some(stem.to_string());
    }
}

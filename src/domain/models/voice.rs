use serde_derive::Deserialize;
use serde_derive::Serialize;

/// A voice from the platform catalog, or one minted by cloning a local
/// audio sample.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub preview_url: Option<String>,
}

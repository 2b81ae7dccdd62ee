use serde_derive::Deserialize;
use serde_derive::Serialize;

/// A platform catalog tag. Tags attach to a character draft by name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
}

#[cfg(test)]
#[path = "tier_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;
use strum::EnumIter;
use strum::IntoEnumIterator;

/// Subscription plans, ordered cheapest first. The plan decides how many
/// portrait generations may sit in flight (active plus queued) at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, strum::Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Standard,
    Premium,
}

impl Tier {
    pub fn parse(text: String) -> Option<Tier> {
        return Tier::iter().find(|e| return e.to_string() == text);
    }

    /// Maximum in-flight generation requests for the plan. Requests beyond
    /// this are rejected outright, never queued.
    pub fn limit(&self) -> usize {
        match self {
            Tier::Free => return 1,
            Tier::Standard => return 3,
            Tier::Premium => return 5,
        }
    }
}

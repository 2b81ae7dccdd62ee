use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::Tier;

/// The signed-in user as the auth endpoint reports them. `coins` is the
/// wallet balance the throttle checks before admitting a generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub username: String,
    pub tier: Tier,
    pub coins: i64,
}

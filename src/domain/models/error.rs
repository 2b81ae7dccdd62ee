use thiserror::Error;

use super::Tier;

/// Everything that can go wrong between clicking "generate" and a finished
/// main card. Display strings double as the banner text shown to the user,
/// so each failure reads as a sentence rather than a code.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum StudioError {
    #[error("Describe your character's appearance, or set a custom prompt, before generating portraits.")]
    MissingPrompt,

    #[error("Portraits cost {cost} coins and your wallet holds {balance}. Top up to keep generating.")]
    InsufficientBalance { balance: i64, cost: i64 },

    #[error("The {tier} plan holds up to {limit} portrait requests at a time. Let the current queue finish first.")]
    QueueFull { tier: Tier, limit: usize },

    #[error("The portrait service failed: {0}")]
    GenerationFailed(String),

    #[error("The portrait service took too long to answer. We stopped waiting; the image may still reach your gallery later.")]
    GenerationTimedOut,

    #[error("A main card shows at most three photos. Remove one before adding another.")]
    SelectionFull,

    #[error("No photo with id {0} exists in this character's gallery.")]
    UnknownPhoto(String),

    #[error("Saving your photo selection failed: {0}")]
    Persistence(String),

    #[error("Your session expired and could not be refreshed. Sign in again to continue.")]
    Unauthorized,
}

impl StudioError {
    /// Collapses an infrastructure error into the closest studio error.
    /// Typed errors pass through untouched so `Unauthorized` from the auth
    /// layer is never masked as a generation failure.
    pub fn from_boundary(err: anyhow::Error) -> StudioError {
        if let Some(studio_err) = err.downcast_ref::<StudioError>() {
            return studio_err.clone();
        }

        return StudioError::GenerationFailed(err.to_string());
    }
}

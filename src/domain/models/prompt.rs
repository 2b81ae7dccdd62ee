#[cfg(test)]
#[path = "prompt_test.rs"]
mod tests;

use std::sync::Arc;
use std::sync::RwLock;

use super::CharacterForm;
use super::StudioError;

const PROMPT_SEPARATOR: &str = ", ";

#[derive(Default)]
struct PromptFields {
    appearance: String,
    location: String,
    custom: Option<String>,
}

/// The live prompt for portrait generation.
///
/// Clones share one underlying cell: the generator resolves the prompt right
/// before each network submission, so an edit made while an earlier request
/// is still in flight is picked up by every request that has not been
/// submitted yet. Capturing the prompt by value at queue time would silently
/// drop such edits.
#[derive(Clone, Default)]
pub struct PromptCell {
    fields: Arc<RwLock<PromptFields>>,
}

impl PromptCell {
    pub fn new() -> PromptCell {
        return PromptCell::default();
    }

    pub fn from_form(form: &CharacterForm) -> PromptCell {
        let cell = PromptCell::new();
        cell.set_appearance(&form.appearance);
        cell.set_location(&form.location);
        if let Some(custom) = &form.custom_prompt {
            cell.override_prompt(custom);
        }

        return cell;
    }

    pub fn set_appearance(&self, text: &str) {
        self.fields.write().unwrap().appearance = text.to_string();
    }

    pub fn set_location(&self, text: &str) {
        self.fields.write().unwrap().location = text.to_string();
    }

    /// Replaces the assembled prompt entirely. Once set, appearance and
    /// location no longer contribute; the user has taken over the prompt.
    pub fn override_prompt(&self, text: &str) {
        self.fields.write().unwrap().custom = Some(text.to_string());
    }

    /// The prompt as it stands right now: the custom override when the user
    /// has touched the prompt field, otherwise appearance and location
    /// joined in that order, skipping empty fields.
    pub fn resolve(&self) -> Result<String, StudioError> {
        let fields = self.fields.read().unwrap();

        let resolved = match &fields.custom {
            Some(custom) => custom.trim().to_string(),
            None => [fields.appearance.as_str(), fields.location.as_str()]
                .iter()
                .map(|e| return e.trim())
                .filter(|e| return !e.is_empty())
                .collect::<Vec<&str>>()
                .join(PROMPT_SEPARATOR),
        };

        if resolved.is_empty() {
            return Err(StudioError::MissingPrompt);
        }

        return Ok(resolved);
    }
}

#[cfg(test)]
#[path = "noop_test.rs"]
mod tests;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::Translator;
use crate::domain::models::TranslatorName;

/// Passes prompts through untouched, for setups without a translation
/// service or prompts already in English.
#[derive(Default)]
pub struct NoopTranslator {}

#[async_trait]
impl Translator for NoopTranslator {
    fn name(&self) -> TranslatorName {
        return TranslatorName::Noop;
    }

    #[allow(clippy::implicit_return)]
    async fn translate_to_english(&self, text: &str) -> Result<String> {
        return Ok(text.to_string());
    }
}

use anyhow::Result;
use async_trait::async_trait;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum TranslatorName {
    Api,
    Noop,
}

impl TranslatorName {
    pub fn parse(text: String) -> Option<TranslatorName> {
        return TranslatorName::iter().find(|e| return e.to_string() == text);
    }
}

/// Prompt normalization seam. The portrait service only understands
/// English, so prompts pass through here right before submission. A failed
/// translation falls back to the untranslated prompt; it never fails the
/// generation itself.
#[async_trait]
pub trait Translator {
    fn name(&self) -> TranslatorName;

    async fn translate_to_english(&self, text: &str) -> Result<String>;
}

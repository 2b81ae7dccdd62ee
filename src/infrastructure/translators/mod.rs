pub mod api;
pub mod noop;

use anyhow::bail;
use anyhow::Result;

use crate::domain::models::Translator;
use crate::domain::models::TranslatorName;

pub type TranslatorBox = Box<dyn Translator + Send + Sync>;

pub struct TranslatorManager {}

impl TranslatorManager {
    pub fn get(name: TranslatorName) -> Result<TranslatorBox> {
        if name == TranslatorName::Api {
            return Ok(Box::<api::ApiTranslator>::default());
        }

        if name == TranslatorName::Noop {
            return Ok(Box::<noop::NoopTranslator>::default());
        }

        bail!(format!("No translator implemented for {name}"))
    }
}

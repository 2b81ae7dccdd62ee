#[cfg(test)]
#[path = "api_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Translator;
use crate::domain::models::TranslatorName;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct TranslateResponse {
    translated: String,
}

/// English normalization over the platform's translation endpoint. Prompts
/// written in any language come back as the English text the portrait
/// service expects.
pub struct ApiTranslator {
    url: String,
}

impl Default for ApiTranslator {
    fn default() -> ApiTranslator {
        return ApiTranslator {
            url: Config::get(ConfigKey::TranslateUrl),
        };
    }
}

#[async_trait]
impl Translator for ApiTranslator {
    fn name(&self) -> TranslatorName {
        return TranslatorName::Api;
    }

    #[allow(clippy::implicit_return)]
    async fn translate_to_english(&self, text: &str) -> Result<String> {
        let res = reqwest::Client::new()
            .post(format!("{url}/translate", url = self.url))
            .json(&json!({ "text": text, "target": "en" }))
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "translation request failed");
            bail!("translation request failed");
        }

        let payload = res.json::<TranslateResponse>().await?;
        return Ok(payload.translated);
    }
}

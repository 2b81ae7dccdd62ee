use anyhow::Result;

use super::NoopTranslator;
use crate::domain::models::Translator;

#[tokio::test]
async fn it_returns_the_input_unchanged() -> Result<()> {
    let res = NoopTranslator::default()
        .translate_to_english("tall elf with silver hair")
        .await?;

    assert_eq!(res, "tall elf with silver hair");
    return Ok(());
}

use anyhow::Result;
use test_utils::profile_body;

use super::ApiClient;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::StudioError;
use crate::domain::models::Tier;

fn client_for(server: &mockito::Server) -> ApiClient {
    Config::set(ConfigKey::ApiUrl, &server.url());
    Config::set(ConfigKey::AuthToken, "stale-token");
    Config::set(ConfigKey::RefreshToken, "refresh-token");
    return ApiClient::default();
}

#[tokio::test]
async fn it_loads_the_profile() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/auth/me")
        .match_header("authorization", "Bearer stale-token")
        .with_status(200)
        .with_body(profile_body("u-1", "june", "standard", 70))
        .create_async()
        .await;

    let profile = client_for(&server).me().await?;

    assert_eq!(profile.username, "june");
    assert_eq!(profile.tier, Tier::Standard);
    assert_eq!(profile.coins, 70);
    mock.assert_async().await;
    return Ok(());
}

#[tokio::test]
async fn it_refreshes_once_and_retries_on_a_401() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let rejected = server
        .mock("POST", "/auth/me")
        .match_header("authorization", "Bearer stale-token")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/auth/refresh")
        .with_status(200)
        .with_body(r#"{"access_token": "fresh-token"}"#)
        .expect(1)
        .create_async()
        .await;
    let accepted = server
        .mock("POST", "/auth/me")
        .match_header("authorization", "Bearer fresh-token")
        .with_status(200)
        .with_body(profile_body("u-1", "june", "free", 100))
        .expect(1)
        .create_async()
        .await;

    let profile = client_for(&server).me().await?;

    assert_eq!(profile.coins, 100);
    assert_eq!(Config::get(ConfigKey::AuthToken), "fresh-token");
    rejected.assert_async().await;
    refresh.assert_async().await;
    accepted.assert_async().await;
    return Ok(());
}

#[tokio::test]
async fn it_gives_up_after_a_second_401() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let rejected = server
        .mock("POST", "/auth/me")
        .with_status(401)
        .expect(2)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/auth/refresh")
        .with_status(200)
        .with_body(r#"{"access_token": "fresh-token"}"#)
        .expect(1)
        .create_async()
        .await;

    let err = client_for(&server).me().await.unwrap_err();

    assert_eq!(
        err.downcast_ref::<StudioError>(),
        Some(&StudioError::Unauthorized)
    );
    rejected.assert_async().await;
    refresh.assert_async().await;
    return Ok(());
}

#[tokio::test]
async fn it_surfaces_unauthorized_when_the_refresh_is_rejected() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/auth/me")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/auth/refresh")
        .with_status(403)
        .expect(1)
        .create_async()
        .await;

    let err = client_for(&server).me().await.unwrap_err();

    assert_eq!(
        err.downcast_ref::<StudioError>(),
        Some(&StudioError::Unauthorized)
    );
    refresh.assert_async().await;
    return Ok(());
}

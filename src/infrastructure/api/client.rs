#[cfg(test)]
#[path = "client_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use reqwest::Method;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Profile;
use crate::domain::models::StudioError;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct RefreshResponse {
    access_token: String,
}

/// Bearer-authorized access to the platform API. A 401 triggers exactly one
/// token refresh followed by one retry of the original request; a second
/// 401 surfaces as `Unauthorized` rather than looping.
pub struct ApiClient {
    url: String,
}

impl Default for ApiClient {
    fn default() -> ApiClient {
        return ApiClient {
            url: Config::get(ConfigKey::ApiUrl),
        };
    }
}

impl ApiClient {
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        token: &str,
    ) -> Result<reqwest::Response> {
        let mut builder = reqwest::Client::new().request(method, format!("{}{path}", self.url));
        if !token.is_empty() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        return Ok(builder.send().await?);
    }

    async fn refresh(&self) -> Result<String> {
        let refresh_token = Config::get(ConfigKey::RefreshToken);
        let res = self
            .send(
                Method::POST,
                "/auth/refresh",
                Some(&json!({ "refresh_token": refresh_token })),
                "",
            )
            .await?;

        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "token refresh rejected");
            return Err(StudioError::Unauthorized.into());
        }

        let payload = res.json::<RefreshResponse>().await?;
        Config::set(ConfigKey::AuthToken, &payload.access_token);

        return Ok(payload.access_token);
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response> {
        let res = self
            .send(
                method.clone(),
                path,
                body,
                &Config::get(ConfigKey::AuthToken),
            )
            .await?;
        if res.status() != StatusCode::UNAUTHORIZED {
            return Ok(res);
        }

        let token = self.refresh().await?;
        let res = self.send(method, path, body, &token).await?;
        if res.status() == StatusCode::UNAUTHORIZED {
            return Err(StudioError::Unauthorized.into());
        }

        return Ok(res);
    }

    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        return self.request(Method::GET, path, None).await;
    }

    pub async fn post(&self, path: &str, body: &serde_json::Value) -> Result<reqwest::Response> {
        return self.request(Method::POST, path, Some(body)).await;
    }

    /// The signed-in user's profile, including tier and wallet balance.
    pub async fn me(&self) -> Result<Profile> {
        let res = self.request(Method::POST, "/auth/me", None).await?;
        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "profile request failed");
            bail!("Failed to load your profile from the platform.");
        }

        return Ok(res.json::<Profile>().await?);
    }
}

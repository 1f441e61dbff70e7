use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{AuthToken, Credentials, ProfilePatch, RegistrationDraft, UserProfile},
    error::{ApiError, ErrorCode},
};
use tracing::debug;
use url::Url;

use crate::{
    backend::{AuthBackend, AuthGrant},
    error::AuthError,
};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Talks to a real `/auth/*` endpoint over HTTP.
pub struct HttpAuthBackend {
    http: Client,
    base: Url,
}

impl HttpAuthBackend {
    pub fn new(server_url: &str) -> Result<Self> {
        Self::with_timeout(server_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(server_url: &str, timeout: Duration) -> Result<Self> {
        let mut base = Url::parse(server_url)
            .with_context(|| format!("invalid auth server url '{server_url}'"))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self { http, base })
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        self.base
            .join(path)
            .map_err(|err| AuthError::Transport(format!("bad endpoint '{path}': {err}")))
    }
}

/// Turns a non-2xx response into an [`AuthError`]; 401 maps to `unauthorized`.
async fn reject(res: Response, unauthorized: AuthError) -> AuthError {
    let status = res.status();
    if status == StatusCode::UNAUTHORIZED {
        return unauthorized;
    }
    match res.json::<ApiError>().await {
        Ok(body) => body.into(),
        Err(_) => AuthError::Server {
            code: ErrorCode::Internal,
            message: format!("unexpected status {status}"),
        },
    }
}

async fn decode<T: DeserializeOwned>(res: Response, unauthorized: AuthError) -> Result<T, AuthError> {
    if !res.status().is_success() {
        return Err(reject(res, unauthorized).await);
    }
    Ok(res.json::<T>().await?)
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn login(&self, credentials: &Credentials) -> Result<AuthGrant, AuthError> {
        let res = self
            .http
            .post(self.endpoint("auth/login")?)
            .json(credentials)
            .send()
            .await?;
        decode(res, AuthError::InvalidCredentials).await
    }

    async fn register(&self, draft: &RegistrationDraft) -> Result<AuthGrant, AuthError> {
        let res = self
            .http
            .post(self.endpoint("auth/register")?)
            .json(draft)
            .send()
            .await?;
        decode(res, AuthError::NoActiveSession).await
    }

    async fn logout(&self, token: &AuthToken) -> Result<(), AuthError> {
        let res = self
            .http
            .post(self.endpoint("auth/logout")?)
            .bearer_auth(token.as_str())
            .send()
            .await?;
        if res.status().is_success() {
            return Ok(());
        }
        Err(reject(res, AuthError::NoActiveSession).await)
    }

    async fn update_profile(
        &self,
        token: &AuthToken,
        patch: &ProfilePatch,
    ) -> Result<UserProfile, AuthError> {
        let res = self
            .http
            .patch(self.endpoint("auth/profile")?)
            .bearer_auth(token.as_str())
            .json(patch)
            .send()
            .await?;
        decode(res, AuthError::NoActiveSession).await
    }

    async fn restore(&self, token: &AuthToken) -> Result<Option<UserProfile>, AuthError> {
        let res = self
            .http
            .get(self.endpoint("auth/me")?)
            .bearer_auth(token.as_str())
            .send()
            .await?;
        if res.status() == StatusCode::UNAUTHORIZED {
            debug!("stored token was rejected by the auth endpoint");
            return Ok(None);
        }
        decode(res, AuthError::NoActiveSession).await.map(Some)
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;

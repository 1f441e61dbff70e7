use std::sync::Arc;

use crate::directory::Directory;
use crate::tokens::{mint_token, verify_token, Claims, TokenConfig};
use shared::{
    domain::{AuthToken, ProfilePatch, UserProfile},
    error::{ApiError, ErrorCode},
    protocol::{AuthResponse, LoginRequest, RegisterRequest},
};
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Clone)]
pub struct ApiContext {
    pub directory: Arc<RwLock<Directory>>,
    pub tokens: TokenConfig,
}

impl ApiContext {
    pub fn new(directory: Directory, tokens: TokenConfig) -> Self {
        Self {
            directory: Arc::new(RwLock::new(directory)),
            tokens,
        }
    }
}

pub async fn login(ctx: &ApiContext, req: &LoginRequest) -> Result<AuthResponse, ApiError> {
    let user = ctx.directory.read().await.authenticate(req)?;
    let token = issue(ctx, &user)?;
    info!(user_id = %user.id, "login accepted");
    Ok(AuthResponse { user, token })
}

pub async fn register(ctx: &ApiContext, req: &RegisterRequest) -> Result<AuthResponse, ApiError> {
    let user = ctx.directory.write().await.register(req)?;
    let token = issue(ctx, &user)?;
    info!(user_id = %user.id, "account registered");
    Ok(AuthResponse { user, token })
}

pub async fn logout(ctx: &ApiContext, token: &str) -> Result<(), ApiError> {
    let claims = claims_for(ctx, token).await?;
    ctx.directory.write().await.revoke(claims.jti, claims.exp);
    info!(sub = %claims.sub, "token revoked");
    Ok(())
}

pub async fn current_user(ctx: &ApiContext, token: &str) -> Result<UserProfile, ApiError> {
    let claims = claims_for(ctx, token).await?;
    let user_id = claims.user_id().ok_or_else(unauthorized)?;
    ctx.directory
        .read()
        .await
        .profile(user_id)
        .cloned()
        .ok_or_else(unauthorized)
}

pub async fn update_profile(
    ctx: &ApiContext,
    token: &str,
    patch: &ProfilePatch,
) -> Result<UserProfile, ApiError> {
    let claims = claims_for(ctx, token).await?;
    let user_id = claims.user_id().ok_or_else(unauthorized)?;
    let user = ctx
        .directory
        .write()
        .await
        .update_profile(user_id, patch)?;
    info!(user_id = %user.id, "profile updated");
    Ok(user)
}

fn issue(ctx: &ApiContext, user: &UserProfile) -> Result<AuthToken, ApiError> {
    mint_token(&ctx.tokens, user.id).map_err(internal)
}

async fn claims_for(ctx: &ApiContext, token: &str) -> Result<Claims, ApiError> {
    let claims = verify_token(&ctx.tokens, token).map_err(|err| {
        debug!(error = %err, "bearer token failed verification");
        unauthorized()
    })?;
    if ctx.directory.read().await.is_revoked(&claims.jti) {
        return Err(unauthorized());
    }
    Ok(claims)
}

fn unauthorized() -> ApiError {
    ApiError::new(ErrorCode::Unauthorized, "missing or invalid session token")
}

fn internal(err: impl std::fmt::Display) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;

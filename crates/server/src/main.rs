mod api;
mod config;
mod directory;
mod password;
mod tokens;

use std::{net::SocketAddr, sync::Arc};

use api::ApiContext;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::{get, patch, post},
    Json, Router,
};
use config::load_settings;
use directory::Directory;
use shared::{
    domain::{ProfilePatch, UserProfile},
    error::{ApiError, ErrorCode},
    protocol::{AuthResponse, LoginRequest, RegisterRequest},
};
use tokens::TokenConfig;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{info, warn};

const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Clone)]
struct AppState {
    api: ApiContext,
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    if settings.jwt_secret == "devsecret" {
        warn!("using the development JWT secret; set APP__JWT_SECRET outside local testing");
    }

    let api = ApiContext::new(
        Directory::seeded()?,
        TokenConfig {
            secret: settings.jwt_secret.clone(),
            ttl_seconds: settings.token_ttl_seconds,
        },
    );
    let app = build_router(Arc::new(AppState { api }));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/auth/login", post(http_login))
        .route("/auth/register", post(http_register))
        .route("/auth/logout", post(http_logout))
        .route("/auth/me", get(http_me))
        .route("/auth/profile", patch(http_update_profile))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    api::login(&state.api, &req)
        .await
        .map(Json)
        .map_err(reject)
}

async fn http_register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    api::register(&state.api, &req)
        .await
        .map(Json)
        .map_err(reject)
}

async fn http_logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    let token = bearer(&headers)?;
    api::logout(&state.api, token).await.map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn http_me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<UserProfile>> {
    let token = bearer(&headers)?;
    api::current_user(&state.api, token)
        .await
        .map(Json)
        .map_err(reject)
}

async fn http_update_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(patch): Json<ProfilePatch>,
) -> ApiResult<Json<UserProfile>> {
    let token = bearer(&headers)?;
    api::update_profile(&state.api, token, &patch)
        .await
        .map(Json)
        .map_err(reject)
}

fn bearer(headers: &HeaderMap) -> ApiResult<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            reject(ApiError::new(
                ErrorCode::Unauthorized,
                "missing bearer token",
            ))
        })
}

fn reject(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match err.code {
        ErrorCode::Unauthorized | ErrorCode::InvalidCredentials | ErrorCode::NoActiveSession => {
            StatusCode::UNAUTHORIZED
        }
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(err))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;

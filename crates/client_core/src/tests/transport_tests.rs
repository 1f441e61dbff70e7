use super::*;
use axum::{
    http::{header, HeaderMap, StatusCode as HttpStatus},
    routing::{get, patch, post},
    Json, Router,
};
use shared::{domain::UserId, protocol::AuthResponse};
use tokio::net::TcpListener;

const GOOD_TOKEN: &str = "stub-token";

fn stub_user() -> UserProfile {
    UserProfile {
        id: UserId(42),
        email: "learner@example.com".into(),
        username: "learner".into(),
        first_name: Some("Ada".into()),
        last_name: None,
        avatar: None,
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value == format!("Bearer {GOOD_TOKEN}"))
        .unwrap_or(false)
}

fn unauthorized() -> (HttpStatus, Json<ApiError>) {
    (
        HttpStatus::UNAUTHORIZED,
        Json(ApiError::new(ErrorCode::Unauthorized, "missing or bad token")),
    )
}

async fn login(
    Json(req): Json<Credentials>,
) -> Result<Json<AuthResponse>, (HttpStatus, Json<ApiError>)> {
    if req.email == "learner@example.com" && req.password == "123456" {
        return Ok(Json(AuthResponse {
            user: stub_user(),
            token: AuthToken::new(GOOD_TOKEN),
        }));
    }
    Err((
        HttpStatus::UNAUTHORIZED,
        Json(ApiError::new(
            ErrorCode::InvalidCredentials,
            "invalid email or password",
        )),
    ))
}

async fn register(
    Json(req): Json<RegistrationDraft>,
) -> Result<Json<AuthResponse>, (HttpStatus, Json<ApiError>)> {
    if !req.email.contains('@') {
        return Err((
            HttpStatus::BAD_REQUEST,
            Json(ApiError::new(ErrorCode::Validation, "bad email")),
        ));
    }
    Ok(Json(AuthResponse {
        user: UserProfile {
            id: UserId(43),
            email: req.email.clone(),
            username: req.username.clone(),
            first_name: req.first_name.clone(),
            last_name: req.last_name.clone(),
            avatar: None,
        },
        token: AuthToken::new(GOOD_TOKEN),
    }))
}

async fn logout(headers: HeaderMap) -> HttpStatus {
    if authorized(&headers) {
        HttpStatus::NO_CONTENT
    } else {
        HttpStatus::UNAUTHORIZED
    }
}

async fn me(headers: HeaderMap) -> Result<Json<UserProfile>, (HttpStatus, Json<ApiError>)> {
    if !authorized(&headers) {
        return Err(unauthorized());
    }
    Ok(Json(stub_user()))
}

async fn update_profile(
    headers: HeaderMap,
    Json(patch): Json<ProfilePatch>,
) -> Result<Json<UserProfile>, (HttpStatus, Json<ApiError>)> {
    if !authorized(&headers) {
        return Err(unauthorized());
    }
    let mut user = stub_user();
    patch.apply_to(&mut user);
    Ok(Json(user))
}

async fn broken() -> HttpStatus {
    HttpStatus::INTERNAL_SERVER_ERROR
}

async fn spawn_auth_stub() -> anyhow::Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let auth = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
        .route("/auth/profile", patch(update_profile))
        .route("/broken/auth/login", post(broken));
    let app = Router::new().nest("/api", auth);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}/api"))
}

#[tokio::test]
async fn login_round_trip_and_bad_credentials() {
    let base = spawn_auth_stub().await.expect("spawn stub");
    let backend = HttpAuthBackend::new(&base).expect("backend");

    let grant = backend
        .login(&Credentials::new("learner@example.com", "123456"))
        .await
        .expect("login");
    assert_eq!(grant.user, stub_user());
    assert_eq!(grant.token.as_str(), GOOD_TOKEN);

    let err = backend
        .login(&Credentials::new("x@y.com", "bad"))
        .await
        .expect_err("bad credentials");
    assert_eq!(err, AuthError::InvalidCredentials);
}

#[tokio::test]
async fn register_surfaces_validation_errors() {
    let base = spawn_auth_stub().await.expect("spawn stub");
    let backend = HttpAuthBackend::new(&base).expect("backend");
    let mut draft = RegistrationDraft {
        email: "n@e.com".into(),
        username: "n".into(),
        password: "p".into(),
        first_name: Some("N".into()),
        last_name: None,
    };

    let grant = backend.register(&draft).await.expect("register");
    assert_eq!(grant.user.email, "n@e.com");

    draft.email = "not-an-email".into();
    let err = backend.register(&draft).await.expect_err("validation");
    assert_eq!(
        err,
        AuthError::Server {
            code: ErrorCode::Validation,
            message: "bad email".into(),
        }
    );
}

#[tokio::test]
async fn bearer_routes_distinguish_valid_and_stale_tokens() {
    let base = spawn_auth_stub().await.expect("spawn stub");
    let backend = HttpAuthBackend::new(&base).expect("backend");
    let good = AuthToken::new(GOOD_TOKEN);
    let stale = AuthToken::new("stale");

    assert_eq!(
        backend.restore(&good).await.expect("restore"),
        Some(stub_user())
    );
    assert_eq!(backend.restore(&stale).await.expect("restore"), None);

    let updated = backend
        .update_profile(
            &good,
            &ProfilePatch {
                first_name: Some("A".into()),
                ..ProfilePatch::default()
            },
        )
        .await
        .expect("update");
    assert_eq!(updated.first_name.as_deref(), Some("A"));
    assert_eq!(updated.username, "learner");

    let err = backend
        .update_profile(&stale, &ProfilePatch::default())
        .await
        .expect_err("stale token");
    assert_eq!(err, AuthError::NoActiveSession);

    backend.logout(&good).await.expect("logout");
    assert_eq!(
        backend.logout(&stale).await.expect_err("stale logout"),
        AuthError::NoActiveSession
    );
}

#[tokio::test]
async fn non_json_error_bodies_become_internal_server_errors() {
    let base = spawn_auth_stub().await.expect("spawn stub");
    let backend = HttpAuthBackend::new(&format!("{base}/broken")).expect("backend");

    let err = backend
        .login(&Credentials::new("learner@example.com", "123456"))
        .await
        .expect_err("broken endpoint");

    assert!(matches!(
        err,
        AuthError::Server {
            code: ErrorCode::Internal,
            ..
        }
    ));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let backend = HttpAuthBackend::with_timeout(&format!("http://{addr}"), Duration::from_secs(2))
        .expect("backend");

    let err = backend
        .login(&Credentials::new("learner@example.com", "123456"))
        .await
        .expect_err("unreachable");

    assert!(matches!(err, AuthError::Transport(_)));
}

use super::*;
use tokio::time::Instant;

fn instant_backend() -> SimulatedAuthBackend {
    SimulatedAuthBackend::new(SimulatedDelays {
        login: Duration::ZERO,
        register: Duration::ZERO,
        logout: Duration::ZERO,
        update: Duration::ZERO,
        restore: Duration::ZERO,
    })
}

#[tokio::test]
async fn only_the_demo_pair_is_accepted() {
    let backend = instant_backend();

    let grant = backend
        .login(&Credentials::new(DEMO_EMAIL, DEMO_PASSWORD))
        .await
        .expect("demo login");
    assert_eq!(grant.user, demo_user());

    for (email, password) in [
        ("LEARNER@example.com", DEMO_PASSWORD),
        (DEMO_EMAIL, ""),
        ("", ""),
    ] {
        let err = backend
            .login(&Credentials::new(email, password))
            .await
            .expect_err("rejected");
        assert_eq!(err, AuthError::InvalidCredentials);
    }
}

#[tokio::test]
async fn issued_tokens_and_user_ids_are_unique() {
    let backend = instant_backend();
    let draft = RegistrationDraft {
        email: "a@b.co".into(),
        username: "abc".into(),
        password: "password".into(),
        first_name: None,
        last_name: None,
    };

    let first = backend.register(&draft).await.expect("first");
    let second = backend.register(&draft).await.expect("second");

    assert_ne!(first.token, second.token);
    assert!(second.user.id > first.user.id);
    assert_eq!(first.user.avatar.as_deref(), Some(DEFAULT_AVATAR));
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let backend = instant_backend();
    let grant = backend
        .login(&Credentials::new(DEMO_EMAIL, DEMO_PASSWORD))
        .await
        .expect("demo login");

    assert!(backend.restore(&grant.token).await.expect("restore").is_some());
    backend.logout(&grant.token).await.expect("logout");
    assert!(backend.restore(&grant.token).await.expect("restore").is_none());

    let err = backend
        .update_profile(&grant.token, &ProfilePatch::default())
        .await
        .expect_err("revoked");
    assert_eq!(err, AuthError::NoActiveSession);
}

#[tokio::test]
async fn profile_updates_persist_for_the_token() {
    let backend = instant_backend();
    let grant = backend
        .login(&Credentials::new(DEMO_EMAIL, DEMO_PASSWORD))
        .await
        .expect("demo login");

    backend
        .update_profile(
            &grant.token,
            &ProfilePatch {
                last_name: Some("Smith".into()),
                ..ProfilePatch::default()
            },
        )
        .await
        .expect("update");

    let restored = backend
        .restore(&grant.token)
        .await
        .expect("restore")
        .expect("still valid");
    assert_eq!(restored.last_name.as_deref(), Some("Smith"));
    assert_eq!(restored.first_name, demo_user().first_name);
}

#[tokio::test(start_paused = true)]
async fn each_call_waits_its_configured_delay() {
    let backend = SimulatedAuthBackend::default();
    let delays = backend.delays();

    let started = Instant::now();
    let grant = backend
        .login(&Credentials::new(DEMO_EMAIL, DEMO_PASSWORD))
        .await
        .expect("demo login");
    assert!(started.elapsed() >= delays.login);

    let started = Instant::now();
    backend.logout(&grant.token).await.expect("logout");
    assert!(started.elapsed() >= delays.logout);
}

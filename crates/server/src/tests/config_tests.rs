use super::{apply_env, apply_file, Settings};

use std::collections::HashMap;

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();

    apply_file(
        &mut settings,
        "bind_addr = \"0.0.0.0:9000\"\njwt_secret = \"file-secret\"\ntoken_ttl_seconds = 60\n",
    );

    assert_eq!(settings.server_bind, "0.0.0.0:9000");
    assert_eq!(settings.jwt_secret, "file-secret");
    assert_eq!(settings.token_ttl_seconds, 60);
}

#[test]
fn unreadable_file_keeps_defaults() {
    let mut settings = Settings::default();

    apply_file(&mut settings, "this is = = not toml");

    assert_eq!(settings, Settings::default());
}

#[test]
fn app_prefixed_env_wins_over_legacy_name() {
    let env: HashMap<&str, &str> = [
        ("SERVER_BIND", "127.0.0.1:1111"),
        ("APP__BIND_ADDR", "127.0.0.1:2222"),
        ("APP__JWT_SECRET", "env-secret"),
        ("APP__TOKEN_TTL_SECONDS", "120"),
    ]
    .into_iter()
    .collect();
    let mut settings = Settings::default();

    apply_env(&mut settings, |key| env.get(key).map(|v| v.to_string()));

    assert_eq!(settings.server_bind, "127.0.0.1:2222");
    assert_eq!(settings.jwt_secret, "env-secret");
    assert_eq!(settings.token_ttl_seconds, 120);
}

#[test]
fn non_numeric_ttl_is_ignored() {
    let mut settings = Settings::default();

    apply_env(&mut settings, |key| {
        (key == "APP__TOKEN_TTL_SECONDS").then(|| "soon".to_string())
    });

    assert_eq!(settings.token_ttl_seconds, Settings::default().token_ttl_seconds);
}

use super::*;

fn draft(email: &str, username: &str, password: &str) -> RegistrationDraft {
    RegistrationDraft {
        email: email.into(),
        username: username.into(),
        password: password.into(),
        first_name: None,
        last_name: None,
    }
}

#[test]
fn email_requires_local_part_domain_and_suffix() {
    assert!(validate_email("learner@example.com"));
    assert!(validate_email("n@e.com"));
    assert!(!validate_email("learner@example"));
    assert!(!validate_email("learner example@mail.com"));
    assert!(!validate_email("@example.com"));
}

#[test]
fn password_and_username_length_bounds() {
    assert!(!validate_password("1234567"));
    assert!(validate_password("12345678"));

    assert!(!validate_username("ab"));
    assert!(validate_username("abc"));
    assert!(validate_username(&"a".repeat(20)));
    assert!(!validate_username(&"a".repeat(21)));
    assert!(validate_username("学习者"));
}

#[test]
fn phone_matches_mobile_prefixes() {
    assert!(validate_phone("13812345678"));
    assert!(!validate_phone("12812345678"));
    assert!(!validate_phone("1381234567"));
}

#[test]
fn registration_reports_first_failing_field() {
    assert_eq!(
        validate_registration(&draft("bad", "x", "p")),
        Err(ValidationError::InvalidEmail)
    );
    assert_eq!(
        validate_registration(&draft("n@e.com", "x", "p")),
        Err(ValidationError::InvalidUsername)
    );
    assert_eq!(
        validate_registration(&draft("n@e.com", "newuser", "p")),
        Err(ValidationError::InvalidPassword)
    );
    assert!(validate_registration(&draft("n@e.com", "newuser", "password123")).is_ok());
}

#[test]
fn resident_id_accepts_valid_eighteen_digit_code() {
    assert_eq!(validate_resident_id("11010519491231002X"), Ok(()));
    assert_eq!(validate_resident_id("11010519491231002x"), Ok(()));
}

#[test]
fn resident_id_accepts_legacy_fifteen_digit_code() {
    assert_eq!(validate_resident_id("110105491231002"), Ok(()));
}

#[test]
fn resident_id_rejects_bad_check_digit() {
    assert_eq!(
        validate_resident_id("110105194912310021"),
        Err(ResidentIdError::Checksum)
    );
}

#[test]
fn resident_id_rejects_unknown_region() {
    assert_eq!(
        validate_resident_id("000105194912310021"),
        Err(ResidentIdError::Region)
    );
}

#[test]
fn resident_id_rejects_malformed_input() {
    assert_eq!(validate_resident_id("12345"), Err(ResidentIdError::Format));
    assert_eq!(
        validate_resident_id("11010519491331002X"),
        Err(ResidentIdError::Format)
    );
    assert_eq!(
        validate_resident_id("1101051949123100XX"),
        Err(ResidentIdError::Format)
    );
}

#[test]
fn date_checks_calendar_and_separator() {
    assert!(check_date("2024-01-15"));
    assert!(check_date("2024/2/29"));
    assert!(!check_date("2023-02-29"));
    assert!(!check_date("2024-01/15"));
    assert!(!check_date("2024-13-01"));
}

#[test]
fn time_and_datetime_checks() {
    assert!(check_time("14:30:25"));
    assert!(check_time("0:0:0"));
    assert!(!check_time("24:00:00"));
    assert!(!check_time("12:60:00"));

    assert!(check_datetime("2024-01-15 14:30:25"));
    assert!(!check_datetime("2024-01-15T14:30:25"));
    assert!(!check_datetime("2024-02-30 14:30:25"));
}

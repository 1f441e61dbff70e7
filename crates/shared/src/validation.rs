//! Input predicates shared by the CLI and the mock auth endpoint.
//!
//! The session controller does not validate; callers check a draft before they
//! hand it over.

use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use thiserror::Error;

use crate::domain::RegistrationDraft;

pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const USERNAME_MIN_LENGTH: usize = 3;
pub const USERNAME_MAX_LENGTH: usize = 20;

const RESIDENT_ID_WEIGHTS: [u32; 17] = [7, 9, 10, 5, 8, 4, 2, 1, 6, 3, 7, 9, 10, 5, 8, 4, 2];
const RESIDENT_ID_PARITY: [char; 11] = ['1', '0', 'X', '9', '8', '7', '6', '5', '4', '3', '2'];
const PROVINCE_CODES: [u32; 35] = [
    11, 12, 13, 14, 15, 21, 22, 23, 31, 32, 33, 34, 35, 36, 37, 41, 42, 43, 44, 45, 46, 50, 51,
    52, 53, 54, 61, 62, 63, 64, 65, 71, 81, 82, 91,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("please enter a valid email address")]
    InvalidEmail,
    #[error("password must be at least {PASSWORD_MIN_LENGTH} characters")]
    InvalidPassword,
    #[error("username must be between {USERNAME_MIN_LENGTH} and {USERNAME_MAX_LENGTH} characters")]
    InvalidUsername,
    #[error("please enter a valid phone number")]
    InvalidPhone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResidentIdError {
    #[error("resident id has an invalid format")]
    Format,
    #[error("resident id has an unknown region code")]
    Region,
    #[error("resident id check digit does not match")]
    Checksum,
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email regex"))
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^1[3-9]\d{9}$").expect("static phone regex"))
}

fn date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{1,4})([-/])(\d{1,2})([-/])(\d{1,2})$").expect("static date regex")
    })
}

fn time_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2}):(\d{1,2}):(\d{1,2})$").expect("static time regex"))
}

pub fn validate_email(email: &str) -> bool {
    email_regex().is_match(email)
}

pub fn validate_password(password: &str) -> bool {
    password.chars().count() >= PASSWORD_MIN_LENGTH
}

pub fn validate_username(username: &str) -> bool {
    let len = username.chars().count();
    (USERNAME_MIN_LENGTH..=USERNAME_MAX_LENGTH).contains(&len)
}

pub fn validate_phone(phone: &str) -> bool {
    phone_regex().is_match(phone)
}

pub fn validate_registration(draft: &RegistrationDraft) -> Result<(), ValidationError> {
    if !validate_email(&draft.email) {
        return Err(ValidationError::InvalidEmail);
    }
    if !validate_username(&draft.username) {
        return Err(ValidationError::InvalidUsername);
    }
    if !validate_password(&draft.password) {
        return Err(ValidationError::InvalidPassword);
    }
    Ok(())
}

/// Checks a mainland resident id card number.
///
/// Both the legacy 15-digit layout (`RRRRRR YYMMDD SSS`, 20th century births)
/// and the 18-digit layout (`RRRRRR YYYYMMDD SSS C`) are accepted. The 18-digit
/// form carries an ISO 7064 MOD 11-2 check character.
pub fn validate_resident_id(code: &str) -> Result<(), ResidentIdError> {
    let code = code.trim().to_ascii_uppercase();
    let bytes = code.as_bytes();

    let (year, month, day) = match bytes.len() {
        18 => {
            if !bytes[..17].iter().all(u8::is_ascii_digit)
                || !(bytes[17].is_ascii_digit() || bytes[17] == b'X')
            {
                return Err(ResidentIdError::Format);
            }
            (
                digits(&code[6..10]),
                digits(&code[10..12]),
                digits(&code[12..14]),
            )
        }
        15 => {
            if !bytes.iter().all(u8::is_ascii_digit) {
                return Err(ResidentIdError::Format);
            }
            (
                1900 + digits(&code[6..8]),
                digits(&code[8..10]),
                digits(&code[10..12]),
            )
        }
        _ => return Err(ResidentIdError::Format),
    };

    if !(1800..2100).contains(&year)
        || NaiveDate::from_ymd_opt(year as i32, month, day).is_none()
    {
        return Err(ResidentIdError::Format);
    }

    if !PROVINCE_CODES.contains(&digits(&code[..2])) {
        return Err(ResidentIdError::Region);
    }

    if bytes.len() == 18 {
        let sum: u32 = bytes[..17]
            .iter()
            .zip(RESIDENT_ID_WEIGHTS)
            .map(|(b, w)| u32::from(b - b'0') * w)
            .sum();
        if RESIDENT_ID_PARITY[(sum % 11) as usize] != char::from(bytes[17]) {
            return Err(ResidentIdError::Checksum);
        }
    }

    Ok(())
}

/// `Y-M-D` or `Y/M/D` with a consistent separator, naming a real calendar day.
pub fn check_date(value: &str) -> bool {
    parse_date(value).is_some()
}

/// `H:M:S` on a 24-hour clock.
pub fn check_time(value: &str) -> bool {
    parse_time(value).is_some()
}

/// A date and a time separated by a single space.
pub fn check_datetime(value: &str) -> bool {
    match value.split_once(' ') {
        Some((date, time)) => parse_date(date).is_some() && parse_time(time).is_some(),
        None => false,
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let caps = date_regex().captures(value)?;
    if caps[2] != caps[4] {
        return None;
    }
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[3].parse().ok()?;
    let day: u32 = caps[5].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    let caps = time_regex().captures(value)?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    let second: u32 = caps[3].parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, second)
}

fn digits(s: &str) -> u32 {
    s.bytes()
        .fold(0, |acc, b| acc * 10 + u32::from(b.wrapping_sub(b'0')))
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;

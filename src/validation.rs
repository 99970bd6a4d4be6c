use lazy_static::lazy_static;
use regex::Regex;

use crate::error::AppError;

lazy_static! {
    static ref USERNAME_RE: Regex = Regex::new(r"^[a-zA-Z0-9]+$").unwrap();
    static ref NAME_RE: Regex = Regex::new(r"^[a-zA-Z\s]+$").unwrap();
    static ref EMAIL_RE: Regex = Regex::new(
        r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.(com|de|net|org|info|biz|gov|edu|mil)$"
    )
    .unwrap();
}

pub fn validate_license_plate(plate: &str) -> Result<(), AppError> {
    if plate.len() < 5 || plate.len() > 9 {
        return Err(AppError::Validation(
            "Kennzeichen muss zwischen 5 und 9 Zeichen lang sein".into(),
        ));
    }
    Ok(())
}

pub fn validate_power(power: i32) -> Result<(), AppError> {
    if !(0..=1000).contains(&power) {
        return Err(AppError::Validation(
            "Leistung muss zwischen 0 und 1000 liegen".into(),
        ));
    }
    Ok(())
}

pub fn validate_mileage(mileage: i32) -> Result<(), AppError> {
    if !(0..=1_000_000).contains(&mileage) {
        return Err(AppError::Validation(
            "Kilometerstand muss zwischen 0 und 1000000 liegen".into(),
        ));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), AppError> {
    if username.len() < 3 || username.len() > 50 || !USERNAME_RE.is_match(username) {
        return Err(AppError::Validation(
            "username must be 3-50 letters and digits".into(),
        ));
    }
    Ok(())
}

pub fn validate_person_name(name: &str) -> Result<(), AppError> {
    if name.len() < 3 || name.len() > 50 || !NAME_RE.is_match(name) {
        return Err(AppError::Validation(
            "name must be 3-50 letters and spaces".into(),
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    if email.len() < 3 || email.len() > 50 || !EMAIL_RE.is_match(email) {
        return Err(AppError::Validation("email is not valid".into()));
    }
    Ok(())
}

/// 8-15 chars with at least one lowercase, uppercase, digit and special
/// character. Checked with character scans; the `regex` crate has no
/// lookahead.
pub fn validate_password(password: &str) -> Result<(), AppError> {
    let len = password.chars().count();
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_ascii_alphanumeric());
    if !(8..=15).contains(&len) || !has_lower || !has_upper || !has_digit || !has_special {
        return Err(AppError::Validation(
            "password must be 8-15 chars with a lowercase letter, an uppercase letter, a digit and a special character".into(),
        ));
    }
    Ok(())
}

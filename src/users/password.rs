use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::error::AppError;

pub fn generate_salt() -> SaltString {
    SaltString::generate(&mut OsRng)
}

/// Hash a password with an explicit per-user salt and the deployment pepper.
/// The salt is also persisted in its own column alongside the PHC string.
pub fn hash_password(plain: &str, salt: &SaltString, pepper: &str) -> Result<String, AppError> {
    let peppered = format!("{plain}{pepper}");
    let hash = Argon2::default()
        .hash_password(peppered.as_bytes(), salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            AppError::Internal(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, pepper: &str, stored_hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        AppError::Internal(e.to_string())
    })?;
    let peppered = format!("{plain}{pepper}");
    Ok(Argon2::default()
        .verify_password(peppered.as_bytes(), &parsed)
        .is_ok())
}

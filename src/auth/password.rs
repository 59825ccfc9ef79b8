use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{RngCore, thread_rng};

use crate::error::AppError;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_PASSWORD_LEN: usize = 100;

const REFRESH_TOKEN_BYTES: usize = 48;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::bad_request(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::bad_request(format!(
            "Password must not exceed {MAX_PASSWORD_LEN} characters"
        )));
    }

    hash_with(&Argon2::default(), password)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|err| AppError::internal(format!("Invalid password hash: {err}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Opaque refresh token: random bytes, URL-safe base64 without padding.
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Refresh tokens are high-entropy, so they use a cheaper argon2 profile than
/// passwords. The parameters travel inside the PHC string.
pub fn hash_refresh_token(token: &str) -> Result<String, AppError> {
    hash_with(&refresh_hasher()?, token)
}

pub fn verify_refresh_token(token: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(token.as_bytes(), &parsed)
        .is_ok()
}

fn refresh_hasher() -> Result<Argon2<'static>, AppError> {
    let params = Params::new(4096, 1, 1, None)
        .map_err(|err| AppError::internal(format!("Invalid argon2 params: {err}")))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

fn hash_with(hasher: &Argon2<'_>, secret: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut thread_rng());
    hasher
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AppError::internal(format!("Hashing failed: {err}")))
}

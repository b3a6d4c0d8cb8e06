use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::OnceLock;

/// Password errors
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Password hashing failed")]
    HashingFailed,
    #[error("Invalid hash format")]
    InvalidHash,
}

/// Argon2id PHC string of `password` under a fresh random salt
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| PasswordError::HashingFailed)?;
    Ok(hash.to_string())
}

/// Check `password` against a stored PHC string. The parameters encoded in
/// the hash are used, so hashes from older settings keep verifying.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored).map_err(|_| PasswordError::InvalidHash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Spend the same argon2 work as a real verification and return `false`.
/// Used when the account does not exist, so both failures take as long.
pub fn verify_against_decoy(password: &str) -> bool {
    static DECOY: OnceLock<Option<String>> = OnceLock::new();

    if let Some(decoy) = DECOY.get_or_init(|| hash_password("geoobra-decoy-account").ok()) {
        let _ = verify_password(password, decoy);
    }
    false
}

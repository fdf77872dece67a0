use tracing::warn;

use crate::shared::AppError;

/// bcrypt cost for account passwords, matching the rest of the fleet
pub const PASSWORD_COST: u32 = 10;

/// Refresh secrets are long-lived bearer credentials, so they get a
/// higher work factor than interactive passwords.
pub const REFRESH_SECRET_COST: u32 = 12;

/// Hashes an account password with the standard cost.
pub fn hash_password(plaintext: &str) -> Result<String, AppError> {
    bcrypt::hash(plaintext, PASSWORD_COST).map_err(|e| {
        warn!(error = %e, "Failed to hash password");
        AppError::Internal
    })
}

/// Hashes a refresh-token secret before it is persisted.
pub fn hash_refresh_secret(secret: &str) -> Result<String, AppError> {
    bcrypt::hash(secret, REFRESH_SECRET_COST).map_err(|e| {
        warn!(error = %e, "Failed to hash refresh secret");
        AppError::Internal
    })
}

/// Compares a plaintext value against a stored bcrypt hash. An
/// unparseable stored hash counts as a mismatch, never an error.
pub fn verify(plaintext: &str, stored_hash: &str) -> bool {
    bcrypt::verify(plaintext, stored_hash).unwrap_or(false)
}

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;
use tracing::{error, warn};

use crate::error::{HrError, HrResult};

pub fn hash_password(plain: &str) -> HrResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            HrError::Password(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> HrResult<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        HrError::Password(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

fn is_phc(stored: &str) -> bool {
    stored.starts_with('$') && PasswordHash::new(stored).is_ok()
}

/// Checks a login attempt against the stored credential. Stored values that
/// are not PHC strings are legacy plaintext and only accepted when allowed.
pub(crate) fn credential_matches(stored: &str, attempt: &str, allow_plaintext: bool) -> bool {
    if is_phc(stored) {
        return verify_password(attempt, stored).unwrap_or(false);
    }
    if !allow_plaintext {
        return false;
    }
    let ok = !stored.is_empty() && constant_time_eq(stored.as_bytes(), attempt.as_bytes());
    if ok {
        warn!("account still uses a plaintext password");
    }
    ok
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

//! Argon2 password hashing for stored credentials.
//!
//! Hashes are PHC strings (`$argon2id$...`) with a random 16-byte salt.
//! Async callers use [`hash`], [`verify`] and [`verify_decoy`], which run the
//! Argon2 work on the blocking pool instead of a runtime worker.
use anyhow::{Context, Result, anyhow};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};
use rand::RngCore;
use std::sync::OnceLock;

static DECOY_HASH: OnceLock<String> = OnceLock::new();

pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|err| anyhow!(err.to_string()))?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow!(err.to_string()))?;
    Ok(hash.to_string())
}

/// False for a wrong password and for an unparseable hash alike.
pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

pub async fn hash(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .context("password hashing task")?
}

pub async fn verify(hash: String, password: String) -> bool {
    match tokio::task::spawn_blocking(move || verify_password(&hash, &password)).await {
        Ok(matched) => matched,
        Err(err) => {
            tracing::error!(error = %err, "password verification task failed");
            false
        }
    }
}

/// Spend one full verification on a hash no password matches.
///
/// Login runs this when no account was found, so a missing username costs
/// the same as a wrong password.
pub async fn verify_decoy(password: String) {
    let decoy = DECOY_HASH
        .get_or_init(|| hash_password("cadence-decoy-credential").unwrap_or_default())
        .clone();
    let _ = verify(decoy, password).await;
}

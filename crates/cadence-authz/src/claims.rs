//! Identity claims and the codec that turns them into session tokens.
//!
//! # Purpose
//! Issues a signed token for an authenticated user and reconstructs the exact
//! identity from a presented token without consulting storage.
//!
//! # Key invariants
//! - [`IdentityClaims`] are immutable once built; fields are read-only.
//! - `verify` returns the payload bit-for-bit as it was signed.
//! - The signing secret comes from [`SigningConfig`], loaded once at startup
//!   and shared by reference.
//!
//! # Security
//! - `SigningConfig` redacts the secret from `Debug`.
//! - Expired tokens are rejected with [`AuthError::TokenExpired`] only after
//!   the signature has been checked.
use crate::envelope::{EnvelopeCodec, SignedEnvelope, now_epoch_seconds};
use crate::{AuthError, AuthResult, GroupId, UserId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Extended session length used by "remember me" logins.
pub const REMEMBER_ME_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Process-wide token signing settings.
#[derive(Clone)]
pub struct SigningConfig {
    secret: Vec<u8>,
    default_ttl: Duration,
    remember_ttl: Duration,
}

impl SigningConfig {
    pub fn new(secret: Vec<u8>, default_ttl: Duration) -> Self {
        Self {
            secret,
            default_ttl,
            remember_ttl: REMEMBER_ME_TTL,
        }
    }

    pub fn ttl(&self, ttl: SessionTtl) -> Duration {
        match ttl {
            SessionTtl::Default => self.default_ttl,
            SessionTtl::Remember => self.remember_ttl,
        }
    }
}

impl std::fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningConfig")
            .field("secret", &"<redacted>")
            .field("default_ttl", &self.default_ttl)
            .field("remember_ttl", &self.remember_ttl)
            .finish()
    }
}

/// Session length requested at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTtl {
    Default,
    Remember,
}

/// Domain fields carried inside a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityPayload {
    pub user_id: UserId,
    pub username: String,
    pub mail: String,
    pub group_id: GroupId,
    pub root: bool,
}

/// Verified identity of a caller.
///
/// Built by [`ClaimsCodec::verify`] (or [`IdentityClaims::new`] in tests and
/// internal tooling) and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaims {
    identity: IdentityPayload,
    expires_at: i64,
}

impl IdentityClaims {
    pub fn new(identity: IdentityPayload, expires_at: i64) -> Self {
        Self {
            identity,
            expires_at,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.identity.user_id
    }

    pub fn username(&self) -> &str {
        &self.identity.username
    }

    pub fn mail(&self) -> &str {
        &self.identity.mail
    }

    pub fn group_id(&self) -> GroupId {
        self.identity.group_id
    }

    pub fn root(&self) -> bool {
        self.identity.root
    }

    /// Absolute expiry in epoch seconds.
    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    pub fn identity(&self) -> &IdentityPayload {
        &self.identity
    }
}

/// A freshly signed session token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: i64,
}

/// Issues and verifies session tokens.
#[derive(Debug, Clone)]
pub struct ClaimsCodec {
    config: Arc<SigningConfig>,
    envelope: EnvelopeCodec,
}

impl ClaimsCodec {
    pub fn new(config: Arc<SigningConfig>) -> Self {
        let envelope = EnvelopeCodec::hs256(&config.secret);
        Self { config, envelope }
    }

    /// Sign `identity` into a token valid for the requested session length.
    ///
    /// # Errors
    /// - `AuthError::SigningError` when the key is unavailable or encoding fails.
    pub fn issue(&self, identity: IdentityPayload, ttl: SessionTtl) -> AuthResult<IssuedToken> {
        self.issue_at(identity, ttl, now_epoch_seconds())
    }

    /// Same as [`ClaimsCodec::issue`] with an explicit issue instant.
    pub fn issue_at(
        &self,
        identity: IdentityPayload,
        ttl: SessionTtl,
        now: i64,
    ) -> AuthResult<IssuedToken> {
        let envelope = SignedEnvelope::seal(identity, self.config.ttl(ttl), now);
        let token = self.envelope.encode(&envelope)?;
        Ok(IssuedToken {
            token,
            expires_at: envelope.exp,
        })
    }

    /// Rebuild claims from a presented token.
    ///
    /// # Errors
    /// - `AuthError::TokenExpired` when the expiry has passed.
    /// - `AuthError::TokenMalformed` for any signature or structure problem.
    pub fn verify(&self, token: &str) -> AuthResult<IdentityClaims> {
        self.verify_at(token, now_epoch_seconds())
    }

    pub fn verify_at(&self, token: &str, now: i64) -> AuthResult<IdentityClaims> {
        let envelope: SignedEnvelope<IdentityPayload> = self.envelope.decode(token, now)?;
        Ok(IdentityClaims::new(envelope.payload, envelope.exp))
    }
}

impl From<&IdentityClaims> for IdentityPayload {
    fn from(claims: &IdentityClaims) -> Self {
        claims.identity.clone()
    }
}

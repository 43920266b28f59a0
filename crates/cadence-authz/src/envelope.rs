//! Generic signed, expiring envelope around an arbitrary claims payload.
//!
//! # Purpose
//! Separates the token mechanics (expiry, issue time, HS256 signature) from the
//! domain fields they protect, so the envelope can be exercised without any
//! identity types and reused for other payloads.
//!
//! # Key invariants
//! - Only HS256 is produced or accepted.
//! - An envelope is expired when `exp <= now`; a token expiring this second is
//!   already rejected.
//! - Signature and structure are checked before expiry, so a forged token is
//!   always reported as malformed, never as expired.
//!
//! # Security
//! - The secret never appears in `Debug` output.
use crate::{AuthError, AuthResult};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Expiry and issue time wrapped around a flattened payload.
///
/// # Example
/// ```rust
/// use cadence_authz::SignedEnvelope;
/// use std::time::Duration;
///
/// let envelope = SignedEnvelope::seal("payload", Duration::from_secs(60), 1_000);
/// assert_eq!(envelope.exp, 1_060);
/// assert!(!envelope.is_expired_at(1_059));
/// assert!(envelope.is_expired_at(1_060));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedEnvelope<P> {
    pub exp: i64,
    pub iat: i64,
    #[serde(flatten)]
    pub payload: P,
}

impl<P> SignedEnvelope<P> {
    /// Wrap `payload` so it expires `ttl` after `now` (epoch seconds).
    pub fn seal(payload: P, ttl: Duration, now: i64) -> Self {
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        Self {
            exp: now.saturating_add(ttl_secs),
            iat: now,
            payload,
        }
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp <= now
    }
}

/// HS256 encoder/decoder for [`SignedEnvelope`] values.
#[derive(Clone)]
pub struct EnvelopeCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    key_available: bool,
}

impl std::fmt::Debug for EnvelopeCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeCodec")
            .field("algorithm", &Algorithm::HS256)
            .field("key_available", &self.key_available)
            .finish()
    }
}

impl EnvelopeCodec {
    /// Build a codec from a shared secret. An empty secret yields a codec that
    /// refuses to sign and rejects every token.
    pub fn hs256(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            key_available: !secret.is_empty(),
        }
    }

    /// Sign an envelope into a compact JWT.
    ///
    /// # Errors
    /// - `AuthError::SigningError` if the key is unavailable or serialization fails.
    pub fn encode<P: Serialize>(&self, envelope: &SignedEnvelope<P>) -> AuthResult<String> {
        if !self.key_available {
            return Err(AuthError::SigningError(
                "signing key unavailable".to_string(),
            ));
        }
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), envelope, &self.encoding)
            .map_err(|err| AuthError::SigningError(err.to_string()))
    }

    /// Verify signature and structure, then expiry against `now`.
    ///
    /// # Errors
    /// - `AuthError::TokenMalformed` for bad signatures, wrong algorithms, or
    ///   payloads that do not match `P`.
    /// - `AuthError::TokenExpired` when `exp <= now`.
    pub fn decode<P: DeserializeOwned>(
        &self,
        token: &str,
        now: i64,
    ) -> AuthResult<SignedEnvelope<P>> {
        if !self.key_available {
            return Err(AuthError::TokenMalformed(
                "verification key unavailable".to_string(),
            ));
        }
        // Expiry is checked below with a strict comparison and no leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        let data = jsonwebtoken::decode::<SignedEnvelope<P>>(token, &self.decoding, &validation)
            .map_err(|err| AuthError::TokenMalformed(err.to_string()))?;
        if data.claims.is_expired_at(now) {
            return Err(AuthError::TokenExpired);
        }
        Ok(data.claims)
    }
}

/// Wall-clock seconds since the Unix epoch; clamps to zero on a skewed clock.
pub fn now_epoch_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_secs() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct Probe {
        name: String,
        level: u32,
    }

    fn probe() -> Probe {
        Probe {
            name: "probe".to_string(),
            level: 3,
        }
    }

    #[test]
    fn encode_then_decode_preserves_payload() {
        let codec = EnvelopeCodec::hs256(b"envelope-secret");
        let now = now_epoch_seconds();
        let sealed = SignedEnvelope::seal(probe(), Duration::from_secs(120), now);
        let token = codec.encode(&sealed).expect("encode");
        let opened: SignedEnvelope<Probe> = codec.decode(&token, now).expect("decode");
        assert_eq!(opened, sealed);
    }

    #[test]
    fn expiry_boundary_is_strict() {
        let codec = EnvelopeCodec::hs256(b"envelope-secret");
        let sealed = SignedEnvelope::seal(probe(), Duration::from_secs(10), 1_000);
        let token = codec.encode(&sealed).expect("encode");

        assert!(codec.decode::<Probe>(&token, 1_009).is_ok());
        let err = codec.decode::<Probe>(&token, 1_010).expect_err("expired");
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[test]
    fn wrong_secret_is_malformed_even_when_expired() {
        let signer = EnvelopeCodec::hs256(b"secret-a");
        let verifier = EnvelopeCodec::hs256(b"secret-b");
        let sealed = SignedEnvelope::seal(probe(), Duration::from_secs(10), 1_000);
        let token = signer.encode(&sealed).expect("encode");

        let err = verifier
            .decode::<Probe>(&token, 5_000)
            .expect_err("bad signature");
        assert!(matches!(err, AuthError::TokenMalformed(_)));
    }

    #[test]
    fn payload_shape_mismatch_is_malformed() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Other {
            unrelated: Vec<u8>,
        }

        let codec = EnvelopeCodec::hs256(b"envelope-secret");
        let now = now_epoch_seconds();
        let token = codec
            .encode(&SignedEnvelope::seal(probe(), Duration::from_secs(60), now))
            .expect("encode");
        let err = codec.decode::<Other>(&token, now).expect_err("shape");
        assert!(matches!(err, AuthError::TokenMalformed(_)));
    }

    #[test]
    fn garbage_token_is_malformed() {
        let codec = EnvelopeCodec::hs256(b"envelope-secret");
        let err = codec
            .decode::<Probe>("not.a.jwt", now_epoch_seconds())
            .expect_err("garbage");
        assert!(matches!(err, AuthError::TokenMalformed(_)));
    }

    #[test]
    fn empty_secret_refuses_to_sign() {
        let codec = EnvelopeCodec::hs256(b"");
        let sealed = SignedEnvelope::seal(probe(), Duration::from_secs(10), 1_000);
        let err = codec.encode(&sealed).expect_err("no key");
        assert!(matches!(err, AuthError::SigningError(_)));
    }

    #[test]
    fn debug_output_hides_secret() {
        let codec = EnvelopeCodec::hs256(b"super-secret-value");
        let rendered = format!("{codec:?}");
        assert!(!rendered.contains("super-secret-value"));
    }
}

//! Credential check and session token issuance.
//!
//! # Purpose
//! Turns a username and password into a signed session token.
//!
//! # Security
//! - An unknown username and a wrong password produce the same
//!   `AuthError::InvalidCredentials`, so callers cannot probe for accounts.
//! - Store failures during lookup are logged and also reported as invalid
//!   credentials.
//! - A missing account still pays for one Argon2 verification, so response
//!   time does not reveal whether the username exists.
use crate::auth::password;
use crate::store::{CredentialStore, StoreError};
use cadence_authz::{AuthError, AuthResult, ClaimsCodec, GroupId, SessionTtl, UserId};
use std::sync::Arc;

/// Token plus the profile fields a client needs right after login.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub expires_at: i64,
    pub user_id: UserId,
    pub group_id: GroupId,
    pub root: bool,
    pub mail: String,
}

pub struct SessionIssuer {
    credentials: Arc<dyn CredentialStore>,
    codec: ClaimsCodec,
}

impl SessionIssuer {
    pub fn new(credentials: Arc<dyn CredentialStore>, codec: ClaimsCodec) -> Self {
        Self { credentials, codec }
    }

    /// Verify credentials and issue a token for the stored profile.
    ///
    /// # Errors
    /// - `AuthError::InvalidCredentials` when the user is unknown or the
    ///   password does not match.
    /// - `AuthError::SigningError` from the codec.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
        ttl: SessionTtl,
    ) -> AuthResult<Session> {
        let record = match self.credentials.find_by_username(username).await {
            Ok(record) => record,
            Err(err) => {
                if !matches!(err, StoreError::NotFound(_)) {
                    tracing::error!(error = ?err, "credential lookup failed");
                }
                password::verify_decoy(password.to_string()).await;
                return Err(AuthError::InvalidCredentials);
            }
        };
        if !self.credentials.verify_password(&record, password).await {
            return Err(AuthError::InvalidCredentials);
        }

        let user = record.user;
        let issued = self.codec.issue(user.identity(), ttl)?;
        tracing::info!(user_id = %user.id, group_id = %user.group_id, "session issued");
        Ok(Session {
            token: issued.token,
            expires_at: issued.expires_at,
            user_id: user.id,
            group_id: user.group_id,
            root: user.root,
            mail: user.mail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewUser, UserRecord};
    use crate::store::memory::InMemoryStore;
    use crate::store::{StoreResult, UserStore};
    use async_trait::async_trait;
    use cadence_authz::SigningConfig;
    use std::time::Duration;

    fn codec(secret: &[u8]) -> ClaimsCodec {
        ClaimsCodec::new(Arc::new(SigningConfig::new(
            secret.to_vec(),
            Duration::from_secs(600),
        )))
    }

    async fn store_with_alice() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        store
            .create_user(NewUser {
                username: "alice".to_string(),
                password: "wonderland".to_string(),
                mail: "alice@example.com".to_string(),
                group_id: GroupId::new(1),
                root: false,
            })
            .await
            .expect("user");
        store
    }

    struct BrokenCredentials;

    #[async_trait]
    impl CredentialStore for BrokenCredentials {
        async fn find_by_username(&self, _username: &str) -> StoreResult<UserRecord> {
            Err(StoreError::Unexpected(anyhow::anyhow!("db down")))
        }

        async fn verify_password(&self, _record: &UserRecord, _plaintext: &str) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn valid_credentials_issue_verifiable_token() {
        let codec = codec(b"session-secret");
        let issuer = SessionIssuer::new(store_with_alice().await, codec.clone());
        let session = issuer
            .authenticate("alice", "wonderland", SessionTtl::Default)
            .await
            .expect("login");
        let claims = codec.verify(&session.token).expect("verify");
        assert_eq!(claims.username(), "alice");
        assert_eq!(claims.user_id(), session.user_id);
        assert_eq!(claims.group_id(), GroupId::new(1));
        assert_eq!(session.mail, "alice@example.com");
        assert!(!session.root);
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_are_indistinguishable() {
        let issuer = SessionIssuer::new(store_with_alice().await, codec(b"session-secret"));
        let wrong_password = issuer
            .authenticate("alice", "not-it", SessionTtl::Default)
            .await
            .expect_err("wrong password");
        let unknown_user = issuer
            .authenticate("mallory", "wonderland", SessionTtl::Default)
            .await
            .expect_err("unknown user");
        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_user, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert_eq!(wrong_password.code(), unknown_user.code());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn unknown_user_costs_as_much_as_wrong_password() {
        let issuer = SessionIssuer::new(store_with_alice().await, codec(b"session-secret"));
        // Warm the decoy hash so its one-time setup is not measured.
        let _ = issuer
            .authenticate("mallory", "warm-up", SessionTtl::Default)
            .await;

        let mut known = Duration::ZERO;
        let mut unknown = Duration::ZERO;
        for _ in 0..3 {
            let started = std::time::Instant::now();
            let _ = issuer
                .authenticate("alice", "not-it", SessionTtl::Default)
                .await;
            known += started.elapsed();

            let started = std::time::Instant::now();
            let _ = issuer
                .authenticate("mallory", "not-it", SessionTtl::Default)
                .await;
            unknown += started.elapsed();
        }
        assert!(
            unknown * 5 > known,
            "unknown={unknown:?} known={known:?}"
        );
    }

    #[tokio::test]
    async fn store_failure_is_reported_as_invalid_credentials() {
        let issuer = SessionIssuer::new(Arc::new(BrokenCredentials), codec(b"session-secret"));
        let err = issuer
            .authenticate("alice", "wonderland", SessionTtl::Default)
            .await
            .expect_err("broken store");
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn signing_error_propagates() {
        let issuer = SessionIssuer::new(store_with_alice().await, codec(b""));
        let err = issuer
            .authenticate("alice", "wonderland", SessionTtl::Remember)
            .await
            .expect_err("no key");
        assert!(matches!(err, AuthError::SigningError(_)));
    }
}

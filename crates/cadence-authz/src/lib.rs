//! Cadence authn/authz primitives shared by the admin service and its tests.
//!
//! # Purpose
//! Centralizes session token issuance/verification, the identity claims they
//! carry, and the fixed-role authorization predicates every privileged admin
//! action is checked against.
//!
//! # How it fits
//! The admin service mints tokens at login through [`ClaimsCodec`], rebuilds
//! [`IdentityClaims`] from the presented token on each request, and asks the
//! [`guard`] predicates whether the caller may act on a group or node before
//! any state changes.
//!
//! # Key invariants
//! - Tokens are HS256 JWTs signed with a process-wide secret that is loaded
//!   once and never mutated.
//! - Claims are immutable; renewal means issuing a new token.
//! - Guard predicates fail closed: an unresolvable node is never owned.
//!
//! # Examples
//! ```rust
//! use cadence_authz::{ClaimsCodec, GroupId, IdentityPayload, SessionTtl, SigningConfig, UserId};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let config = Arc::new(SigningConfig::new(b"secret".to_vec(), Duration::from_secs(60)));
//! let codec = ClaimsCodec::new(config);
//! let issued = codec
//!     .issue(
//!         IdentityPayload {
//!             user_id: UserId::new(3),
//!             username: "alice".to_string(),
//!             mail: "alice@example.com".to_string(),
//!             group_id: GroupId::new(7),
//!             root: false,
//!         },
//!         SessionTtl::Default,
//!     )
//!     .expect("issue");
//! let claims = codec.verify(&issued.token).expect("verify");
//! assert_eq!(claims.username(), "alice");
//! ```
//!
//! # Common pitfalls
//! - Comparing group ids inline in handlers instead of using [`guard`]; the
//!   super-group bypass is easy to forget.
//! - Treating a node lookup error as "allowed".

mod claims;
mod envelope;
mod errors;
pub mod guard;
mod types;

pub use claims::{
    ClaimsCodec, IdentityClaims, IdentityPayload, IssuedToken, REMEMBER_ME_TTL, SessionTtl,
    SigningConfig,
};
pub use envelope::{EnvelopeCodec, SignedEnvelope, now_epoch_seconds};
pub use errors::{AuthError, AuthResult, LookupError};
pub use guard::NodeDirectory;
pub use types::{GroupId, NodeAddr, SUPER_GROUP_ID, UserId};

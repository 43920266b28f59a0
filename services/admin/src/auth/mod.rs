//! Admin-plane authentication.
//!
//! # Purpose
//! Groups password hashing, login session issuance, and bearer-token
//! extraction. Token encoding and the authorization guard live in
//! `cadence-authz`.
pub mod bearer;
pub mod password;
pub mod session;

pub use session::{Session, SessionIssuer};

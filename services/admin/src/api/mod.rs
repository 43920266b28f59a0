//! Admin-plane HTTP API module.
//!
//! # Purpose
//! Exposes the route handler modules. Handlers share one shape: validate the
//! body, resolve the caller's claims, run the guard, act, then publish.
pub mod error;
pub mod jobs;
pub mod openapi;
pub mod system;
pub mod types;
pub mod users;

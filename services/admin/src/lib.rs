//! Cadence admin-plane library crate.
//!
//! # Purpose
//! Exposes the admin HTTP API, session and audit plumbing, configuration, and
//! storage implementations for use by the binary and tests.
pub mod api;
pub mod app;
pub mod audit;
pub mod auth;
pub mod config;
pub mod model;
pub mod observability;
pub mod store;

//! Authentication service for the DriveHub dealership platform.
//!
//! Serves three independent principal populations (client users,
//! dealerships, platform admins) with the same session machinery:
//! bearer-token issuance, password rotation with full session
//! invalidation, and explicit logout backed by a Redis revocation
//! store.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod security;
pub mod services;

pub use config::Config;
pub use error::{AuthError, Result};

//! Token Security Library
//!
//! Signed bearer credentials and their revocation:
//! - HS256 token codec with an explicit error taxonomy
//! - Revocation store contract (blacklist + per-principal watermark)
//! - Redis-backed store with self-expiring entries
//! - In-memory store for tests and local development
//!
//! The codec is pure and stateless; revocation checks are the caller's
//! responsibility so the two concerns compose at the request gate.

pub mod codec;
pub mod memory;
pub mod redis_store;
pub mod revocation;

pub use codec::{Claims, TokenCodec, TokenError};
pub use memory::MemoryRevocationStore;
pub use redis_store::RedisRevocationStore;
pub use revocation::{RevocationError, RevocationStore};

//! Revocation store contract
//!
//! Two kinds of entries, both self-expiring:
//! - a blacklist entry for one exact token value, kept until the
//!   token's own natural expiry
//! - a per-principal watermark: every token with `iat <= cutoff` is
//!   revoked, without enumerating token values
//!
//! Implementations must never report an entry as revoked after its
//! expiry has passed, and must never drop an unexpired entry early.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RevocationError {
    #[error("revocation store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Record that `token` must be rejected until `expires_at`.
    /// Revoking an already-revoked token is a no-op success.
    async fn revoke(&self, token: &str, expires_at: i64) -> Result<(), RevocationError>;

    /// True iff an unexpired blacklist entry exists for this exact
    /// token value. The watermark is checked separately because it
    /// needs the decoded `iat`, which the raw value does not expose.
    async fn is_revoked(&self, token: &str) -> Result<bool, RevocationError>;

    /// Record a standing rule that any token for `principal_id` with
    /// `iat <= cutoff` is revoked. `expires_at` bounds the entry's
    /// lifetime: no token issued at or before the cutoff can outlive
    /// it, so expiry never resurrects a revoked token and never
    /// touches tokens minted after the cutoff.
    async fn revoke_all_before(
        &self,
        principal_id: Uuid,
        cutoff: i64,
        expires_at: i64,
    ) -> Result<(), RevocationError>;

    /// Current watermark cutoff for `principal_id`, if one is active.
    async fn watermark(&self, principal_id: Uuid) -> Result<Option<i64>, RevocationError>;
}

//! Session authority: register, login, change-password, logout
//!
//! One service instance per principal kind, all sharing this logic
//! through the `CredentialStore` seam. Login never touches the
//! revocation store; change-password writes its watermark before any
//! fresh token leaves the service.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use token_security::{RevocationStore, TokenCodec};
use uuid::Uuid;

use crate::db::CredentialStore;
use crate::error::{AuthError, Result};
use crate::models::{PrincipalKind, PrincipalRecord};
use crate::security::password;

/// A freshly minted credential plus the identity it was minted for.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub principal_id: Uuid,
    pub email: String,
    pub role: String,
    pub token: String,
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn CredentialStore>,
    codec: Arc<TokenCodec>,
    revocations: Arc<dyn RevocationStore>,
}

impl SessionService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        codec: Arc<TokenCodec>,
        revocations: Arc<dyn RevocationStore>,
    ) -> Self {
        Self {
            store,
            codec,
            revocations,
        }
    }

    pub fn kind(&self) -> PrincipalKind {
        self.store.kind()
    }

    fn issue(&self, record: &PrincipalRecord) -> Result<IssuedSession> {
        let token = self.codec.mint(record.id, &record.role)?;
        Ok(IssuedSession {
            principal_id: record.id,
            email: record.email.clone(),
            role: record.role.clone(),
            token,
            expires_in: self.codec.ttl_secs(),
        })
    }

    pub async fn register(
        &self,
        email: &str,
        raw_password: &str,
        role: Option<&str>,
        profile: Option<Value>,
    ) -> Result<IssuedSession> {
        let kind = self.store.kind();
        let role = match role {
            Some(role) if kind.role_allowed(role) => role,
            Some(role) => {
                return Err(AuthError::InvalidInput(format!(
                    "role '{}' is not valid here",
                    role
                )))
            }
            None => kind.default_role(),
        };

        if self.store.find_by_email(email).await?.is_some() {
            return Err(AuthError::AlreadyExists);
        }

        let password_hash = password::hash_password(raw_password)?;
        let record = self.store.insert(email, &password_hash, role, profile).await?;

        tracing::info!(principal_id = %record.id, role = %record.role, "principal registered");
        self.issue(&record)
    }

    pub async fn login(&self, email: &str, raw_password: &str) -> Result<IssuedSession> {
        let record = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(AuthError::NotFound)?;

        password::verify_password(raw_password, &record.password_hash)?;

        tracing::info!(principal_id = %record.id, "login");
        self.issue(&record)
    }

    /// Rotate the password and invalidate every token issued under the
    /// old one. The watermark write is durable before the fresh token
    /// is returned; a failed write returns `Unavailable` and no token.
    pub async fn change_password(
        &self,
        principal_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<IssuedSession> {
        let record = self
            .store
            .find_by_id(principal_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        password::verify_password(current_password, &record.password_hash)?;

        let password_hash = password::hash_password(new_password)?;
        self.store.update_password(principal_id, &password_hash).await?;

        // Cutoff one second in the past: claims carry whole-second
        // timestamps, so a cutoff of `now` would also kill the fresh
        // token minted below. The watermark entry itself only needs to
        // outlive the longest-lived token issued at or before the
        // cutoff.
        let cutoff = Utc::now().timestamp() - 1;
        self.revocations
            .revoke_all_before(principal_id, cutoff, cutoff + self.codec.ttl_secs())
            .await?;

        tracing::info!(principal_id = %principal_id, "password changed, outstanding tokens revoked");
        self.issue(&record)
    }

    /// Revoke the presented token until its natural expiry. A second
    /// logout with the same token is a client error, not a silent
    /// success.
    pub async fn logout(&self, token: &str) -> Result<()> {
        let claims = self.codec.parse(token)?;

        if self.revocations.is_revoked(token).await? {
            return Err(AuthError::AlreadyRevoked);
        }

        self.revocations.revoke(token, claims.exp).await?;

        tracing::info!(principal_id = %claims.sub, "logout");
        Ok(())
    }

    pub async fn profile(&self, principal_id: Uuid) -> Result<PrincipalRecord> {
        self.store
            .find_by_id(principal_id)
            .await?
            .ok_or(AuthError::NotFound)
    }
}

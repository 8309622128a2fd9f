//! Credential store seam
//!
//! The session authority is written once against this trait; each
//! principal kind supplies a small adapter rather than re-deriving
//! the login/logout/change-password state machine.

pub mod principals;

pub use principals::PgCredentialStore;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{PrincipalKind, PrincipalRecord};

#[async_trait]
pub trait CredentialStore: Send + Sync {
    fn kind(&self) -> PrincipalKind;

    async fn find_by_email(&self, email: &str) -> Result<Option<PrincipalRecord>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PrincipalRecord>>;

    /// Persist a new principal. Fails with `AlreadyExists` when the
    /// email is already taken.
    async fn insert(
        &self,
        email: &str,
        password_hash: &str,
        role: &str,
        profile: Option<Value>,
    ) -> Result<PrincipalRecord>;

    /// Replace the stored hash. Fails with `NotFound` for an unknown id.
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<()>;
}

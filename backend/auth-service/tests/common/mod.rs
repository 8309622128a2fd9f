//! Shared test fixtures: an in-memory credential store and a fully
//! wired session service that needs no Postgres or Redis.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use token_security::{MemoryRevocationStore, RevocationError, RevocationStore, TokenCodec};
use uuid::Uuid;

use auth_service::db::CredentialStore;
use auth_service::error::{AuthError, Result};
use auth_service::models::{PrincipalKind, PrincipalRecord};
use auth_service::services::SessionService;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const TEST_TTL: i64 = 3600;

pub struct MemoryCredentialStore {
    kind: PrincipalKind,
    records: Mutex<Vec<PrincipalRecord>>,
}

impl MemoryCredentialStore {
    pub fn new(kind: PrincipalKind) -> Self {
        Self {
            kind,
            records: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    fn kind(&self) -> PrincipalKind {
        self.kind
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<PrincipalRecord>> {
        let records = self.records.lock().unwrap();
        Ok(records.iter().find(|r| r.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PrincipalRecord>> {
        let records = self.records.lock().unwrap();
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn insert(
        &self,
        email: &str,
        password_hash: &str,
        role: &str,
        profile: Option<Value>,
    ) -> Result<PrincipalRecord> {
        let mut records = self.records.lock().unwrap();
        if records.iter().any(|r| r.email == email) {
            return Err(AuthError::AlreadyExists);
        }

        let record = PrincipalRecord {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role: role.to_string(),
            profile,
            created_at: Utc::now(),
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.password_hash = password_hash.to_string();
                Ok(())
            }
            None => Err(AuthError::NotFound),
        }
    }
}

/// Revocation store whose backend is permanently down. Every call
/// fails with `Unavailable`, like Redis with the plug pulled.
pub struct DownRevocationStore;

#[async_trait]
impl RevocationStore for DownRevocationStore {
    async fn revoke(
        &self,
        _token: &str,
        _expires_at: i64,
    ) -> std::result::Result<(), RevocationError> {
        Err(RevocationError::Unavailable("connection refused".to_string()))
    }

    async fn is_revoked(&self, _token: &str) -> std::result::Result<bool, RevocationError> {
        Err(RevocationError::Unavailable("connection refused".to_string()))
    }

    async fn revoke_all_before(
        &self,
        _principal_id: Uuid,
        _cutoff: i64,
        _expires_at: i64,
    ) -> std::result::Result<(), RevocationError> {
        Err(RevocationError::Unavailable("connection refused".to_string()))
    }

    async fn watermark(
        &self,
        _principal_id: Uuid,
    ) -> std::result::Result<Option<i64>, RevocationError> {
        Err(RevocationError::Unavailable("connection refused".to_string()))
    }
}

pub struct TestHarness {
    pub service: SessionService,
    pub codec: Arc<TokenCodec>,
    pub revocations: Arc<dyn RevocationStore>,
}

pub fn harness(kind: PrincipalKind) -> TestHarness {
    harness_with(kind, Arc::new(MemoryRevocationStore::new()))
}

pub fn harness_with(kind: PrincipalKind, revocations: Arc<dyn RevocationStore>) -> TestHarness {
    let codec = Arc::new(TokenCodec::new(TEST_SECRET, TEST_TTL));
    let service = SessionService::new(
        Arc::new(MemoryCredentialStore::new(kind)),
        codec.clone(),
        revocations.clone(),
    );
    TestHarness {
        service,
        codec,
        revocations,
    }
}

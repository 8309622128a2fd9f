//! In-memory revocation store for tests and local development
//!
//! Same observable contract as the Redis store; expired entries are
//! pruned lazily on read.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::revocation::{RevocationError, RevocationStore};

#[derive(Debug, Clone, Copy)]
struct WatermarkEntry {
    cutoff: i64,
    expires_at: i64,
}

#[derive(Default)]
pub struct MemoryRevocationStore {
    tokens: Mutex<HashMap<String, i64>>,
    watermarks: Mutex<HashMap<Uuid, WatermarkEntry>>,
}

impl MemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn revoke(&self, token: &str, expires_at: i64) -> Result<(), RevocationError> {
        if expires_at <= Utc::now().timestamp() {
            return Ok(());
        }
        self.tokens
            .lock()
            .unwrap()
            .insert(token.to_string(), expires_at);
        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> Result<bool, RevocationError> {
        let now = Utc::now().timestamp();
        let mut tokens = self.tokens.lock().unwrap();
        match tokens.get(token).copied() {
            Some(expires_at) if now < expires_at => Ok(true),
            Some(_) => {
                tokens.remove(token);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    async fn revoke_all_before(
        &self,
        principal_id: Uuid,
        cutoff: i64,
        expires_at: i64,
    ) -> Result<(), RevocationError> {
        if expires_at <= Utc::now().timestamp() {
            return Ok(());
        }
        self.watermarks
            .lock()
            .unwrap()
            .insert(principal_id, WatermarkEntry { cutoff, expires_at });
        Ok(())
    }

    async fn watermark(&self, principal_id: Uuid) -> Result<Option<i64>, RevocationError> {
        let now = Utc::now().timestamp();
        let mut watermarks = self.watermarks.lock().unwrap();
        match watermarks.get(&principal_id).copied() {
            Some(entry) if now < entry.expires_at => Ok(Some(entry.cutoff)),
            Some(_) => {
                watermarks.remove(&principal_id);
                Ok(None)
            }
            None => Ok(None),
        }
    }
}

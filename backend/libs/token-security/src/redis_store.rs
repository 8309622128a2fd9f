//! Redis-backed revocation store
//!
//! Entries are plain `SET ... EX` keys, so Redis prunes them the
//! moment their expiry passes and the store never grows beyond the
//! set of not-yet-naturally-expired revocations. Token values are
//! SHA-256 hashed before use as keys to keep raw credentials out of
//! the keyspace.

use async_trait::async_trait;
use chrono::Utc;
use redis::aio::ConnectionManager;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::revocation::{RevocationError, RevocationStore};

pub struct RedisRevocationStore {
    redis: ConnectionManager,
}

impl RedisRevocationStore {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    fn token_key(token: &str) -> String {
        format!("revoked:token:{}", sha256_hex(token))
    }

    fn watermark_key(principal_id: Uuid) -> String {
        format!("revoked:principal:{}:ts", principal_id)
    }
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn revoke(&self, token: &str, expires_at: i64) -> Result<(), RevocationError> {
        let remaining = expires_at - Utc::now().timestamp();
        if remaining <= 0 {
            // The token is already past its natural expiry; parse()
            // rejects it on its own.
            return Ok(());
        }

        let mut redis = self.redis.clone();
        redis::cmd("SET")
            .arg(Self::token_key(token))
            .arg("1")
            .arg("EX")
            .arg(remaining)
            .query_async::<_, ()>(&mut redis)
            .await
            .map_err(|e| RevocationError::Unavailable(e.to_string()))?;

        tracing::info!(ttl = remaining, "token revoked, entry expires with the token");
        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> Result<bool, RevocationError> {
        let mut redis = self.redis.clone();
        let exists: bool = redis::cmd("EXISTS")
            .arg(Self::token_key(token))
            .query_async(&mut redis)
            .await
            .map_err(|e| RevocationError::Unavailable(e.to_string()))?;

        Ok(exists)
    }

    async fn revoke_all_before(
        &self,
        principal_id: Uuid,
        cutoff: i64,
        expires_at: i64,
    ) -> Result<(), RevocationError> {
        let remaining = expires_at - Utc::now().timestamp();
        if remaining <= 0 {
            return Ok(());
        }

        let mut redis = self.redis.clone();
        redis::cmd("SET")
            .arg(Self::watermark_key(principal_id))
            .arg(cutoff.to_string())
            .arg("EX")
            .arg(remaining)
            .query_async::<_, ()>(&mut redis)
            .await
            .map_err(|e| RevocationError::Unavailable(e.to_string()))?;

        tracing::warn!(principal_id = %principal_id, cutoff, "all outstanding tokens revoked");
        Ok(())
    }

    async fn watermark(&self, principal_id: Uuid) -> Result<Option<i64>, RevocationError> {
        let mut redis = self.redis.clone();
        let cutoff: Option<String> = redis::cmd("GET")
            .arg(Self::watermark_key(principal_id))
            .query_async(&mut redis)
            .await
            .map_err(|e| RevocationError::Unavailable(e.to_string()))?;

        match cutoff {
            Some(raw) => raw
                .parse::<i64>()
                .map(Some)
                .map_err(|_| RevocationError::Unavailable("corrupt watermark entry".to_string())),
            None => Ok(None),
        }
    }
}

fn sha256_hex(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

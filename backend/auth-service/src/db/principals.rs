//! Postgres credential store, one instance per principal table

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::CredentialStore;
use crate::error::{AuthError, Result};
use crate::models::{PrincipalKind, PrincipalRecord};

const COLUMNS: &str = "id, email, password_hash, role, profile, created_at";

#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
    kind: PrincipalKind,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool, kind: PrincipalKind) -> Self {
        Self { pool, kind }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    fn kind(&self) -> PrincipalKind {
        self.kind
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<PrincipalRecord>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE email = $1",
            COLUMNS,
            self.kind.table()
        );
        let record = sqlx::query_as::<_, PrincipalRecord>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PrincipalRecord>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            COLUMNS,
            self.kind.table()
        );
        let record = sqlx::query_as::<_, PrincipalRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    async fn insert(
        &self,
        email: &str,
        password_hash: &str,
        role: &str,
        profile: Option<Value>,
    ) -> Result<PrincipalRecord> {
        let sql = format!(
            "INSERT INTO {} (id, email, password_hash, role, profile) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            self.kind.table(),
            COLUMNS
        );
        let record = sqlx::query_as::<_, PrincipalRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(email)
            .bind(password_hash)
            .bind(role)
            .bind(profile)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                // Unique-index backstop for concurrent registrations;
                // the engine's duplicate-key error must not leak out.
                sqlx::Error::Database(db) if db.is_unique_violation() => AuthError::AlreadyExists,
                _ => AuthError::from(e),
            })?;

        Ok(record)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<()> {
        let sql = format!(
            "UPDATE {} SET password_hash = $1 WHERE id = $2",
            self.kind.table()
        );
        let result = sqlx::query(&sql)
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::NotFound);
        }

        Ok(())
    }
}

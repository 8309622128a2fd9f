use chrono::{DateTime, Utc};
use uuid::Uuid;

/// The three independent principal kinds. Each kind has its own
/// credential table and default role tag; sessions and revocation
/// treat all three identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalKind {
    User,
    Dealership,
    Admin,
}

impl PrincipalKind {
    pub fn table(&self) -> &'static str {
        match self {
            PrincipalKind::User => "users",
            PrincipalKind::Dealership => "dealerships",
            PrincipalKind::Admin => "admins",
        }
    }

    pub fn default_role(&self) -> &'static str {
        match self {
            PrincipalKind::User => "client",
            PrincipalKind::Dealership => "dealership",
            PrincipalKind::Admin => "admin",
        }
    }

    /// Only the user kind carries sub-roles.
    pub fn role_allowed(&self, role: &str) -> bool {
        match self {
            PrincipalKind::User => matches!(role, "client" | "staff"),
            PrincipalKind::Dealership => role == "dealership",
            PrincipalKind::Admin => role == "admin",
        }
    }
}

/// Credential-store row for any principal kind.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PrincipalRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub profile: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

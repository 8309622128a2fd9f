/// Authentication handlers
///
/// Thin HTTP shims over the session service; one scope per principal
/// kind mounts the same handlers against its own service instance.
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::AuthError;
use crate::middleware::{AuthContext, BearerToken};
use crate::services::{IssuedSession, SessionService};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    /// Optional sub-role; only meaningful for the user kind.
    pub role: Option<String>,

    /// Free-form profile attributes (location, contact info, ...).
    pub profile: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,

    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub principal_id: Uuid,
    pub email: String,
    pub role: String,
    pub token: String,
    pub expires_in: i64,
}

impl From<IssuedSession> for SessionResponse {
    fn from(session: IssuedSession) -> Self {
        Self {
            principal_id: session.principal_id,
            email: session.email,
            role: session.role,
            token: session.token,
            expires_in: session.expires_in,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub principal_id: Uuid,
    pub email: String,
    pub role: String,
    pub profile: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

pub async fn register(
    service: web::Data<SessionService>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AuthError> {
    payload.validate()?;

    let session = service
        .register(
            &payload.email,
            &payload.password,
            payload.role.as_deref(),
            payload.profile.clone(),
        )
        .await?;

    Ok(HttpResponse::Created().json(SessionResponse::from(session)))
}

pub async fn login(
    service: web::Data<SessionService>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AuthError> {
    payload.validate()?;

    let session = service.login(&payload.email, &payload.password).await?;

    Ok(HttpResponse::Ok().json(SessionResponse::from(session)))
}

pub async fn change_password(
    service: web::Data<SessionService>,
    context: AuthContext,
    payload: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, AuthError> {
    payload.validate()?;

    let session = service
        .change_password(
            context.principal_id,
            &payload.current_password,
            &payload.new_password,
        )
        .await?;

    Ok(HttpResponse::Ok().json(SessionResponse::from(session)))
}

/// A given token reaches this handler at most once: the authenticator
/// in front of it rejects revoked tokens with 401, so the service
/// layer's `AlreadyRevoked` conflict never surfaces over HTTP.
pub async fn logout(
    service: web::Data<SessionService>,
    token: BearerToken,
) -> Result<HttpResponse, AuthError> {
    service.logout(&token.0).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "logged out".to_string(),
    }))
}

pub async fn me(
    service: web::Data<SessionService>,
    context: AuthContext,
) -> Result<HttpResponse, AuthError> {
    let record = service.profile(context.principal_id).await?;

    Ok(HttpResponse::Ok().json(ProfileResponse {
        principal_id: record.id,
        email: record.email,
        role: record.role,
        profile: record.profile,
        created_at: record.created_at,
    }))
}

//! Request authentication gate
//!
//! Extracts the bearer token, verifies signature and expiry through
//! the codec, then checks the revocation store (exact value and
//! per-principal watermark). A store failure is surfaced as
//! `Unavailable`, never treated as "not revoked". Role-specific
//! authorization stays with the individual endpoints.

use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use std::sync::Arc;
use token_security::{RevocationStore, TokenCodec};
use uuid::Uuid;

use crate::error::AuthError;

/// Identity exposed to downstream handlers.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub principal_id: Uuid,
    pub role: String,
}

/// Raw token as presented, for handlers that revoke it (logout).
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Verify one token end to end: parse, then check value blacklist and
/// principal watermark. Factored out of the middleware so the gate is
/// testable without an HTTP stack.
pub async fn authenticate_token(
    codec: &TokenCodec,
    revocations: &dyn RevocationStore,
    token: &str,
) -> Result<AuthContext, AuthError> {
    let claims = codec.parse(token)?;

    if revocations.is_revoked(token).await? {
        tracing::warn!("attempt to use revoked token");
        return Err(AuthError::Unauthenticated);
    }

    let principal_id = claims.principal_id().map_err(|_| AuthError::Unauthenticated)?;

    if let Some(cutoff) = revocations.watermark(principal_id).await? {
        if claims.iat <= cutoff {
            tracing::warn!(principal_id = %principal_id, "token predates revocation watermark");
            return Err(AuthError::Unauthenticated);
        }
    }

    Ok(AuthContext {
        principal_id,
        role: claims.role,
    })
}

/// Authentication middleware factory.
#[derive(Clone)]
pub struct RequestAuthenticator {
    codec: Arc<TokenCodec>,
    revocations: Arc<dyn RevocationStore>,
}

impl RequestAuthenticator {
    pub fn new(codec: Arc<TokenCodec>, revocations: Arc<dyn RevocationStore>) -> Self {
        Self { codec, revocations }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestAuthenticator
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestAuthenticatorService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(RequestAuthenticatorService {
            service: Rc::new(service),
            codec: self.codec.clone(),
            revocations: self.revocations.clone(),
        }))
    }
}

pub struct RequestAuthenticatorService<S> {
    service: Rc<S>,
    codec: Arc<TokenCodec>,
    revocations: Arc<dyn RevocationStore>,
}

impl<S, B> Service<ServiceRequest> for RequestAuthenticatorService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let codec = self.codec.clone();
        let revocations = self.revocations.clone();

        Box::pin(async move {
            // Clone the header to an owned String before any mutable
            // access to the request extensions.
            let auth_header = match req.headers().get("Authorization") {
                Some(header) => match header.to_str() {
                    Ok(h) => h.to_string(),
                    Err(_) => return Err(AuthError::Unauthenticated.into()),
                },
                None => return Err(AuthError::Unauthenticated.into()),
            };

            let token = match auth_header.strip_prefix("Bearer ") {
                Some(t) if !t.is_empty() => t,
                _ => return Err(AuthError::Unauthenticated.into()),
            };

            let context = authenticate_token(&codec, revocations.as_ref(), token)
                .await
                .map_err(Error::from)?;

            req.extensions_mut().insert(context);
            req.extensions_mut().insert(BearerToken(token.to_string()));

            service.call(req).await
        })
    }
}

impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthContext>().cloned() {
            Some(context) => ready(Ok(context)),
            None => ready(Err(AuthError::Unauthenticated.into())),
        }
    }
}

impl FromRequest for BearerToken {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<BearerToken>().cloned() {
            Some(token) => ready(Ok(token)),
            None => ready(Err(AuthError::Unauthenticated.into())),
        }
    }
}

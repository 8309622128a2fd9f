//! Route wiring
//!
//! Each principal kind gets its own scope with its own session service;
//! register and login stay public, everything else sits behind the
//! authenticator.

use actix_web::{dev::HttpServiceFactory, web, HttpResponse};

use crate::handlers;
use crate::middleware::RequestAuthenticator;
use crate::services::SessionService;

pub fn principal_scope(
    path: &str,
    service: SessionService,
    authenticator: RequestAuthenticator,
) -> impl HttpServiceFactory {
    web::scope(path)
        .app_data(web::Data::new(service))
        .route("/register", web::post().to(handlers::register))
        .route("/login", web::post().to(handlers::login))
        .service(
            web::scope("")
                .wrap(authenticator)
                .route("/change-password", web::put().to(handlers::change_password))
                .route("/logout", web::post().to(handlers::logout))
                .route("/me", web::get().to(handlers::me)),
        )
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use token_security::{RedisRevocationStore, RevocationStore, TokenCodec};
use tracing_subscriber::EnvFilter;

use auth_service::config::Config;
use auth_service::db::PgCredentialStore;
use auth_service::middleware::RequestAuthenticator;
use auth_service::models::PrincipalKind;
use auth_service::routes;
use auth_service::services::SessionService;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let redis_client = redis::Client::open(config.redis_url.as_str())?;
    let redis = redis::aio::ConnectionManager::new(redis_client).await?;

    let codec = Arc::new(TokenCodec::new(&config.jwt_secret, config.token_ttl_secs));
    let revocations: Arc<dyn RevocationStore> = Arc::new(RedisRevocationStore::new(redis));
    let authenticator = RequestAuthenticator::new(codec.clone(), revocations.clone());

    let session_for = |kind: PrincipalKind| {
        SessionService::new(
            Arc::new(PgCredentialStore::new(pool.clone(), kind)),
            codec.clone(),
            revocations.clone(),
        )
    };

    let user_sessions = session_for(PrincipalKind::User);
    let dealership_sessions = session_for(PrincipalKind::Dealership);
    let admin_sessions = session_for(PrincipalKind::Admin);

    let bind_addr = (config.server_host.clone(), config.server_port);
    tracing::info!(host = %config.server_host, port = config.server_port, "starting auth service");

    HttpServer::new(move || {
        App::new()
            .route("/health", web::get().to(routes::health))
            .service(routes::principal_scope(
                "/api/v1/user",
                user_sessions.clone(),
                authenticator.clone(),
            ))
            .service(routes::principal_scope(
                "/api/v1/dealership",
                dealership_sessions.clone(),
                authenticator.clone(),
            ))
            .service(routes::principal_scope(
                "/api/v1/admin",
                admin_sessions.clone(),
                authenticator.clone(),
            ))
    })
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}

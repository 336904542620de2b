use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use crypto_core::jwt as core_jwt;
use matchmate_service::{
    config::{self, StorageBackend},
    db, error, logging,
    repository::{MatchRepository, MemoryRepository, PostgresRepository},
    routes,
    state::AppState,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), error::AppError> {
    logging::init_tracing();
    let cfg = Arc::new(config::Config::from_env()?);
    tracing::info!(config = ?cfg, "configuration loaded");

    core_jwt::initialize_jwt_secret(&cfg.jwt_secret, cfg.jwt_ttl_hours)
        .map_err(|e| error::AppError::StartServer(format!("Failed to initialize JWT: {e}")))?;

    let repo: Arc<dyn MatchRepository> = match cfg.storage_backend {
        StorageBackend::Postgres => {
            let pool = db::init_pool(&cfg.database_url).await?;
            Arc::new(PostgresRepository::new(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; data is lost on restart");
            Arc::new(MemoryRepository::new())
        }
    };

    let state = AppState::new(repo, cfg.clone());

    let bind_addr = format!("0.0.0.0:{}", cfg.port);
    tracing::info!(%bind_addr, "starting matchmate-service");

    HttpServer::new(move || {
        let cors = actix_cors::Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(actix_middleware::JwtAuthMiddleware)
            .wrap(actix_middleware::MetricsMiddleware)
            .wrap(actix_middleware::Logging)
            .wrap(actix_middleware::RequestId::new())
            .wrap(cors)
            .wrap(NormalizePath::trim())
            .app_data(web::Data::new(state.clone()))
            .configure(routes::configure)
    })
    .bind(&bind_addr)
    .map_err(|e| error::AppError::StartServer(format!("bind REST: {e}")))?
    .run()
    .await
    .map_err(|e| error::AppError::StartServer(format!("REST server: {e}")))
}

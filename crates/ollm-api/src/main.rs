//! OLLM 인증 API 서버 진입점.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use ollm_core::{init_logging, AppConfig, LogConfig, UserStore};
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use ollm_api::auth::{AuthSettings, TokenCodec, TokenKeys};
use ollm_api::repository::{InMemoryUserStore, PgUserRepository};
use ollm_api::server::{create_router, shutdown_signal};
use ollm_api::{setup_metrics_recorder, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    let config = AppConfig::load_default().context("failed to load configuration")?;

    init_logging(LogConfig::from(&config.logging))
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    // 키 로드 실패 시 즉시 종료
    let keys = TokenKeys::from_base64_pem(
        config.jwt.private_key_base64.expose_secret(),
        config.jwt.public_key_base64.expose_secret(),
    )
    .context("failed to load RSA key pair")?;
    let codec = Arc::new(TokenCodec::new(keys));

    let settings = AuthSettings::from_config(&config.jwt, &config.password)
        .context("invalid auth settings")?;

    let users: Arc<dyn UserStore> = match &config.database.url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .acquire_timeout(Duration::from_secs(config.database.connection_timeout_secs))
                .connect(url)
                .await
                .context("failed to connect to database")?;

            let repository = PgUserRepository::new(pool);
            repository.migrate().await.context("failed to run migrations")?;
            info!("Connected to PostgreSQL user store");
            Arc::new(repository)
        }
        None => {
            warn!("database.url not set, using in-memory user store (data is lost on restart)");
            Arc::new(InMemoryUserStore::new())
        }
    };

    let metrics_handle = setup_metrics_recorder().context("failed to install metrics recorder")?;

    let state = Arc::new(AppState::new(
        users,
        codec,
        settings,
        config.jwt.cookie.clone(),
    ));

    let app = create_router(state, Some(metrics_handle), &config.server.cors_allow_origins);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server address")?;

    info!(%addr, "API server listening");
    info!("Metrics available at http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");

    Ok(())
}

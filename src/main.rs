use clap::Parser;
use geoobra_server::{
    build_router,
    cli::{Cli, Commands},
    config::ServerConfig,
    state::ServerState,
    storage,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geoobra_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::from_env()?;

    let pool = storage::connect(&config.database_url, config.database_max_connections).await?;
    storage::initialize_schema(&pool).await?;

    match cli.command {
        Some(Commands::User(cmd)) => return cmd.execute(pool).await,
        Some(Commands::Skill(cmd)) => return cmd.execute(pool).await,
        Some(Commands::Serve) | None => {}
    }

    info!("🚀 Starting GeoObra Server v{}", VERSION);
    info!("📋 Configuration loaded:");
    info!("   Bind address: {}", config.bind_address());
    info!("   Database: {}", config.database_url);
    info!("   Session timeout: {}s", config.session_timeout_seconds);
    info!("   CORS origins: {:?}", config.cors_origins);
    info!("✅ Database connected and schema initialized");

    let state = Arc::new(ServerState::with_sqlite(config.clone(), pool));

    // Purge expired sessions
    {
        let session_manager = state.auth_state.session_manager.clone();
        tokio::spawn(async move {
            let mut interval = time::interval(Duration::from_secs(300));
            loop {
                interval.tick().await;
                let cleaned = session_manager.cleanup_expired();
                if cleaned > 0 {
                    info!("Cleaned up {} expired sessions", cleaned);
                }
            }
        });
    }

    // Forget stale failed-login records
    {
        let rate_limiter = state.auth_state.rate_limiter.clone();
        tokio::spawn(async move {
            let mut interval = time::interval(Duration::from_secs(120));
            loop {
                interval.tick().await;
                let cleaned = rate_limiter.cleanup();
                if cleaned > 0 {
                    info!("Cleaned up {} rate limiter entries", cleaned);
                }
            }
        });
    }

    let app = build_router(state);

    let addr: SocketAddr = config.bind_address().parse()?;
    info!("🎧 Listening on http://{}", addr);
    info!("🔑 Health endpoint: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

use soundboard::{
    config::{AppConfig, LogFormat},
    storage::StorageLayout,
    web,
};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; real environment variables win
    let _ = dotenvy::dotenv();

    let config = AppConfig::load()?;
    init_logging(config.logging.format);

    info!("Starting soundboard v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = config.validate() {
        error!("Refusing to start: {}", e);
        return Err(e.into());
    }
    if !config.admin_login_enabled() {
        warn!("Admin password not configured; every admin login will be refused");
    }

    let layout = StorageLayout::from_config(&config.storage);
    let migration = layout.initialize().await?;
    info!(
        config = %layout.config_path.display(),
        audio = %layout.audio_dir.display(),
        ?migration,
        "Storage initialized"
    );

    let state = web::AppState::from_config(&config, &layout)?;
    let app = web::create_router(state, &config.web);

    let addr = format!("{}:{}", config.web.host, config.web.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Web server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "soundboard=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}

use dotenvy::dotenv;
use scholarship_tracker::{
    api::{self, AppState},
    config::{database, seed, server::ServerConfig},
    core::seed::seed_demo_data,
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load the server configuration
    let config = ServerConfig::from_env()
        .inspect_err(|e| error!("Invalid server configuration: {}", e))?;

    // 4. Initialize database
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed demo data when a seed file is configured
    if let Some(path) = &config.seed_config {
        let seed_config = seed::load_seed_config(path)?;
        seed_demo_data(&db, &seed_config)
            .await
            .inspect_err(|e| error!("Failed to seed demo data: {}", e))?;
    }

    // 6. Serve the API
    let listen_addr = config.listen_addr;
    let app = api::app_router(AppState::new(db, config));
    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", listen_addr, e))?;
    info!("Listening on {}", listen_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

// SWIFT Directory - Web Server
// REST API with Axum over the SQLite-backed directory

use anyhow::{Context, Result};
use std::sync::Arc;
use swift_directory::{api, logging, parser, Config, DirectoryService, SqliteStore};
use tracing::{info, warn};

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();
    logging::init(config.log_format);

    println!("🌐 SWIFT Directory - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // Open database
    let store = SqliteStore::open(&config.database_path)
        .with_context(|| format!("Failed to open database: {}", config.database_path.display()))?;
    println!("✓ Database opened: {:?}", config.database_path);

    let service = DirectoryService::new(Arc::new(store));

    // Seed from CSV; a failed import stops startup
    if config.import_on_start {
        let importer = service.clone();
        let csv_path = config.csv_path.clone();
        let imported = tokio::task::spawn_blocking(move || parser::import_csv(&importer, &csv_path))
            .await
            .context("Import task panicked")??;
        println!("✓ Imported {} SWIFT codes from {:?}", imported, config.csv_path);
    } else {
        info!("skipping CSV import on start");
    }

    if !config.writes_enabled() {
        warn!("API_TOKEN is not set; POST and DELETE will answer 401");
    }

    let app = api::router(service, &config);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to address {}", config.bind_addr))?;

    println!("\n🚀 Server running on http://{}", config.bind_addr);
    println!("   API: http://{}/v1/swift-codes/{{code}}", config.bind_addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "could not listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

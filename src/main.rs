use actix_web::{App, HttpServer, web};
use clap::Parser;
use sqlx::{Pool, Postgres};
use std::io;
use std::sync::Arc;
use tracing::info;
mod api;
use crate::api::{
    auth::IdentityConfig,
    health::health_config,
    job_application::job_application_config,
    validation,
};
mod cli;
mod config;
mod db;
mod logging;
mod shutdown;
use crate::cli::{Cli, Command};
use crate::config::{Config, StorageBackend};
use crate::db::{JobApplicationStore, MemoryJobApplicationStore, PgJobApplicationRepository};
use crate::shutdown::ShutdownCoordinator;

#[actix_web::main]
async fn main() -> io::Result<()> {
    let cli = Cli::parse();

    // Load configuration from environment
    let config = Config::from_env().map_err(io::Error::other)?;
    let identity = IdentityConfig::new(&config.identity_header).map_err(io::Error::other)?;

    logging::init(&config.log_dir)?;

    match cli.command() {
        Command::Migrate => migrate(&config).await,
        Command::Serve => serve(config, identity).await,
    }
}

async fn connect(config: &Config) -> io::Result<Pool<Postgres>> {
    let database_url = config
        .database_url
        .as_deref()
        .ok_or_else(|| io::Error::other("DATABASE_URL must be set for the postgres backend"))?;

    db::connection::get_connection(database_url, config.max_db_connections)
        .await
        .map_err(io::Error::other)
}

async fn migrate(config: &Config) -> io::Result<()> {
    if config.storage_backend != StorageBackend::Postgres {
        return Err(io::Error::other("migrations only apply to the postgres backend"));
    }

    let pool = connect(config).await?;
    db::migrations::run_migrations(&pool).await.map_err(io::Error::other)?;
    pool.close().await;
    Ok(())
}

async fn serve(config: Config, identity: IdentityConfig) -> io::Result<()> {
    info!("Starting job-tracker application");
    info!("Configuration loaded successfully:");
    info!("  - Storage backend: {:?}", config.storage_backend);
    info!("  - Max payload size: {} bytes", config.max_payload_size);
    info!("  - Max database connections: {}", config.max_db_connections);
    info!("  - Identity header: {}", config.identity_header);

    let (store, pool): (Arc<dyn JobApplicationStore>, Option<Pool<Postgres>>) =
        match config.storage_backend {
            StorageBackend::Postgres => {
                let pool = connect(&config).await?;

                // Auto-migrate when starting server
                db::migrations::run_migrations(&pool).await.map_err(io::Error::other)?;

                (Arc::new(PgJobApplicationRepository::new(pool.clone())), Some(pool))
            }
            StorageBackend::Memory => {
                info!("Using in-memory store; data is lost on restart");
                (Arc::new(MemoryJobApplicationStore::new()), None)
            }
        };

    let max_payload_size = config.max_payload_size;
    let identity = web::Data::new(identity);

    let server = HttpServer::new(move || {
        // Configure payload size limits globally
        let payload_config = web::PayloadConfig::default().limit(max_payload_size);
        let json_config = validation::json_config().limit(max_payload_size);
        let unvalidated_json_config = validation::unvalidated_json_config().limit(max_payload_size);

        App::new()
            .app_data(web::Data::from(store.clone()))
            .app_data(identity.clone())
            .app_data(payload_config)
            .app_data(json_config)
            .app_data(unvalidated_json_config)
            .app_data(validation::path_config())
            .configure(health_config)
            .configure(job_application_config)
    });

    info!("Server starting on http://{}:{}", config.host, config.port);

    let server = server
        .bind((config.host.as_str(), config.port))?
        .run();

    // Get server handle for graceful shutdown
    let server_handle = server.handle();

    // Spawn server in background
    let server_task = tokio::spawn(server);

    ShutdownCoordinator::new(server_handle, server_task, pool)
        .wait_for_shutdown()
        .await
}

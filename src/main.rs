use actix_web::{web, App, HttpServer};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

mod api;
mod cli;
mod config;
mod db;
mod error;
mod shutdown;

use crate::api::{
    auth::AdminAuth,
    company::CompanyService,
    job::JobService,
    validation,
};
use crate::cli::{Cli, Command};
use crate::shutdown::ShutdownCoordinator;

/// Console output plus daily-rotating files per level under `log_dir`,
/// e.g. `logs/info.log.2024-12-22`.
fn init_tracing(log_dir: &str) -> std::io::Result<()> {
    std::fs::create_dir_all(log_dir)?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    // One file per level; all share the registry as their subscriber.
    let file_layers: Vec<_> = [
        ("info.log", LevelFilter::INFO),
        ("warn.log", LevelFilter::WARN),
        ("error.log", LevelFilter::ERROR),
        ("debug.log", LevelFilter::DEBUG),
    ]
    .into_iter()
    .map(|(name, level)| {
        tracing_subscriber::fmt::layer()
            .with_writer(tracing_appender::rolling::daily(log_dir, name))
            .with_ansi(false)
            .with_filter(level)
    })
    .collect();

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true);

    tracing_subscriber::registry()
        .with(file_layers)
        .with(env_filter)
        .with(console_layer)
        .init();

    Ok(())
}

fn other_io(err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    let config::Config {
        database_url,
        bind_addr,
        port,
        max_payload_size,
        max_db_connections,
        log_dir,
        admin_tokens,
    } = config::Config::from_env().map_err(other_io)?;

    init_tracing(&log_dir)?;

    let pool = db::connection::get_connection(&database_url, max_db_connections)
        .await
        .map_err(other_io)?;
    info!("Database connection pool established (max {} connections)", max_db_connections);

    db::migrations::run_migrations(&pool).await.map_err(other_io)?;

    if cli.command() == &Command::Migrate {
        pool.close().await;
        return Ok(());
    }

    let admin_auth = web::Data::new(AdminAuth::new(admin_tokens));
    if admin_auth.is_empty() {
        tracing::warn!("ADMIN_TOKENS is empty; admin-only routes will always answer 401");
    }

    info!("Starting jobly");
    info!("  - Max payload size: {} bytes", max_payload_size);
    info!("  - Admin tokens configured: {}", admin_auth.len());

    let job_service = web::Data::new(JobService::new(pool.clone()));
    let company_service = web::Data::new(CompanyService::new(pool.clone()));
    let server_pool = web::Data::new(pool.clone());

    let server = HttpServer::new(move || {
        App::new()
            .app_data(server_pool.clone())
            .app_data(job_service.clone())
            .app_data(company_service.clone())
            .app_data(admin_auth.clone())
            .app_data(validation::json_config().limit(max_payload_size))
            .app_data(validation::query_config())
            .app_data(validation::raw_json_config(max_payload_size))
            .configure(api::routes)
    })
    .bind((bind_addr.as_str(), port))?
    .run();

    info!("Server listening on http://{}:{}", bind_addr, port);

    let server_handle = server.handle();
    let server_task = actix_web::rt::spawn(server);

    ShutdownCoordinator::new(server_handle, server_task, pool)
        .wait_for_shutdown()
        .await
}

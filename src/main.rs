//! Songshelf - a small service for uploading and browsing album folders.
//!
//! Songs live on disk as `<songs>/<album>/<file>`. The HTTP API lists
//! albums and songs, accepts multipart uploads and serves the files
//! statically under `/songs`.

mod api;
mod config;
mod error;
mod models;
mod storage;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{http::header, web, App, HttpServer};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogFormat;
use crate::models::AppState;
use crate::storage::SongLibrary;

/// Initialize the tracing/logging subsystem.
fn init_tracing(config: &config::Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.log_format {
        LogFormat::Json => {
            subscriber
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        LogFormat::Pretty => {
            subscriber
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}

/// Configure CORS based on application config.
fn configure_cors(config: &config::Config) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
        .max_age(3600);

    if config.cors_origins.len() == 1 && config.cors_origins[0] == "*" {
        cors = cors.allow_any_origin();
    } else {
        for origin in &config.cors_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}

/// Graceful shutdown handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize configuration
    let config = config::init();

    // Initialize logging
    init_tracing(config);

    // Validate configuration
    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Configuration validation failed");
        return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
    }

    let app_state = AppState::new(SongLibrary::new(config.songs_dir.clone()));

    let bind_address = config.bind_address();

    tracing::info!(
        address = %bind_address,
        songs_dir = %config.songs_dir.display(),
        "Starting Songshelf server"
    );

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(configure_cors(config))
            .app_data(web::Data::new(app_state.clone()))
            .configure(api::health::configure)
            .configure(api::songs::configure)
            .configure(api::upload::configure)
            .service(Files::new("/songs", app_state.library.root()))
    })
    .bind(&bind_address)?
    .shutdown_timeout(30)
    .run();

    // Run server with graceful shutdown
    tokio::select! {
        result = server => {
            result
        }
        _ = shutdown_signal() => {
            tracing::info!("Shutdown complete");
            Ok(())
        }
    }
}

//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request-level errors are
//! `pages::PageError`.

use anyhow::Context;
use axum::{
    Router, http,
    http::{Method, header},
};
use pages::{Observers, PagesConfig, TracingObserver, pages_router, store::PageStore};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,pages=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url =
        env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Startup cleanup: remove expired flash messages and editor sessions
    // Errors here should not prevent server startup
    let page_store_for_cleanup = PageStore::new(pool.clone());
    match page_store_for_cleanup.cleanup_expired().await {
        Ok((flash_messages, sessions)) => {
            tracing::info!(
                flash_deleted = flash_messages,
                sessions_deleted = sessions,
                "Page store cleanup completed"
            );
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Page store cleanup failed, continuing anyway"
            );
        }
    }

    // Pages configuration
    let pages_config = if cfg!(debug_assertions) {
        PagesConfig::from_env_with(PagesConfig::development())?
    } else {
        // In production the signing secret must come from the environment
        env::var("SESSION_SECRET").context("SESSION_SECRET must be set in production")?;
        PagesConfig::from_env()?
    };
    let base_path = pages_config.base_path.clone();

    let observers = Observers::new().with(Arc::new(TracingObserver));
    let page_store = PageStore::new(pool.clone());

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::COOKIE,
        ]))
        .allow_credentials(true);

    // Build router
    let pages = pages_router(page_store, pages_config, observers);
    let app = if base_path.is_empty() {
        pages
    } else {
        Router::new().nest(&base_path, pages)
    };
    let app = app.layer(TraceLayer::new_for_http()).layer(cors);

    // Start server
    let addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:31113".to_string())
        .parse()
        .context("BIND_ADDR must be host:port")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

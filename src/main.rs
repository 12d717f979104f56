use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use typer_backend_rust::config::Config;
use typer_backend_rust::content::ContentIndex;
use typer_backend_rust::db::DatabaseProxy;
use typer_backend_rust::state::AppState;
use typer_backend_rust::{auth, logging, routes, services};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = logging::init_tracing(&config.log_level);

    let app_env = std::env::var("APP_ENV").unwrap_or_default().to_lowercase();
    if matches!(app_env.as_str(), "production" | "prod") {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        if !auth::is_strong_enough_secret(&secret) {
            tracing::error!(
                min_length = auth::MIN_SECRET_LENGTH,
                "JWT_SECRET is missing or too short for production"
            );
            std::process::exit(1);
        }
    }

    let db_proxy = match DatabaseProxy::from_env().await {
        Ok(proxy) => proxy,
        Err(err) => {
            tracing::error!(error = %err, "failed to initialize database");
            std::process::exit(1);
        }
    };

    if let Err(err) = services::badge::ensure_default_badges(&db_proxy).await {
        tracing::error!(error = %err, "failed to seed badge catalog");
        std::process::exit(1);
    }

    // A partial catalog would silently hide lessons for the process lifetime,
    // so any load error is fatal.
    let content = match ContentIndex::load(&config.content_dir) {
        Ok(index) => Arc::new(index),
        Err(err) => {
            tracing::error!(
                error = %err,
                path = %config.content_dir.display(),
                "failed to load lesson content"
            );
            std::process::exit(1);
        }
    };
    tracing::info!(lessons = content.count(), "lesson catalog loaded");

    let state = AppState::new(db_proxy, content);

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.bind_addr();
    tracing::info!(%addr, "typer-backend listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind listener failed");

    let server = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal());

    if let Err(e) = server.await {
        tracing::error!(error = %e, "server error");
    }

    tracing::info!("server stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::Path,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::api::{self, AppState, SharedState};
use super::db::{BackofficeDb, DbHandle};
use super::embedded::StaticAssets;
use super::listings::Listings;
use super::templates::Renderer;
use crate::config::{AuthSection, BackofficeToml};

/// Configuration for the backoffice server.
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub dev_mode: bool,
    /// Open the dashboard in the default browser once bound
    pub open_browser: bool,
    pub auth: AuthSection,
    pub settings: BackofficeToml,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let settings = BackofficeToml::default();
        Self::from_settings(settings)
    }
}

impl ServerConfig {
    pub fn from_settings(settings: BackofficeToml) -> Self {
        Self {
            host: settings.server.host.clone(),
            port: settings.server.port,
            db_path: settings.database.path.clone(),
            dev_mode: settings.server.dev_mode,
            open_browser: false,
            auth: settings.auth.clone(),
            settings,
        }
    }
}

/// Build the full application router: pages, fragments and static assets.
pub fn build_router(state: SharedState, dev_mode: bool) -> Router {
    let mut app = api::app_router()
        .route("/static/{*path}", get(static_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if dev_mode {
        app = app.layer(CorsLayer::permissive());
    }
    app
}

/// Serve a file from the embedded `static/` tree.
async fn static_handler(Path(path): Path<String>) -> Response {
    match StaticAssets::get(&path) {
        Some(content) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                content.data.into_owned(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

/// Start the backoffice server.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    if let Some(parent) = config.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).context("Failed to create database directory")?;
    }

    let db = BackofficeDb::new(&config.db_path).context("Failed to initialize database")?;
    let listings = Listings::build(&config.settings)?;
    let renderer = Renderer::new().context("Failed to load templates")?;
    let state = Arc::new(AppState::new(DbHandle::new(db), listings, renderer, config.auth));

    let app = build_router(state, config.dev_mode);

    let host = if config.dev_mode { "0.0.0.0" } else { config.host.as_str() };
    let addr = format!("{}:{}", host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let local_addr = listener.local_addr()?;
    let url = format!("http://{}/", local_addr);
    tracing::info!(%url, db = %config.db_path.display(), dev = config.dev_mode, "backoffice listening");
    if config.open_browser {
        if let Err(e) = open::that(&url) {
            tracing::warn!(error = %e, "could not open browser");
        }
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

//! HTTP server module
//!
//! Serves the Elm application's entry page, rebuilding the bundle first.

pub(crate) mod app;
mod routes;

use std::path::Path;
use std::sync::Arc;

pub use app::ElmApp;
pub use routes::router;

use crate::core::{Config, Result};

/// Prepare the application and serve it until Ctrl+C
pub async fn serve(config: &Config, project: Option<&Path>) -> Result<()> {
    let mut app = ElmApp::new(config).await?;
    app.load_flags(project);
    let app = Arc::new(app);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(
        "Serving {} on http://{}{}",
        app.web_root().display(),
        listener.local_addr()?,
        if app.is_debug() { " (debug)" } else { "" }
    );

    if config.server.open_browser {
        let url = config.local_url();
        if let Err(e) = webbrowser::open(&url) {
            tracing::warn!("Failed to open {}: {}", url, e);
        }
    }

    axum::serve(listener, router(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {}", e);
    }
}

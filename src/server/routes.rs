//! HTTP routes

use std::path::Path;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, get_service};
use axum::{Json, Router};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::core::{ElmAppError, Flags, Result};
use crate::server::ElmApp;

impl IntoResponse for ElmAppError {
    fn into_response(self) -> Response {
        tracing::error!("Request failed: {}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

/// Build the router for an application
///
/// Only the bundle is served besides the explicit routes, so the entry page
/// can load it without exposing sources or `elm.json`.
pub fn router(app: Arc<ElmApp>) -> Router {
    let routes = Router::new()
        .route("/", get(get_index).post(post_index))
        .route("/flags", get(get_flags));

    let bundle = app.bundle();
    let bundle_dir = bundle.parent().filter(|dir| !dir.as_os_str().is_empty());
    let routes = match bundle_dir {
        Some(dir) => {
            let assets = Router::new().fallback_service(ServeDir::new(app.web_root().join(dir)));
            routes.nest_service(&url_path(dir), after_build_layer(&app, assets))
        }
        None => {
            let asset = get_service(ServeFile::new(app.web_root().join(bundle)))
                .layer(middleware::from_fn_with_state(app.clone(), after_build));
            routes.route(&url_path(bundle), asset)
        }
    };

    routes.layer(TraceLayer::new_for_http()).with_state(app)
}

/// A debug rebuild deletes the bundle before writing it again, so asset
/// requests wait for any running build
fn after_build_layer(app: &Arc<ElmApp>, assets: Router) -> Router {
    assets.layer(middleware::from_fn_with_state(app.clone(), after_build))
}

async fn after_build(State(app): State<Arc<ElmApp>>, request: Request, next: Next) -> Response {
    app.wait_for_build().await;
    next.run(request).await
}

fn url_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .fold(String::new(), |url, part| url + "/" + &part)
}

async fn get_index(State(app): State<Arc<ElmApp>>) -> Result<Response> {
    app.on_get().await
}

async fn post_index(State(app): State<Arc<ElmApp>>) -> Result<Response> {
    app.on_post().await
}

async fn get_flags(State(app): State<Arc<ElmApp>>) -> Json<Flags> {
    Json(app.flags().clone())
}

//! Elm application handler
//!
//! Keeps the compiled bundle current and serves the entry page.

use std::path::{Path, PathBuf};
use std::time::Duration;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tokio::sync::Mutex;

use crate::build::{ElmCompiler, WebRoot};
use crate::core::{BuildOutcome, Config, Flags, Result};

/// Hosts one Elm application
pub struct ElmApp {
    compiler: ElmCompiler,
    web_root: WebRoot,
    /// Entry Elm module, relative to the web root
    main: PathBuf,
    /// Compiled bundle, relative to the web root
    dist: PathBuf,
    /// Static entry page, relative to the web root
    entry: PathBuf,
    debug: bool,
    flags: Flags,
    /// Serializes builds so requests never race on the bundle
    build_lock: Mutex<()>,
}

impl ElmApp {
    /// Verify the compiler and prepare the web root
    pub async fn new(config: &Config) -> Result<Self> {
        let compiler = ElmCompiler::new(config.app.compiler.clone())
            .with_timeout(Duration::from_secs(config.build.timeout_secs));
        compiler.ensure_available().await?;
        tracing::debug!("Using compiler {}", compiler.program());

        let web_root = WebRoot::prepare(&config.app.app_dir, config.build.debug)?;

        Ok(Self {
            compiler,
            web_root,
            main: config.app.main.clone(),
            dist: config.app.dist.clone(),
            entry: config.app.entry.clone(),
            debug: config.build.debug,
            flags: Flags::default(),
            build_lock: Mutex::new(()),
        })
    }

    pub fn web_root(&self) -> &Path {
        self.web_root.path()
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Compiled bundle, relative to the web root
    pub fn bundle(&self) -> &Path {
        &self.dist
    }

    /// Whether the app is served from a temporary copy
    pub fn is_temporary(&self) -> bool {
        self.web_root.is_temporary()
    }

    /// Resolve once no build is running
    pub async fn wait_for_build(&self) {
        drop(self.build_lock.lock().await);
    }

    /// Rebuild the bundle when missing, or always in debug mode
    pub async fn build(&self) -> Result<BuildOutcome> {
        let _guard = self.build_lock.lock().await;
        let dist = self.web_root.join(&self.dist);

        if dist.exists() && !self.debug {
            return Ok(BuildOutcome::UpToDate);
        }

        if self.debug {
            match tokio::fs::remove_file(&dist).await {
                Ok(()) => tracing::debug!("Removed stale bundle {}", dist.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        tracing::info!(
            "Building {} -> {}",
            self.main.display(),
            self.dist.display()
        );
        self.compiler
            .make(self.web_root.path(), &self.main, &self.dist, !self.debug)
            .await?;

        Ok(BuildOutcome::Rebuilt)
    }

    /// Build if needed, then return the entry page
    pub async fn on_get(&self) -> Result<Response> {
        self.build().await?;

        let body = tokio::fs::read_to_string(self.web_root.join(&self.entry)).await?;

        Ok((StatusCode::OK, [(header::CONTENT_TYPE, "text/html")], body).into_response())
    }

    /// Write and update operations are not defined yet
    pub async fn on_post(&self) -> Result<Response> {
        Ok((StatusCode::NOT_IMPLEMENTED, "POST is not supported").into_response())
    }

    /// Set the flags handed to the Elm program
    pub fn load_flags(&mut self, project: Option<&Path>) -> &Flags {
        if let Some(path) = project {
            // TODO: read project.json once project storage exists
            tracing::warn!(
                "Project loading is not supported, ignoring {}",
                path.display()
            );
        }

        self.flags = Flags::default();
        &self.flags
    }

    pub fn flags(&self) -> &Flags {
        &self.flags
    }
}

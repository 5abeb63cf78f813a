//! Web root the bundle is built into
//!
//! A read-only application directory is copied to a temporary location
//! that lives as long as the `WebRoot`.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use walkdir::WalkDir;

use crate::core::{ElmAppError, Result};

/// Writable directory holding the Elm application
#[derive(Debug)]
pub struct WebRoot {
    path: PathBuf,
    /// Set when `path` is a temporary copy
    temp: Option<TempDir>,
    /// Retain the temporary copy on drop
    keep: bool,
}

impl WebRoot {
    /// Use `app_dir` in place when writable, otherwise work on a temporary copy
    pub fn prepare(app_dir: &Path, keep_temp: bool) -> Result<Self> {
        if !app_dir.is_dir() {
            return Err(ElmAppError::AppDirMissing(app_dir.to_path_buf()));
        }

        let app_dir = app_dir.canonicalize()?;

        if is_writable(&app_dir) {
            tracing::debug!("Using web root in place: {}", app_dir.display());
            return Ok(Self {
                path: app_dir,
                temp: None,
                keep: keep_temp,
            });
        }

        Self::copied(&app_dir, keep_temp)
    }

    /// Copy `app_dir` into a fresh temporary directory
    pub fn copied(app_dir: &Path, keep_temp: bool) -> Result<Self> {
        if !app_dir.is_dir() {
            return Err(ElmAppError::AppDirMissing(app_dir.to_path_buf()));
        }

        let temp = tempfile::Builder::new().prefix("elmapp-").tempdir()?;
        let path = temp.path().join("app");

        copy_tree(app_dir, &path).map_err(|e| {
            ElmAppError::with_context(format!("Failed to copy {}", app_dir.display()), e)
        })?;

        tracing::info!(
            "{} is not writable, using a copy at {}",
            app_dir.display(),
            path.display()
        );

        Ok(Self {
            path,
            temp: Some(temp),
            keep: keep_temp,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve a path relative to the web root
    pub fn join(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.path.join(rel)
    }

    /// Whether the web root is a temporary copy
    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }
}

impl Drop for WebRoot {
    fn drop(&mut self) {
        let Some(temp) = self.temp.take() else {
            return;
        };

        if self.keep {
            let kept = temp.keep();
            tracing::info!("Keeping path for debug: {}", kept.join("app").display());
        } else if let Err(e) = temp.close() {
            tracing::warn!("Failed to remove {}: {}", self.path.display(), e);
        }
    }
}

fn is_writable(dir: &Path) -> bool {
    tempfile::tempfile_in(dir).is_ok()
}

fn copy_tree(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

//! Custom error types for elmapp
//!
//! Provides a unified error handling system across the build wrapper,
//! the HTTP server and the UI regression suite.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for elmapp operations
#[derive(Error, Debug)]
pub enum ElmAppError {
    /// The Elm compiler is not on PATH
    #[error("'{0}' not found. Install Elm from https://guide.elm-lang.org/install/elm.html")]
    CompilerNotFound(String),

    /// agent-browser not installed
    #[error("agent-browser not found. Install with: npm install -g agent-browser && agent-browser install")]
    AgentBrowserNotFound,

    /// The application directory does not exist
    #[error("Application directory not found: {}", .0.display())]
    AppDirMissing(PathBuf),

    /// elm make exited unsuccessfully
    #[error("Build failed ({status}): {stderr}")]
    Build { status: String, stderr: String },

    /// elm make did not finish in time
    #[error("Build timed out after {0:?}")]
    BuildTimeout(Duration),

    /// Browser automation errors
    #[error("Browser error: {0}")]
    Browser(String),

    /// A UI wait condition was not met in time
    #[error("Timed out after {timeout:?} waiting for {condition}")]
    WaitTimeout { condition: String, timeout: Duration },

    /// A UI assertion did not hold
    #[error("Assertion failed: {0}")]
    Assertion(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Convenience Result type for elmapp operations
pub type Result<T> = std::result::Result<T, ElmAppError>;

impl ElmAppError {
    /// Create a browser error
    pub fn browser(msg: impl Into<String>) -> Self {
        Self::Browser(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an assertion error
    pub fn assertion(msg: impl Into<String>) -> Self {
        Self::Assertion(msg.into())
    }

    /// Wrap an error with additional context
    pub fn with_context<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WithContext {
            context: context.into(),
            source: Box::new(error),
        }
    }
}

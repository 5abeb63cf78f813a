//! elmapp - Elm front-end host and UI regression driver
//!
//! Serves a compiled Elm application, rebuilding its bundle with the
//! `elm` compiler when needed, and drives the hosting instance's
//! user-facing workflows through agent-browser.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **Build**: `elm make` wrapper and the scoped web root
//! - **Server**: Request handling and the axum router
//! - **UI test**: Browser driver, polling waits, and the ordered regression suite
//!
//! # Usage
//!
//! ```rust,no_run
//! use elmapp::Config;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::load();
//!     elmapp::server::serve(&config, None).await.unwrap();
//! }
//! ```

pub mod build;
pub mod core;
pub mod server;
pub mod uitest;

// Re-export commonly used items
pub use crate::core::{Config, ElmAppError, Flags, Result};
pub use server::ElmApp;

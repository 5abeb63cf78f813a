//! Shared types used across elmapp modules

use serde::{Deserialize, Serialize};

/// Flags handed to the Elm program at init
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flags {
    /// Project name
    pub name: String,
    /// Version of the hosting application
    pub version: String,
    /// Project payload
    pub data: serde_json::Value,
}

impl Default for Flags {
    fn default() -> Self {
        Self {
            name: "Unnamed Project".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            data: serde_json::json!({}),
        }
    }
}

/// What `ElmApp::build` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The bundle already existed and debug was off
    UpToDate,
    /// `elm make` produced a fresh bundle
    Rebuilt,
}

//! Configuration management for elmapp
//!
//! Supports environment variables, config files, and runtime overrides.
//!
//! Config file location: ~/.config/elmapp/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::core::error::{ElmAppError, Result};

/// Main configuration for elmapp
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Front-end application layout
    #[serde(default)]
    pub app: AppConfig,
    /// Bundle build behaviour
    #[serde(default)]
    pub build: BuildConfig,
    /// Browser automation configuration
    #[serde(default)]
    pub browser: BrowserConfig,
    /// UI regression suite configuration
    #[serde(default)]
    pub suite: SuiteConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (default: 0.0.0.0)
    pub host: String,
    /// Port number (default: 8080)
    pub port: u16,
    /// Open the system browser once the server is listening
    pub open_browser: bool,
}

/// Front-end application layout, paths relative to the web root
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the Elm application
    pub app_dir: PathBuf,
    /// Entry Elm module
    pub main: PathBuf,
    /// Compiled bundle
    pub dist: PathBuf,
    /// Static entry page returned on GET
    pub entry: PathBuf,
    /// Compiler executable
    pub compiler: String,
}

/// Bundle build configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Rebuild on every request and keep temporary web roots
    pub debug: bool,
    /// Upper bound for a single `elm make` run
    pub timeout_secs: u64,
}

/// Browser automation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Prefix for per-case agent-browser session names
    pub session_prefix: String,
    /// Whether to run in headed mode (visible browser)
    pub headed: bool,
    /// Default timeout for wait conditions in ms
    pub timeout_ms: u64,
    /// Interval between condition polls in ms
    pub poll_ms: u64,
}

/// UI regression suite configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Base URL of the instance under test
    pub base_url: String,
    /// Login of the test user
    pub user: String,
    /// Email of the test user
    pub email: String,
    /// Password of the test user
    pub password: String,
    /// Directory with the upload fixtures
    pub fixtures_dir: PathBuf,
}

fn is_truthy(value: &str) -> bool {
    value == "true" || value == "1"
}

fn env_flag(name: &str) -> Option<bool> {
    env::var(name).ok().map(|v| is_truthy(&v))
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: env::var("ELMAPP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("ELMAPP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            open_browser: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_dir: env::var("ELMAPP_APP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("app")),
            main: PathBuf::from("src/Main.elm"),
            dist: PathBuf::from("dist/main.js"),
            entry: PathBuf::from("index.html"),
            compiler: "elm".to_string(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            // Development builds are versioned `x.y.z-master`
            debug: env_flag("ELMAPP_DEBUG")
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").ends_with("-master")),
            timeout_secs: 300,
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            session_prefix: "elmapp".to_string(),
            headed: env_flag("ELMAPP_BROWSER_HEADED").unwrap_or(false),
            timeout_ms: 5000,
            poll_ms: 250,
        }
    }
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: env::var("ELMAPP_BASE_URL")
                .unwrap_or_else(|_| "http://0.0.0.0:8080".to_string()),
            user: "testuser".to_string(),
            email: "testuser@anvio.org".to_string(),
            password: "test".to_string(),
            fixtures_dir: PathBuf::from("../sandbox/files_for_manual_interactive/"),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("elmapp")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();

        let path = Self::config_file();
        let mut config = if path.exists() {
            Self::load_from_file().unwrap_or_else(|e| {
                tracing::warn!("Ignoring {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env_overrides();
        config
    }

    /// Let `ELMAPP_*` variables win over values read from the config file
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| env::var(name).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(host) = var("ELMAPP_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("ELMAPP_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid ELMAPP_PORT={}", port),
            }
        }
        if let Some(app_dir) = var("ELMAPP_APP_DIR") {
            self.app.app_dir = PathBuf::from(app_dir);
        }
        if let Some(debug) = var("ELMAPP_DEBUG") {
            self.build.debug = is_truthy(&debug);
        }
        if let Some(headed) = var("ELMAPP_BROWSER_HEADED") {
            self.browser.headed = is_truthy(&headed);
        }
        if let Some(base_url) = var("ELMAPP_BASE_URL") {
            self.suite.base_url = base_url;
        }
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(ElmAppError::config("Config file not found"));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| ElmAppError::config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| ElmAppError::config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to file and return the path
    pub fn save(&self) -> Result<PathBuf> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_file();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .map_err(|e| ElmAppError::config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ElmAppError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)
            .map_err(|e| ElmAppError::config(format!("Failed to write config: {}", e)))?;

        Ok(config_path)
    }

    /// Generate a default config file content for display
    pub fn default_config_toml() -> String {
        toml::to_string_pretty(&Config::default())
            .unwrap_or_else(|_| String::from("# Error generating config"))
    }

    /// Address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// URL a local browser should open
    pub fn local_url(&self) -> String {
        let host = match self.server.host.as_str() {
            "0.0.0.0" => "localhost",
            other => other,
        };
        format!("http://{}:{}", host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_layout() {
        let config = Config::default();
        assert_eq!(config.app.main, PathBuf::from("src/Main.elm"));
        assert_eq!(config.app.dist, PathBuf::from("dist/main.js"));
        assert_eq!(config.app.entry, PathBuf::from("index.html"));
        assert_eq!(config.app.compiler, "elm");
        assert_eq!(config.browser.timeout_ms, 5000);
        assert_eq!(config.suite.user, "testuser");
        assert_eq!(config.suite.email, "testuser@anvio.org");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [build]
            debug = true
            timeout_secs = 10
            "#,
        )
        .unwrap();
        assert!(config.build.debug);
        assert_eq!(config.build.timeout_secs, 10);
        assert_eq!(config.app.compiler, "elm");
    }

    #[test]
    fn test_partial_section_fills_missing_fields() {
        let config = Config::from_toml("[build]\ndebug = true\n").unwrap();
        assert!(config.build.debug);
        assert_eq!(config.build.timeout_secs, 300);

        let config = Config::from_toml("[suite]\nuser = \"alice\"\n").unwrap();
        assert_eq!(config.suite.user, "alice");
        assert_eq!(config.suite.password, "test");
    }

    #[test]
    fn test_env_overrides_win_over_file() {
        let mut config = Config::from_toml(
            r#"
            [server]
            host = "127.0.0.1"
            port = 3000
            open_browser = false

            [build]
            debug = false
            timeout_secs = 60
            "#,
        )
        .unwrap();

        let env: HashMap<&str, &str> = [
            ("ELMAPP_PORT", "9090"),
            ("ELMAPP_DEBUG", "1"),
            ("ELMAPP_BASE_URL", "http://anvio.test"),
        ]
        .into_iter()
        .collect();
        config.apply_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert!(config.build.debug);
        assert_eq!(config.build.timeout_secs, 60);
        assert_eq!(config.suite.base_url, "http://anvio.test");
    }

    #[test]
    fn test_invalid_env_port_is_ignored() {
        let mut config = Config::default();
        config.server.port = 3000;
        config.apply_overrides(|name| (name == "ELMAPP_PORT").then(|| "eighty".to_string()));
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml("[build\ndebug = ").unwrap_err();
        assert!(matches!(err, ElmAppError::Config(_)));
    }

    #[test]
    fn test_local_url() {
        let mut config = Config::default();
        config.server.host = "0.0.0.0".to_string();
        config.server.port = 9000;
        assert_eq!(config.local_url(), "http://localhost:9000");
        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
    }

    #[test]
    fn test_default_config_toml() {
        let toml_str = Config::default_config_toml();
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("timeout_secs"));
    }
}

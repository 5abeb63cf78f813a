//! Browser driver - wraps agent-browser CLI
//!
//! Provides the async `Browser` interface the regression suite runs on.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::core::{ElmAppError, Result};
use crate::uitest::locator::Locator;

/// Operations a regression case needs from a browser session
#[async_trait]
pub trait Browser: Send + Sync {
    /// Navigate to a URL
    async fn open(&self, url: &str) -> Result<()>;

    async fn click(&self, locator: &Locator) -> Result<()>;

    /// Type text into an input
    async fn fill(&self, locator: &Locator, text: &str) -> Result<()>;

    /// Attach a file to a file input
    async fn upload(&self, locator: &Locator, path: &Path) -> Result<()>;

    async fn title(&self) -> Result<String>;

    async fn is_present(&self, locator: &Locator) -> Result<bool>;

    async fn is_visible(&self, locator: &Locator) -> Result<bool>;

    /// Message of the oldest unanswered alert or confirm dialog
    async fn alert_text(&self) -> Result<Option<String>>;

    /// Accept the oldest unanswered dialog
    async fn accept_alert(&self) -> Result<()>;

    /// End the session
    async fn close(&self) -> Result<()>;
}

/// Records alert/confirm messages in page state instead of blocking.
/// Confirms are answered with OK.
const DIALOG_HOOK: &str = "(() => { if (!window.__elmappDialogs) { \
window.__elmappDialogs = []; \
window.alert = (m) => { window.__elmappDialogs.push(String(m)); }; \
window.confirm = (m) => { window.__elmappDialogs.push(String(m)); return true; }; \
} return true; })()";

/// Wrapped in an object so an alert reading `null` stays distinguishable
const DIALOG_PEEK: &str =
    "JSON.stringify({m: window.__elmappDialogs && window.__elmappDialogs.length ? window.__elmappDialogs[0] : null})";

const DIALOG_SHIFT: &str = "(() => { if (window.__elmappDialogs) { window.__elmappDialogs.shift(); } return true; })()";

/// Browser session driven through the agent-browser CLI
pub struct AgentBrowser {
    /// agent-browser executable
    program: String,
    /// Session name for isolation
    session_name: String,
    /// Whether to run in headed mode
    headed: bool,
}

impl AgentBrowser {
    /// Create a new browser session handle
    pub fn new(session_name: impl Into<String>) -> Self {
        Self {
            program: "agent-browser".to_string(),
            session_name: session_name.into(),
            headed: false,
        }
    }

    /// Use a different agent-browser executable
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Set headed mode
    pub fn with_headed(mut self, headed: bool) -> Self {
        self.headed = headed;
        self
    }

    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    /// Check if agent-browser is installed
    pub async fn is_available() -> bool {
        Command::new("agent-browser")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Run an agent-browser command
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(["--session", &self.session_name]);

        if self.headed {
            cmd.arg("--headed");
        }

        cmd.args(args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ElmAppError::AgentBrowserNotFound
            } else {
                ElmAppError::browser(format!("Failed to run agent-browser: {}", e))
            }
        })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(ElmAppError::browser(format!(
                "agent-browser {} failed: {}",
                args.first().copied().unwrap_or_default(),
                stderr.trim()
            )))
        }
    }

    /// Hook dialogs on the current page. The page may still be navigating,
    /// so a failure only means the hook is retried on the next call.
    async fn install_dialog_hook(&self) {
        if let Err(e) = self.run_command(&["eval", DIALOG_HOOK]).await {
            tracing::debug!("Dialog hook not installed yet: {}", e);
        }
    }

    async fn wait_for_load(&self) {
        if let Err(e) = self.run_command(&["wait", "--load", "networkidle"]).await {
            tracing::debug!("Page did not settle: {}", e);
        }
    }
}

#[async_trait]
impl Browser for AgentBrowser {
    async fn open(&self, url: &str) -> Result<()> {
        self.run_command(&["open", url]).await?;
        self.wait_for_load().await;
        self.install_dialog_hook().await;
        Ok(())
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        self.run_command(&["click", &locator.to_selector()]).await?;
        // The click may have navigated to a fresh page
        self.wait_for_load().await;
        self.install_dialog_hook().await;
        Ok(())
    }

    async fn fill(&self, locator: &Locator, text: &str) -> Result<()> {
        self.run_command(&["fill", &locator.to_selector(), text])
            .await
            .map(|_| ())
    }

    async fn upload(&self, locator: &Locator, path: &Path) -> Result<()> {
        let path = path.to_string_lossy();
        self.run_command(&["upload", &locator.to_selector(), &path])
            .await
            .map(|_| ())
    }

    async fn title(&self) -> Result<String> {
        self.run_command(&["get", "title"])
            .await
            .map(|s| s.trim().to_string())
    }

    async fn is_present(&self, locator: &Locator) -> Result<bool> {
        let output = self
            .run_command(&["get", "count", &locator.to_selector()])
            .await?;
        Ok(output.trim().parse::<usize>().map(|n| n > 0).unwrap_or(false))
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool> {
        let output = self
            .run_command(&["is", "visible", &locator.to_selector()])
            .await?;
        Ok(parse_bool_output(&output))
    }

    async fn alert_text(&self) -> Result<Option<String>> {
        self.install_dialog_hook().await;
        let output = self.run_command(&["eval", DIALOG_PEEK]).await?;
        Ok(parse_dialog_peek(&output))
    }

    async fn accept_alert(&self) -> Result<()> {
        self.run_command(&["eval", DIALOG_SHIFT]).await.map(|_| ())
    }

    async fn close(&self) -> Result<()> {
        self.run_command(&["close"]).await.map(|_| ())
    }
}

fn parse_bool_output(output: &str) -> bool {
    matches!(output.trim().to_lowercase().as_str(), "true" | "yes" | "1")
}

/// Decode the `{"m": ...}` object printed for `DIALOG_PEEK`.
/// agent-browser may print it raw or JSON-encoded a second time.
fn parse_dialog_peek(output: &str) -> Option<String> {
    let value = match serde_json::from_str::<serde_json::Value>(output.trim()) {
        Ok(serde_json::Value::String(inner)) => serde_json::from_str(&inner).ok()?,
        Ok(value) => value,
        Err(e) => {
            tracing::debug!("Unexpected dialog output {:?}: {}", output, e);
            return None;
        }
    };

    match value.get("m")? {
        serde_json::Value::String(message) => Some(message.clone()),
        _ => None,
    }
}

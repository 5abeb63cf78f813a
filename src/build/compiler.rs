//! Elm compiler wrapper
//!
//! Provides an async interface to `elm make`.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::core::{ElmAppError, Result};

/// Executor for `elm make`
#[derive(Debug, Clone)]
pub struct ElmCompiler {
    /// Compiler executable, looked up on PATH
    program: String,
    /// Upper bound for a single build
    timeout: Duration,
}

impl ElmCompiler {
    /// Create a new compiler wrapper
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout: Duration::from_secs(300),
        }
    }

    /// Set the build timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Check if the compiler is installed
    pub async fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Fail with `CompilerNotFound` unless the compiler runs
    pub async fn ensure_available(&self) -> Result<()> {
        if self.is_available().await {
            Ok(())
        } else {
            Err(ElmAppError::CompilerNotFound(self.program.clone()))
        }
    }

    /// Compile `main` into `output`, both relative to `web_root`
    pub async fn make(
        &self,
        web_root: &Path,
        main: &Path,
        output: &Path,
        optimize: bool,
    ) -> Result<()> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("make");

        if optimize {
            cmd.arg("--optimize");
        }

        cmd.arg(main).arg("--output").arg(output);
        cmd.current_dir(web_root);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        tracing::debug!(
            "Running {} make {}{} --output {}",
            self.program,
            if optimize { "--optimize " } else { "" },
            main.display(),
            output.display()
        );

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(result) => result.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ElmAppError::CompilerNotFound(self.program.clone())
                } else {
                    ElmAppError::with_context(format!("Failed to run {}", self.program), e)
                }
            })?,
            Err(_) => return Err(ElmAppError::BuildTimeout(self.timeout)),
        };

        if output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            if !stdout.trim().is_empty() {
                tracing::debug!("{}", stdout.trim());
            }
            Ok(())
        } else {
            Err(ElmAppError::Build {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl Default for ElmCompiler {
    fn default() -> Self {
        Self::new("elm")
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::build::testing::{fake_compiler, FakeBehaviour};

    #[tokio::test]
    async fn test_missing_compiler() {
        let compiler = ElmCompiler::new("elmapp-no-such-compiler");
        assert!(!compiler.is_available().await);
        let err = compiler.ensure_available().await.unwrap_err();
        assert!(matches!(err, ElmAppError::CompilerNotFound(ref p) if p == "elmapp-no-such-compiler"));
    }

    #[tokio::test]
    async fn test_make_argument_order() {
        let tools = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let compiler = ElmCompiler::new(fake_compiler(tools.path(), FakeBehaviour::Succeed));

        assert!(compiler.is_available().await);
        compiler
            .make(
                root.path(),
                Path::new("src/Main.elm"),
                Path::new("dist/main.js"),
                true,
            )
            .await
            .unwrap();

        let args = std::fs::read_to_string(root.path().join("args.txt")).unwrap();
        assert_eq!(args.trim(), "make --optimize src/Main.elm --output dist/main.js");
        assert!(root.path().join("dist/main.js").exists());
    }

    #[tokio::test]
    async fn test_make_without_optimize() {
        let tools = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let compiler = ElmCompiler::new(fake_compiler(tools.path(), FakeBehaviour::Succeed));

        compiler
            .make(root.path(), Path::new("src/Main.elm"), Path::new("out.js"), false)
            .await
            .unwrap();

        let args = std::fs::read_to_string(root.path().join("args.txt")).unwrap();
        assert_eq!(args.trim(), "make src/Main.elm --output out.js");
    }

    #[tokio::test]
    async fn test_make_failure_reports_stderr() {
        let tools = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let compiler = ElmCompiler::new(fake_compiler(tools.path(), FakeBehaviour::Fail));

        let err = compiler
            .make(root.path(), Path::new("src/Main.elm"), Path::new("out.js"), false)
            .await
            .unwrap_err();

        match err {
            ElmAppError::Build { stderr, .. } => assert_eq!(stderr, "-- SYNTAX PROBLEM"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_make_timeout() {
        let tools = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let compiler = ElmCompiler::new(fake_compiler(tools.path(), FakeBehaviour::Hang))
            .with_timeout(Duration::from_millis(200));

        let err = compiler
            .make(root.path(), Path::new("src/Main.elm"), Path::new("out.js"), false)
            .await
            .unwrap_err();

        assert!(matches!(err, ElmAppError::BuildTimeout(_)));
    }
}

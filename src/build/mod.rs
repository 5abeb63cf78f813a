//! Front-end build module
//!
//! Wraps the Elm compiler and the web root the bundle is built into.

mod compiler;
mod web_root;

pub use compiler::ElmCompiler;
pub use web_root::WebRoot;

/// Scripted stand-in for `elm` used by unit tests
#[cfg(all(test, unix))]
pub(crate) mod testing {
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    #[derive(Debug, Clone, Copy)]
    pub enum FakeBehaviour {
        /// Writes the output file, logs the arguments
        Succeed,
        /// Exits 1 with a compiler message on stderr
        Fail,
        /// Never returns
        Hang,
    }

    /// Write an executable `elm` script into `dir` and return its path
    pub fn fake_compiler(dir: &Path, behaviour: FakeBehaviour) -> String {
        let body = match behaviour {
            FakeBehaviour::Succeed => {
                r#"echo "$@" > args.txt
echo build >> builds.log
for last in "$@"; do :; done
mkdir -p "$(dirname "$last")"
echo "// compiled" > "$last"
echo "Success! Compiled 1 module."
"#
            }
            FakeBehaviour::Fail => "printf '%s\\n' '-- SYNTAX PROBLEM' >&2\nexit 1\n",
            FakeBehaviour::Hang => "exec sleep 30\n",
        };

        let script = format!(
            "#!/bin/sh\nif [ \"$1\" = \"--version\" ]; then echo 0.19.1; exit 0; fi\n{}",
            body
        );

        let path = dir.join("elm");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    /// Makes a directory read-only until dropped
    pub struct ReadOnlyDir {
        path: PathBuf,
    }

    impl ReadOnlyDir {
        /// `None` when the current user can write regardless, e.g. root
        pub fn new(path: &Path) -> Option<Self> {
            let guard = Self {
                path: path.to_path_buf(),
            };
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o555)).unwrap();

            if tempfile::tempfile_in(path).is_ok() {
                return None;
            }
            Some(guard)
        }
    }

    impl Drop for ReadOnlyDir {
        fn drop(&mut self) {
            let _ = std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o755));
        }
    }
}

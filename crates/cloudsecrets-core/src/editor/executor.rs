//! Foreground command execution

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;

use crate::types::CancellationToken;

/// Errors from running an interactive command
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("can't start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' exited with {}", .code.map_or_else(|| "a signal".to_string(), |c| format!("status {}", c)))]
    Failed { command: String, code: Option<i32> },

    #[error("'{command}' interrupted")]
    Interrupted { command: String },

    #[error("working directory {} does not exist", .0.display())]
    MissingWorkingDir(PathBuf),
}

pub type ExecResult<T> = Result<T, ExecError>;

/// Runs shell commands attached to the caller's terminal
///
/// Commands inherit stdin, stdout and stderr so editors get the TTY. The
/// executor is bound to one working directory and one interrupt token.
#[derive(Debug, Clone)]
pub struct Executor {
    working_dir: PathBuf,
    interrupt: CancellationToken,
}

impl Executor {
    pub fn new(working_dir: impl Into<PathBuf>, interrupt: CancellationToken) -> ExecResult<Self> {
        let working_dir = working_dir.into();
        if !working_dir.is_dir() {
            return Err(ExecError::MissingWorkingDir(working_dir));
        }
        Ok(Self {
            working_dir,
            interrupt,
        })
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Open `path` in `editor` and wait for the editor to exit
    ///
    /// `editor` is word-split by the shell (`code --wait` works); the path is
    /// passed as `$1` and never interpreted.
    pub async fn open_in_editor(&self, editor: &str, path: &Path) -> ExecResult<()> {
        self.run_with_tty(&editor_script(editor), &[path.as_os_str()]).await
    }

    /// Run `command` through `sh -c` and wait for it to exit
    ///
    /// `args` become the positional parameters `$1..`. An interrupt kills
    /// the child and returns `Interrupted`.
    pub async fn run_with_tty(&self, command: &str, args: &[&OsStr]) -> ExecResult<()> {
        crate::debug_log!("Running '{}' {:?} in {}", command, args, self.working_dir.display());

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .arg("sh")
            .args(args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExecError::Spawn {
                command: command.to_string(),
                source,
            })?;

        tokio::select! {
            status = child.wait() => {
                let status = status.map_err(|source| ExecError::Spawn {
                    command: command.to_string(),
                    source,
                })?;
                if status.success() {
                    Ok(())
                } else {
                    Err(ExecError::Failed {
                        command: command.to_string(),
                        code: status.code(),
                    })
                }
            }
            _ = self.interrupt.cancelled() => {
                if let Err(e) = child.kill().await {
                    crate::debug_log!("Can't kill '{}': {}", command, e);
                }
                Err(ExecError::Interrupted {
                    command: command.to_string(),
                })
            }
        }
    }
}

/// `sh -c` script that runs `editor` on its first positional argument
pub fn editor_script(editor: &str) -> String {
    format!("{} \"$1\"", editor)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_missing_working_dir() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("gone");
        assert!(matches!(
            Executor::new(&missing, CancellationToken::new()),
            Err(ExecError::MissingWorkingDir(_))
        ));
    }

    #[tokio::test]
    async fn test_successful_command() {
        let dir = tempdir().unwrap();
        let executor = Executor::new(dir.path(), CancellationToken::new()).unwrap();
        executor.run_with_tty("touch marker", &[]).await.unwrap();
        assert!(dir.path().join("marker").exists());
    }

    #[tokio::test]
    async fn test_failing_command_reports_status() {
        let dir = tempdir().unwrap();
        let executor = Executor::new(dir.path(), CancellationToken::new()).unwrap();
        let err = executor.run_with_tty("exit 3", &[]).await.unwrap_err();
        assert!(matches!(err, ExecError::Failed { code: Some(3), .. }));
        assert_eq!(err.to_string(), "'exit 3' exited with status 3");
    }

    #[tokio::test]
    async fn test_interrupt_kills_command() {
        let dir = tempdir().unwrap();
        let token = CancellationToken::new();
        let executor = Executor::new(dir.path(), token.clone()).unwrap();

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        });

        let err = executor.run_with_tty("sleep 30", &[]).await.unwrap_err();
        assert!(matches!(err, ExecError::Interrupted { .. }));
        canceller.await.unwrap();
    }

    #[test]
    fn test_editor_script() {
        assert_eq!(editor_script("vi"), "vi \"$1\"");
        assert_eq!(editor_script("code --wait"), "code --wait \"$1\"");
    }

    #[tokio::test]
    async fn test_editor_path_is_not_interpreted() {
        let dir = tempdir().unwrap();
        let executor = Executor::new(dir.path(), CancellationToken::new()).unwrap();
        let path = dir.path().join("my secret$(touch injected).yaml");

        executor.open_in_editor("touch", &path).await.unwrap();

        let mut entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        entries.sort();
        assert_eq!(entries, vec!["my secret$(touch injected).yaml".to_string()]);
    }

    #[tokio::test]
    async fn test_editor_with_arguments() {
        let dir = tempdir().unwrap();
        let executor = Executor::new(dir.path(), CancellationToken::new()).unwrap();
        let path = dir.path().join("db.yaml");

        executor.open_in_editor("touch -c", &path).await.unwrap();
        assert!(!path.exists());
    }
}

//! Spawning the subordinate server process.

use crate::error::{Error, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// How to launch the server: program, arguments, and the directory to run it
/// from. Defaults to `node index.js` in the checkout root.
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    pub program: String,
    pub args: Vec<String>,
    pub root: PathBuf,
}

impl LaunchSpec {
    pub fn inventory_service(root: impl Into<PathBuf>) -> Self {
        Self {
            program: "node".to_string(),
            args: vec!["index.js".to_string()],
            root: root.into(),
        }
    }

    /// Arbitrary command, used by tests to stand in a short-lived child.
    pub fn command(program: impl Into<String>, args: &[&str], root: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            root: root.into(),
        }
    }

    /// Spawn the server with DB_NAME and PORT set, stdout and stderr both
    /// appended to the log file, stdin detached. Fire-and-forget: the child
    /// handle is dropped and no readiness check is performed.
    pub fn spawn(&self, database_name: &str, port: u16, log_path: &Path) -> Result<u32> {
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let log = File::options().append(true).create(true).open(log_path)?;
        let log_stderr = log.try_clone()?;

        tracing::debug!(
            "spawning {} {:?} in {:?} (DB_NAME={}, PORT={})",
            self.program,
            self.args,
            self.root,
            database_name,
            port
        );

        let child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.root)
            .env("DB_NAME", database_name)
            .env("PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_stderr))
            .spawn()
            .map_err(|e| Error::SpawnFailed(format!("{} ({:?})", e, self.program)))?;

        Ok(child.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe;
    use std::time::Duration;

    #[test]
    fn spawn_records_output_in_append_mode() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("out.log");
        let spec = LaunchSpec::command("sh", &["-c", "echo run-$DB_NAME-$PORT"], dir.path());

        spec.spawn("dev", 4002, &log).unwrap();
        spec.spawn("dev", 4003, &log).unwrap();
        // Give both children a moment to write and exit
        std::thread::sleep(Duration::from_millis(300));

        let contents = fs::read_to_string(&log).unwrap();
        assert!(contents.contains("run-dev-4002"), "log: {}", contents);
        assert!(contents.contains("run-dev-4003"), "log: {}", contents);
    }

    #[test]
    fn spawn_returns_the_child_pid() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("out.log");
        let spec = LaunchSpec::command("sh", &["-c", "exec sleep 30"], dir.path());

        let pid = spec.spawn("dev", 4002, &log).unwrap();
        assert!(probe::is_alive(pid));
        probe::force_kill(pid);
    }

    #[test]
    fn spawn_of_a_missing_program_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("out.log");
        let spec = LaunchSpec::command("definitely-not-a-real-binary", &[], dir.path());

        let err = spec.spawn("dev", 4002, &log).unwrap_err();
        assert!(matches!(err, Error::SpawnFailed(_)));
    }
}

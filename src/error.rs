use miette::Diagnostic;
use std::io;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("State error: {0}")]
    #[diagnostic(code(invsup::state::error))]
    State(String),

    #[error("Invalid PID {pid}: {reason}")]
    #[diagnostic(code(invsup::pid::invalid))]
    InvalidPid { pid: u32, reason: String },

    #[error("Failed to start inventory-service: {0}")]
    #[diagnostic(
        code(invsup::spawn::failed),
        help("Check that the server command exists and is executable from the --root directory")
    )]
    SpawnFailed(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns a helpful suggestion for resolving this error, if available.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Error::SpawnFailed(_) => Some(
                "Run with --root pointing at the inventory-service checkout (the directory containing index.js)."
                    .to_string(),
            ),
            Error::State(msg) if msg.contains("state directory") => Some(
                "Check permissions on the state directory, or pass --state-dir to use a writable one."
                    .to_string(),
            ),
            _ => None,
        }
    }
}

/// Validates and converts a u32 PID to nix::unistd::Pid for signal operations.
/// Returns Err for PID 0 (process group), PID 1 (init), or values > i32::MAX.
pub fn validate_pid(pid: u32, context: &str) -> Result<nix::unistd::Pid> {
    if pid == 0 {
        return Err(Error::InvalidPid {
            pid,
            reason: format!("PID 0 refers to a process group, not a process ({})", context),
        });
    }
    if pid == 1 {
        return Err(Error::InvalidPid {
            pid,
            reason: format!("refusing to signal PID 1 (init) ({})", context),
        });
    }
    if pid > i32::MAX as u32 {
        return Err(Error::InvalidPid {
            pid,
            reason: format!("PID exceeds i32::MAX, cannot convert safely ({})", context),
        });
    }
    Ok(nix::unistd::Pid::from_raw(pid as i32))
}

/// Same as validate_pid but allows PID 1, for read-only existence checks.
/// Use validate_pid for signal operations.
pub fn validate_pid_for_check(pid: u32) -> Option<nix::unistd::Pid> {
    if pid == 0 || pid > i32::MAX as u32 {
        return None;
    }
    Some(nix::unistd::Pid::from_raw(pid as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_pid_rejects_zero_one_and_overflow() {
        assert!(validate_pid(0, "test").is_err());
        assert!(validate_pid(1, "test").is_err());
        assert!(validate_pid(i32::MAX as u32 + 1, "test").is_err());
        assert!(validate_pid(2, "test").is_ok());
        assert!(validate_pid(i32::MAX as u32, "test").is_ok());
    }

    #[test]
    fn validate_pid_for_check_allows_init() {
        assert!(validate_pid_for_check(0).is_none());
        assert!(validate_pid_for_check(1).is_some());
        assert!(validate_pid_for_check(u32::MAX).is_none());
    }

    #[test]
    fn spawn_failure_carries_a_suggestion() {
        let err = Error::SpawnFailed("No such file or directory".to_string());
        assert!(err.suggestion().unwrap().contains("--root"));
    }
}

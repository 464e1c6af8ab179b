//! Per-environment instance state.
//!
//! Each environment owns at most one instance record, persisted as separate
//! scalar files: the pid of the last started process and the last explicitly
//! chosen port override. The log path is a naming convention derived from the
//! environment, not persisted data. A pid record is authoritative only while
//! the process it names probes live; readers re-verify, writers overwrite.
//!
//! There is no file locking. Two invocations racing on the same environment
//! are last-writer-wins.

mod files;

pub use files::FileStateStore;

use crate::environment::Environment;
use crate::error::Result;
use std::collections::HashMap;
use std::path::PathBuf;

/// Storage abstraction for instance records.
///
/// The supervisor uses this trait to read/write pid and port state without
/// knowing whether it's backed by flat files or an in-memory map.
///
/// # Implementations
///
/// - [`FileStateStore`]: flat files `inventory-service-<env>.{pid,port}`
/// - [`MemoryStateStore`]: in-process map for tests
pub trait StateStore: Send + Sync {
    /// Last recorded pid for the environment, if any.
    fn pid(&self, env: Environment) -> Option<u32>;

    /// Record the pid of a freshly started process.
    fn save_pid(&mut self, env: Environment, pid: u32) -> Result<()>;

    /// Remove the pid record. Removing an absent record is not an error.
    fn clear_pid(&mut self, env: Environment) -> Result<()>;

    /// Last explicitly saved port override, if any.
    fn saved_port(&self, env: Environment) -> Option<u16>;

    /// Persist an explicit port override. Overwrites any previous value.
    fn save_port(&mut self, env: Environment, port: u16) -> Result<()>;

    /// Where the environment's combined server output goes. Append-only,
    /// never truncated or deleted by this tool.
    fn log_path(&self, env: Environment) -> PathBuf;
}

/// In-memory store for tests. Log paths land in the system temp dir so a
/// spawn against this store still has somewhere to write.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    pids: HashMap<Environment, u32>,
    ports: HashMap<Environment, u16>,
    log_dir: Option<PathBuf>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_dir(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: Some(log_dir.into()),
            ..Self::default()
        }
    }
}

impl StateStore for MemoryStateStore {
    fn pid(&self, env: Environment) -> Option<u32> {
        self.pids.get(&env).copied()
    }

    fn save_pid(&mut self, env: Environment, pid: u32) -> Result<()> {
        self.pids.insert(env, pid);
        Ok(())
    }

    fn clear_pid(&mut self, env: Environment) -> Result<()> {
        self.pids.remove(&env);
        Ok(())
    }

    fn saved_port(&self, env: Environment) -> Option<u16> {
        self.ports.get(&env).copied()
    }

    fn save_port(&mut self, env: Environment, port: u16) -> Result<()> {
        self.ports.insert(env, port);
        Ok(())
    }

    fn log_path(&self, env: Environment) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
            .join(format!("inventory-service-{}.log", env))
    }
}

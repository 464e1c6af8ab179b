use super::StateStore;
use crate::environment::Environment;
use crate::error::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Flat-file state store.
///
/// One file per scalar, named `inventory-service-<env>.<suffix>` under the
/// base directory (the system temp dir unless overridden):
///
/// - `.pid`: decimal process id
/// - `.port`: decimal port, present only once an override has been set
/// - `.log`: the server's combined output (written by the spawned process,
///   only named here)
///
/// Files that are missing or don't parse are treated as absent.
pub struct FileStateStore {
    base_dir: PathBuf,
    service: &'static str,
}

const SERVICE_NAME: &str = "inventory-service";

impl FileStateStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            service: SERVICE_NAME,
        }
    }

    /// Store rooted at the shared system temp dir, the conventional location.
    pub fn system() -> Self {
        Self::new(std::env::temp_dir())
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn pid_path(&self, env: Environment) -> PathBuf {
        self.file(env, "pid")
    }

    pub fn port_path(&self, env: Environment) -> PathBuf {
        self.file(env, "port")
    }

    fn file(&self, env: Environment, suffix: &str) -> PathBuf {
        self.base_dir
            .join(format!("{}-{}.{}", self.service, env, suffix))
    }

    fn read_number<T: std::str::FromStr>(path: &Path) -> Option<T> {
        let contents = fs::read_to_string(path).ok()?;
        match contents.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::debug!("ignoring unparseable state file {}", path.display());
                None
            }
        }
    }

    fn write_number(&self, path: &Path, value: impl ToString) -> Result<()> {
        fs::create_dir_all(&self.base_dir).map_err(|e| {
            Error::State(format!(
                "cannot create state directory {}: {}",
                self.base_dir.display(),
                e
            ))
        })?;
        fs::write(path, value.to_string())?;
        Ok(())
    }
}

impl StateStore for FileStateStore {
    fn pid(&self, env: Environment) -> Option<u32> {
        Self::read_number(&self.pid_path(env))
    }

    fn save_pid(&mut self, env: Environment, pid: u32) -> Result<()> {
        self.write_number(&self.pid_path(env), pid)
    }

    fn clear_pid(&mut self, env: Environment) -> Result<()> {
        match fs::remove_file(self.pid_path(env)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn saved_port(&self, env: Environment) -> Option<u16> {
        Self::read_number(&self.port_path(env))
    }

    fn save_port(&mut self, env: Environment, port: u16) -> Result<()> {
        self.write_number(&self.port_path(env), port)
    }

    fn log_path(&self, env: Environment) -> PathBuf {
        self.file(env, "log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, FileStateStore) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = FileStateStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn paths_follow_the_naming_convention() {
        let (dir, store) = store();
        assert_eq!(
            store.pid_path(Environment::Dev),
            dir.path().join("inventory-service-dev.pid")
        );
        assert_eq!(
            store.port_path(Environment::Test),
            dir.path().join("inventory-service-test.port")
        );
        assert_eq!(
            store.log_path(Environment::Prod),
            dir.path().join("inventory-service-prod.log")
        );
    }

    #[test]
    fn pid_round_trip_writes_plain_decimal() {
        let (dir, mut store) = store();
        store.save_pid(Environment::Dev, 12345).unwrap();

        let raw = fs::read_to_string(dir.path().join("inventory-service-dev.pid")).unwrap();
        assert_eq!(raw, "12345");
        assert_eq!(store.pid(Environment::Dev), Some(12345));
    }

    #[test]
    fn clear_pid_is_idempotent() {
        let (_dir, mut store) = store();
        store.save_pid(Environment::Dev, 1000).unwrap();
        store.clear_pid(Environment::Dev).unwrap();
        assert_eq!(store.pid(Environment::Dev), None);
        store.clear_pid(Environment::Dev).unwrap();
    }

    #[test]
    fn garbage_state_files_read_as_absent() {
        let (dir, store) = store();
        fs::write(dir.path().join("inventory-service-dev.pid"), "not-a-pid").unwrap();
        fs::write(dir.path().join("inventory-service-dev.port"), "99999999").unwrap();

        assert_eq!(store.pid(Environment::Dev), None);
        // 99999999 does not fit a u16, so the override is ignored
        assert_eq!(store.saved_port(Environment::Dev), None);
    }

    #[test]
    fn whitespace_around_values_is_tolerated() {
        let (dir, store) = store();
        fs::write(dir.path().join("inventory-service-prod.pid"), " 4321\n").unwrap();
        assert_eq!(store.pid(Environment::Prod), Some(4321));
    }

    #[test]
    fn environments_do_not_share_records() {
        let (_dir, mut store) = store();
        store.save_port(Environment::Dev, 5000).unwrap();
        assert_eq!(store.saved_port(Environment::Dev), Some(5000));
        assert_eq!(store.saved_port(Environment::Test), None);
        assert_eq!(store.saved_port(Environment::Prod), None);
    }
}

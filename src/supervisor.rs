//! The environment supervisor: resolve, start, stop, restart, status.
//!
//! Operations return outcome values; printing belongs to the command layer.
//! OS-level failures (missing process, permission, missing inspection tool)
//! are swallowed into negative signals at the layers below, so the only
//! errors that escape here are state-file I/O and spawn failures.

use crate::environment::Environment;
use crate::error::Result;
use crate::launch::LaunchSpec;
use crate::listener::{self, LsofScanner, PortScanner};
use crate::probe;
use crate::state::{FileStateStore, StateStore};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration resolved for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub database_name: &'static str,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// A tracked, live process already exists. Nothing was spawned.
    AlreadyRunning { pid: u32 },
    /// A new process was spawned and recorded.
    Started {
        pid: u32,
        log_path: PathBuf,
        /// Untracked listeners that were squatting on the port and got a
        /// SIGTERM before the spawn.
        displaced: Vec<u32>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    /// The tracked process was terminated; `forced` when SIGKILL was needed.
    Stopped { pid: u32, forced: bool },
    /// No tracked process; listeners on the port were each sent one SIGTERM.
    ClearedListeners { pids: Vec<u32> },
    /// Nothing tracked and nothing listening.
    NotRunning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StatusReport {
    /// A tracked, live process exists.
    Running {
        pid: u32,
        port: u16,
        database_name: String,
    },
    /// No tracked process, but something is listening on the port.
    Untracked { pids: Vec<u32>, port: u16 },
    NotRunning { port: u16 },
}

pub struct Supervisor {
    store: Box<dyn StateStore>,
    scanner: Box<dyn PortScanner>,
    launch: LaunchSpec,
    stop_polls: u32,
    poll_interval: Duration,
    squat_pause: Duration,
}

impl Supervisor {
    pub fn builder() -> SupervisorBuilder {
        SupervisorBuilder::default()
    }

    /// Default database name and port for the environment, with the saved
    /// override (if any) replacing the default, and an explicit caller
    /// override winning over both. An explicit override is persisted as the
    /// new saved value for future invocations.
    pub fn resolve(&mut self, env: Environment, override_port: Option<u16>) -> Result<Resolved> {
        let default_port = self
            .store
            .saved_port(env)
            .unwrap_or_else(|| env.default_port());
        let port = override_port.unwrap_or(default_port);
        if override_port.is_some() {
            self.store.save_port(env, port)?;
        }
        Ok(Resolved {
            database_name: env.database_name(),
            port,
        })
    }

    /// Start the server for the environment. No-op when a tracked process is
    /// already live. Untracked listeners squatting on the port get a SIGTERM
    /// and a short pause before the spawn. Fire-and-forget: no confirmation
    /// that the server begins listening.
    pub fn start(&mut self, env: Environment, resolved: Resolved) -> Result<StartOutcome> {
        if let Some(pid) = self.store.pid(env) {
            if probe::is_alive(pid) {
                return Ok(StartOutcome::AlreadyRunning { pid });
            }
        }

        let displaced = self.scanner.listeners(resolved.port);
        if !displaced.is_empty() {
            tracing::warn!(
                "port {} already in use by PIDs {:?}, stopping them before starting",
                resolved.port,
                displaced
            );
            listener::terminate_listeners(&displaced);
            std::thread::sleep(self.squat_pause);
        }

        let log_path = self.store.log_path(env);
        let pid = self
            .launch
            .spawn(resolved.database_name, resolved.port, &log_path)?;
        self.store.save_pid(env, pid)?;

        Ok(StartOutcome::Started {
            pid,
            log_path,
            displaced,
        })
    }

    /// Stop the server for the environment. The tracked path is graceful
    /// then forceful: SIGTERM, poll for exit, SIGKILL if still alive; the
    /// pid record is removed whichever signal worked. Without a live tracked
    /// pid, listeners on the port each get a single SIGTERM with no polling.
    pub fn stop(&mut self, env: Environment, port: u16) -> Result<StopOutcome> {
        if let Some(pid) = self.store.pid(env) {
            if probe::is_alive(pid) {
                probe::terminate(pid);
                for _ in 0..self.stop_polls {
                    if !probe::is_alive(pid) {
                        break;
                    }
                    std::thread::sleep(self.poll_interval);
                }
                let forced = probe::is_alive(pid);
                if forced {
                    tracing::warn!("PID {} did not stop after SIGTERM, sending SIGKILL", pid);
                    probe::force_kill(pid);
                }
                self.store.clear_pid(env)?;
                return Ok(StopOutcome::Stopped { pid, forced });
            }
            // Stale record: the fallback below takes over, the record stays.
            tracing::debug!("tracked PID {} for '{}' is not live", pid, env);
        }

        let pids = self.scanner.listeners(port);
        if pids.is_empty() {
            Ok(StopOutcome::NotRunning)
        } else {
            listener::terminate_listeners(&pids);
            Ok(StopOutcome::ClearedListeners { pids })
        }
    }

    /// Stop then start with freshly resolved configuration. Not atomic: a
    /// failed start after a successful stop leaves the environment stopped.
    pub fn restart(
        &mut self,
        env: Environment,
        override_port: Option<u16>,
    ) -> Result<(Resolved, StopOutcome, StartOutcome)> {
        let resolved = self.resolve(env, override_port)?;
        let stopped = self.stop(env, resolved.port)?;
        let started = self.start(env, resolved)?;
        Ok((resolved, stopped, started))
    }

    /// Observational only: tracked live pid, else listeners, else nothing.
    pub fn status(&self, env: Environment, resolved: Resolved) -> StatusReport {
        if let Some(pid) = self.store.pid(env) {
            if probe::is_alive(pid) {
                return StatusReport::Running {
                    pid,
                    port: resolved.port,
                    database_name: resolved.database_name.to_string(),
                };
            }
        }

        let pids = self.scanner.listeners(resolved.port);
        if pids.is_empty() {
            StatusReport::NotRunning {
                port: resolved.port,
            }
        } else {
            StatusReport::Untracked {
                pids,
                port: resolved.port,
            }
        }
    }

    pub fn store(&self) -> &dyn StateStore {
        self.store.as_ref()
    }
}

/// Builder with the conventional defaults: file store in the system temp
/// dir, lsof scanner, `node index.js` in the current directory, and the
/// 10 × 1 s stop grace period.
pub struct SupervisorBuilder {
    store: Option<Box<dyn StateStore>>,
    scanner: Option<Box<dyn PortScanner>>,
    launch: Option<LaunchSpec>,
    stop_polls: u32,
    poll_interval: Duration,
    squat_pause: Duration,
}

impl Default for SupervisorBuilder {
    fn default() -> Self {
        Self {
            store: None,
            scanner: None,
            launch: None,
            stop_polls: 10,
            poll_interval: Duration::from_secs(1),
            squat_pause: Duration::from_secs(1),
        }
    }
}

impl SupervisorBuilder {
    pub fn store(mut self, store: Box<dyn StateStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn scanner(mut self, scanner: Box<dyn PortScanner>) -> Self {
        self.scanner = Some(scanner);
        self
    }

    pub fn launch(mut self, launch: LaunchSpec) -> Self {
        self.launch = Some(launch);
        self
    }

    /// Shrink (or stretch) the SIGTERM-to-SIGKILL window of the tracked stop
    /// path. Tests use millisecond intervals.
    pub fn stop_grace(mut self, polls: u32, interval: Duration) -> Self {
        self.stop_polls = polls;
        self.poll_interval = interval;
        self
    }

    /// Pause inserted after terminating squatting listeners during start.
    pub fn squat_pause(mut self, pause: Duration) -> Self {
        self.squat_pause = pause;
        self
    }

    pub fn build(self) -> Supervisor {
        Supervisor {
            store: self
                .store
                .unwrap_or_else(|| Box::new(FileStateStore::system())),
            scanner: self.scanner.unwrap_or_else(|| Box::new(LsofScanner)),
            launch: self
                .launch
                .unwrap_or_else(|| LaunchSpec::inventory_service(".")),
            stop_polls: self.stop_polls,
            poll_interval: self.poll_interval,
            squat_pause: self.squat_pause,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MemoryStateStore;

    struct NoListeners;

    impl PortScanner for NoListeners {
        fn listeners(&self, _port: u16) -> Vec<u32> {
            Vec::new()
        }
    }

    fn supervisor_with(store: MemoryStateStore) -> Supervisor {
        Supervisor::builder()
            .store(Box::new(store))
            .scanner(Box::new(NoListeners))
            .build()
    }

    #[test]
    fn resolve_uses_environment_defaults() {
        let mut sup = supervisor_with(MemoryStateStore::new());
        let r = sup.resolve(Environment::Dev, None).unwrap();
        assert_eq!(r.database_name, "dev");
        assert_eq!(r.port, 4002);
    }

    #[test]
    fn explicit_override_wins_and_persists() {
        let mut sup = supervisor_with(MemoryStateStore::new());

        let r = sup.resolve(Environment::Test, Some(5000)).unwrap();
        assert_eq!(r.port, 5000);

        // Subsequent resolve without an override sees the saved value
        let r = sup.resolve(Environment::Test, None).unwrap();
        assert_eq!(r.port, 5000);
        assert_eq!(r.database_name, "test_ui");
    }

    #[test]
    fn saved_override_replaces_default_until_overridden_again() {
        let mut sup = supervisor_with(MemoryStateStore::new());
        sup.resolve(Environment::Prod, Some(9000)).unwrap();
        assert_eq!(sup.resolve(Environment::Prod, None).unwrap().port, 9000);

        sup.resolve(Environment::Prod, Some(9100)).unwrap();
        assert_eq!(sup.resolve(Environment::Prod, None).unwrap().port, 9100);
    }

    #[test]
    fn resolve_without_override_does_not_write() {
        let mut sup = supervisor_with(MemoryStateStore::new());
        sup.resolve(Environment::Dev, None).unwrap();
        assert_eq!(sup.store().saved_port(Environment::Dev), None);
    }

    #[test]
    fn status_with_nothing_tracked_and_nothing_listening_is_not_running() {
        let sup = supervisor_with(MemoryStateStore::new());
        let resolved = Resolved {
            database_name: "dev",
            port: 4002,
        };
        assert_eq!(
            sup.status(Environment::Dev, resolved),
            StatusReport::NotRunning { port: 4002 }
        );
    }

    #[test]
    fn status_reports_untracked_listeners() {
        struct OneListener;
        impl PortScanner for OneListener {
            fn listeners(&self, _port: u16) -> Vec<u32> {
                vec![777]
            }
        }
        let sup = Supervisor::builder()
            .store(Box::new(MemoryStateStore::new()))
            .scanner(Box::new(OneListener))
            .build();
        let resolved = Resolved {
            database_name: "dev",
            port: 4002,
        };
        assert_eq!(
            sup.status(Environment::Dev, resolved),
            StatusReport::Untracked {
                pids: vec![777],
                port: 4002
            }
        );
    }

    #[test]
    fn stop_with_no_state_reports_not_running() {
        let mut sup = supervisor_with(MemoryStateStore::new());
        assert_eq!(
            sup.stop(Environment::Prod, 4011).unwrap(),
            StopOutcome::NotRunning
        );
    }

    #[test]
    fn stale_dead_pid_record_falls_through_and_survives() {
        let mut store = MemoryStateStore::new();
        // Near pid_max; not a live process
        store.save_pid(Environment::Dev, 4194301).unwrap();
        let mut sup = supervisor_with(store);

        assert_eq!(
            sup.stop(Environment::Dev, 4002).unwrap(),
            StopOutcome::NotRunning
        );
        // The fallback path leaves the stale record in place
        assert_eq!(sup.store().pid(Environment::Dev), Some(4194301));
    }

    #[test]
    fn status_report_serializes_with_a_state_tag() {
        let report = StatusReport::Running {
            pid: 42,
            port: 4002,
            database_name: "dev".to_string(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["state"], "running");
        assert_eq!(json["pid"], 42);
    }
}

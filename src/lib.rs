//! # Inventory Supervisor
//!
//! Manage inventory-service instances across the dev/test/prod environments:
//! start, stop, restart, and status for a single subordinate server process
//! per environment, with pid/log/port state tracked in flat files.
//!
//! The moving parts:
//!
//! - **State store**: per-environment pid and saved-port records plus the
//!   log-path naming convention ([`state::StateStore`])
//! - **Probe**: signal-based liveness checks and graceful/forceful
//!   termination ([`probe`])
//! - **Listener fallback**: direct OS port inspection for processes that
//!   outlived their pid record ([`listener::PortScanner`])
//! - **Supervisor**: the lifecycle operations themselves ([`Supervisor`])
//!
//! ## Quick Start
//!
//! ```no_run
//! use invsup::{Environment, Supervisor};
//!
//! # fn example() -> invsup::Result<()> {
//! let mut supervisor = Supervisor::builder().build();
//! let resolved = supervisor.resolve(Environment::Dev, None)?;
//! supervisor.start(Environment::Dev, resolved)?;
//! # Ok(())
//! # }
//! ```

pub mod environment;
pub mod error;
pub mod launch;
pub mod listener;
pub mod probe;
pub mod state;
pub mod supervisor;

// Re-export commonly used types
pub use environment::Environment;
pub use error::{Error, Result};
pub use launch::LaunchSpec;
pub use listener::{LsofScanner, PortScanner};
pub use state::{FileStateStore, MemoryStateStore, StateStore};
pub use supervisor::{Resolved, StartOutcome, StatusReport, StopOutcome, Supervisor};

//! Process liveness and termination primitives.
//!
//! Everything here swallows OS-level failure into a negative signal: a pid
//! that cannot be probed or signalled is reported as not alive / not acted
//! on, never as a distinguishable error to the caller. The failure kind is
//! still recorded at debug level before the downgrade.

use crate::error::{validate_pid, validate_pid_for_check};
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};

/// Why a probe came back negative. Logged, never surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeFailure {
    /// No such process (or the pid value itself is unusable).
    NotFound,
    /// The process exists but belongs to another user. A reused pid from an
    /// unrelated process is indistinguishable from this; treated as not ours.
    PermissionDenied,
}

/// Signal-0 existence check. A defunct (zombie) process answers the signal
/// but is already dead for supervision purposes, so it probes negative.
pub fn probe(pid: u32) -> Result<(), ProbeFailure> {
    let Some(nix_pid) = validate_pid_for_check(pid) else {
        return Err(ProbeFailure::NotFound);
    };
    match signal::kill(nix_pid, None) {
        Ok(()) => {
            if is_defunct(pid) {
                return Err(ProbeFailure::NotFound);
            }
            Ok(())
        }
        Err(Errno::EPERM) => Err(ProbeFailure::PermissionDenied),
        Err(_) => Err(ProbeFailure::NotFound),
    }
}

#[cfg(target_os = "linux")]
fn is_defunct(pid: u32) -> bool {
    if let Ok(status) = std::fs::read_to_string(format!("/proc/{}/status", pid)) {
        for line in status.lines() {
            if let Some(state) = line.strip_prefix("State:") {
                return matches!(state.trim().chars().next(), Some('Z' | 'X' | 'x'));
            }
        }
    }
    false
}

#[cfg(not(target_os = "linux"))]
fn is_defunct(pid: u32) -> bool {
    use std::process::Command;
    if let Ok(output) = Command::new("ps")
        .args(["-p", &pid.to_string(), "-o", "stat="])
        .output()
    {
        if output.status.success() {
            return String::from_utf8_lossy(&output.stdout).trim().starts_with('Z');
        }
    }
    false
}

/// Whether the pid refers to a live process this tool could manage.
pub fn is_alive(pid: u32) -> bool {
    match probe(pid) {
        Ok(()) => true,
        Err(kind) => {
            tracing::debug!("probe of PID {} negative: {:?}", pid, kind);
            false
        }
    }
}

/// Send SIGTERM. Failures (process gone, permission) are swallowed.
pub fn terminate(pid: u32) {
    send(pid, Signal::SIGTERM);
}

/// Send SIGKILL. Failures are swallowed.
pub fn force_kill(pid: u32) {
    send(pid, Signal::SIGKILL);
}

fn send(pid: u32, sig: Signal) {
    match validate_pid(pid, "signal delivery") {
        Ok(nix_pid) => {
            if let Err(e) = signal::kill(nix_pid, sig) {
                tracing::debug!("{} to PID {} failed: {}", sig, pid, e);
            }
        }
        Err(e) => tracing::warn!("not signalling PID {}: {}", pid, e),
    }
}

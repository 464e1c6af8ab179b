//! Listener fallback: locating processes bound to a TCP port directly via OS
//! inspection, for when no tracked pid is available.

use crate::probe;
use std::io;
use std::process::Command;

/// Secondary discovery strategy, consulted only after the tracked-pid lookup
/// comes up empty. Returns the pids of processes listening on the port.
pub trait PortScanner: Send + Sync {
    fn listeners(&self, port: u16) -> Vec<u32>;
}

/// Scanner backed by `lsof`, with an `ss` sweep as fallback on Linux.
///
/// A missing inspection utility is a negative signal, not an error: the scan
/// reports no listeners and the supervisor proceeds as if the port is free.
#[derive(Debug, Default)]
pub struct LsofScanner;

impl PortScanner for LsofScanner {
    fn listeners(&self, port: u16) -> Vec<u32> {
        match lsof_listeners(port) {
            Ok(pids) => pids,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("lsof unavailable, trying ss");
                ss_listeners(port)
            }
            Err(e) => {
                tracing::debug!("lsof failed for port {}: {}", port, e);
                Vec::new()
            }
        }
    }
}

fn lsof_listeners(port: u16) -> io::Result<Vec<u32>> {
    let output = Command::new("lsof")
        .arg(format!("-tiTCP:{}", port))
        .arg("-sTCP:LISTEN")
        .output()?;

    // lsof exits non-zero when nothing matches
    if !output.status.success() {
        return Ok(Vec::new());
    }

    Ok(parse_pid_lines(&String::from_utf8_lossy(&output.stdout)))
}

fn parse_pid_lines(stdout: &str) -> Vec<u32> {
    stdout
        .lines()
        .filter_map(|line| line.trim().parse::<u32>().ok())
        .collect()
}

#[cfg(target_os = "linux")]
fn ss_listeners(port: u16) -> Vec<u32> {
    let output = match Command::new("ss")
        .args(["-tlnp", &format!("sport = :{}", port)])
        .output()
    {
        Ok(o) => o,
        Err(e) => {
            tracing::debug!("ss unavailable: {}", e);
            return Vec::new();
        }
    };

    if !output.status.success() {
        return Vec::new();
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut pids = Vec::new();

    // Look for pid=PID,fd=... in the users column; ss can report several per line
    for line in stdout.lines().skip(1) {
        for part in line.split(|c: char| c == ',' || c == '(') {
            if let Some(pid_str) = part.strip_prefix("pid=") {
                if let Ok(pid) = pid_str.parse::<u32>() {
                    if !pids.contains(&pid) {
                        pids.push(pid);
                    }
                }
            }
        }
    }

    pids
}

#[cfg(not(target_os = "linux"))]
fn ss_listeners(_port: u16) -> Vec<u32> {
    Vec::new()
}

/// Single SIGTERM per listener, no polling, no confirmation of death.
pub fn terminate_listeners(pids: &[u32]) {
    for &pid in pids {
        probe::terminate(pid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_one_pid_per_line() {
        assert_eq!(parse_pid_lines("1234\n5678\n"), vec![1234, 5678]);
        assert_eq!(parse_pid_lines(""), Vec::<u32>::new());
        assert_eq!(parse_pid_lines("  901  \n"), vec![901]);
    }

    #[test]
    fn junk_lines_are_skipped() {
        assert_eq!(parse_pid_lines("1234\nnot-a-pid\n42\n"), vec![1234, 42]);
    }

    #[test]
    fn scan_of_an_unbound_port_finds_nothing() {
        // Nothing should be listening this high in the dynamic range
        let pids = LsofScanner.listeners(64999);
        assert!(pids.is_empty());
    }
}

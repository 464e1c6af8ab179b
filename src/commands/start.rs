use crate::output::UserOutput;
use invsup::{Environment, Resolved, StartOutcome, Supervisor};

pub fn run_start(
    supervisor: &mut Supervisor,
    env: Environment,
    port: Option<u16>,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    let resolved = supervisor.resolve(env, port)?;
    let outcome = supervisor.start(env, resolved)?;
    report(env, resolved, &outcome, out);
    Ok(())
}

pub(super) fn report(
    env: Environment,
    resolved: Resolved,
    outcome: &StartOutcome,
    out: &dyn UserOutput,
) {
    match outcome {
        StartOutcome::AlreadyRunning { pid } => {
            out.status(&format!(
                "Server already running with PID {}. Use `invsup restart {}` if needed.",
                pid, env
            ));
        }
        StartOutcome::Started {
            pid,
            log_path,
            displaced,
        } => {
            if !displaced.is_empty() {
                out.warning(&format!(
                    "Warning: port {} was in use by PIDs {:?}; stopped them before starting.",
                    resolved.port, displaced
                ));
            }
            out.status(&format!(
                "Starting inventory-service (DB_NAME={}, PORT={})...",
                resolved.database_name, resolved.port
            ));
            out.success(&format!(
                "Started PID {} (logs: {})",
                pid,
                log_path.display()
            ));
        }
    }
}

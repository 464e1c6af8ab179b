use crate::output::UserOutput;
use invsup::{Environment, StopOutcome, Supervisor};

pub fn run_stop(
    supervisor: &mut Supervisor,
    env: Environment,
    port: Option<u16>,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    let resolved = supervisor.resolve(env, port)?;
    let outcome = supervisor.stop(env, resolved.port)?;
    report(env, resolved.port, &outcome, out);
    Ok(())
}

pub(super) fn report(env: Environment, port: u16, outcome: &StopOutcome, out: &dyn UserOutput) {
    match outcome {
        StopOutcome::Stopped { pid, forced } => {
            out.status(&format!("Stopping PID {}...", pid));
            if *forced {
                out.warning(&format!("PID {} did not stop, sent SIGKILL.", pid));
            }
            out.success("Stopped.");
        }
        StopOutcome::ClearedListeners { pids } => {
            out.status(&format!("Found listeners on port {}: {:?}. Killing...", port, pids));
            out.success(&format!("Killed listeners on port {}.", port));
        }
        StopOutcome::NotRunning => {
            out.status(&format!("No running service detected for env '{}'.", env));
        }
    }
}

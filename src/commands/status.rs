use crate::output::UserOutput;
use invsup::{Environment, StatusReport, Supervisor};
use serde_json::json;

pub fn run_status(
    supervisor: &mut Supervisor,
    env: Environment,
    port: Option<u16>,
    json_output: bool,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    let resolved = supervisor.resolve(env, port)?;
    let report = supervisor.status(env, resolved);

    if json_output {
        let payload = json!({
            "environment": env.as_str(),
            "status": report,
        });
        out.status(&serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    match &report {
        StatusReport::Running {
            pid,
            port,
            database_name,
        } => {
            out.status(&format!(
                "Running: PID {} listening on port {} (DB={})",
                pid, port, database_name
            ));
        }
        StatusReport::Untracked { pids, port } => {
            out.status(&format!("Process(es) listening on port {}: {:?}", port, pids));
        }
        StatusReport::NotRunning { port } => {
            out.status(&format!(
                "No process running for env '{}' (port {}).",
                env, port
            ));
        }
    }

    Ok(())
}

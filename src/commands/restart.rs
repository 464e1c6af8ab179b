use super::{start, stop};
use crate::output::UserOutput;
use invsup::{Environment, Supervisor};

pub fn run_restart(
    supervisor: &mut Supervisor,
    env: Environment,
    port: Option<u16>,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    let (resolved, stopped, started) = supervisor.restart(env, port)?;
    stop::report(env, resolved.port, &stopped, out);
    start::report(env, resolved, &started, out);
    Ok(())
}

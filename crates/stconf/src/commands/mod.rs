//! Command dispatch: bridges CLI args -> desired state -> orchestrator -> output.

pub mod apply;
pub mod config_cmd;
pub mod device;
pub mod facts;
pub mod folder;
pub mod util;

use stconf_core::{DesiredState, Orchestrator, RunOptions};

use crate::cli::{Command, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

/// Dispatch a daemon-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Device(args) => device::handle(&args, global).await,
        Command::Folder(args) => folder::handle(&args, global).await,
        Command::Apply(args) => apply::handle(&args, global).await,
        Command::Facts => facts::handle(global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}

/// Reconcile `desired` against the daemon and print the report.
///
/// The batch is validated before any connection is attempted, so a bad
/// file or flag fails the same way with or without a reachable daemon.
pub(crate) async fn reconcile(
    desired: &DesiredState,
    restart: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    desired.validate()?;

    let connection = config::resolve_connection(global)?;
    let options = RunOptions {
        check_mode: global.check,
        restart_if_required: restart,
    };
    let orchestrator = Orchestrator::connect(&connection, options)?;
    let report = orchestrator.run(desired).await?;

    let rendered = output::render_report(
        &report,
        global.output,
        global.diff,
        output::should_color(global.color),
    )?;
    output::print_output(&rendered, global.quiet);

    let failed = report.failures().count();
    if failed > 0 {
        return Err(CliError::PartialFailure {
            failed,
            total: report.outcomes.len(),
        });
    }
    Ok(())
}

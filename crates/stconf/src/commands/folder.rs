//! `stconf folder`: reconcile one shared folder.

use stconf_core::{DesiredState, FolderSpec};

use crate::cli::{FolderArgs, GlobalOpts};
use crate::error::CliError;

use super::util;

pub async fn handle(args: &FolderArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let desired = DesiredState {
        folders: vec![spec(args)],
        ..DesiredState::default()
    };
    super::reconcile(&desired, args.restart, global).await
}

/// `--device` given: share with exactly those. `--no-devices`: share with
/// none. Neither: leave membership as it is.
fn spec(args: &FolderArgs) -> FolderSpec {
    let devices = if args.no_devices {
        Some(Vec::new())
    } else if args.devices.is_empty() {
        None
    } else {
        Some(args.devices.clone())
    };

    FolderSpec {
        id: args.id.clone(),
        path: args.path.as_deref().map(util::expand_tilde),
        label: args.label.clone(),
        devices,
        state: util::target_state(args.state),
    }
}

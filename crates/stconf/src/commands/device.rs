//! `stconf device`: reconcile one remote device.

use stconf_core::{DesiredState, DeviceId, DeviceSpec};

use crate::cli::{DeviceArgs, GlobalOpts};
use crate::error::CliError;

use super::util;

pub async fn handle(args: &DeviceArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let desired = DesiredState {
        devices: vec![spec(args)?],
        ..DesiredState::default()
    };
    super::reconcile(&desired, args.restart, global).await
}

fn spec(args: &DeviceArgs) -> Result<DeviceSpec, CliError> {
    let id: DeviceId = args.id.parse().map_err(|e| CliError::Validation {
        field: "id".into(),
        reason: format!("'{}' is not a device ID: {e}", args.id),
    })?;

    Ok(DeviceSpec {
        id,
        name: args.name.clone(),
        addresses: (!args.addresses.is_empty()).then(|| args.addresses.clone()),
        state: util::target_state(args.state),
    })
}

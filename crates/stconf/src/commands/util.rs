//! Shared helpers for command handlers.

use directories::BaseDirs;

use stconf_core::{DesiredState, TargetState};

use crate::cli::StateArg;

pub fn target_state(state: StateArg) -> TargetState {
    match state {
        StateArg::Present => TargetState::Present,
        StateArg::Pause => TargetState::Pause,
        StateArg::Absent => TargetState::Absent,
    }
}

/// Expand a leading `~` to the home directory of the user running stconf.
///
/// Only `~` and `~/...` are expanded; `~user` is left as written.
pub fn expand_tilde(path: &str) -> String {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => return path.to_owned(),
    };
    match BaseDirs::new() {
        Some(base) => format!("{}{rest}", base.home_dir().display()),
        None => path.to_owned(),
    }
}

/// Expand `~` in every folder path of a batch.
pub fn expand_folder_paths(desired: &mut DesiredState) {
    for folder in &mut desired.folders {
        if let Some(ref mut path) = folder.path {
            *path = expand_tilde(path);
        }
    }
}

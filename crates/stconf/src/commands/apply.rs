//! `stconf apply`: reconcile a whole desired-state file.

use std::io::Read;
use std::path::Path;

use stconf_core::DesiredState;

use crate::cli::{ApplyArgs, GlobalOpts};
use crate::error::CliError;

use super::util;

pub async fn handle(args: &ApplyArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut desired = load(&args.file)?;
    util::expand_folder_paths(&mut desired);
    tracing::info!(
        devices = desired.devices.len(),
        folders = desired.folders.len(),
        "loaded desired state"
    );
    super::reconcile(&desired, args.restart, global).await
}

/// Read a desired-state document from `path`, or stdin when it is `-`.
/// YAML is a superset of JSON, so one parser serves both.
fn load(path: &Path) -> Result<DesiredState, CliError> {
    let shown = path.display().to_string();
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(|e| CliError::DesiredState {
            path: shown.clone(),
            reason: e.to_string(),
        })?
    };
    parse(&raw).map_err(|reason| CliError::DesiredState {
        path: shown,
        reason,
    })
}

fn parse(raw: &str) -> Result<DesiredState, String> {
    if raw.trim().is_empty() {
        return Ok(DesiredState::default());
    }
    serde_yaml::from_str(raw).map_err(|e| e.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use stconf_core::TargetState;

    #[test]
    fn parses_yaml_batches() {
        let desired = parse(
            r"
devices:
  - id: UJZDEGX-DNCF32H-EPF3DHO-DZDOCIE-S2JHTLG-MXGEDNB-73U55XT-PLPFT7K
    name: laptop
folders:
  - id: docs
    path: ~/Documents
    devices: [laptop]
    state: paused
",
        )
        .unwrap();
        assert_eq!(desired.devices[0].name.as_deref(), Some("laptop"));
        assert_eq!(desired.folders[0].state, TargetState::Pause);
    }

    #[test]
    fn parses_json_batches() {
        let desired = parse(r#"{"folders": [{"id": "music", "path": "/srv/music"}]}"#).unwrap();
        assert!(desired.devices.is_empty());
        assert_eq!(desired.folders[0].path.as_deref(), Some("/srv/music"));
    }

    #[test]
    fn empty_input_is_an_empty_batch() {
        assert!(parse("  \n").unwrap().is_empty());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = parse("devices:\n  - id: UJZDEGX-DNCF32H-EPF3DHO-DZDOCIE-S2JHTLG-MXGEDNB-73U55XT-PLPFT7K\n    nmae: typo\n")
            .unwrap_err();
        assert!(err.contains("nmae"), "{err}");
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load(Path::new("/no/such/desired.yaml")).unwrap_err();
        assert!(matches!(err, CliError::DesiredState { ref path, .. } if path == "/no/such/desired.yaml"));
    }

    #[test]
    fn folder_paths_expand_home() {
        let mut desired = parse("folders:\n  - id: docs\n    path: ~/Documents\n").unwrap();
        util::expand_folder_paths(&mut desired);
        assert!(!desired.folders[0].path.as_deref().unwrap().starts_with('~'));
    }
}

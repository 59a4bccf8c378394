// ── Reconciler ──
//
// Pure planning: given one spec and a snapshot, decide what to do. No I/O
// happens here; the orchestrator executes the returned actions.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use strum::Display;
use tracing::trace;

use crate::desired::{DeviceSpec, FolderSpec, TargetState};
use crate::error::CoreError;
use crate::model::{ConfigSnapshot, Device, DeviceId, Entity, EntityKind, Folder};

/// What to do with one entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Action<T: Entity> {
    NoOp,
    Create(T),
    Update(T),
    Delete(T::Id),
}

/// The variant of an [`Action`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ActionKind {
    #[serde(rename = "none")]
    #[strum(to_string = "none")]
    NoOp,
    Create,
    Update,
    Delete,
}

impl<T: Entity> Action<T> {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::NoOp => ActionKind::NoOp,
            Self::Create(_) => ActionKind::Create,
            Self::Update(_) => ActionKind::Update,
            Self::Delete(_) => ActionKind::Delete,
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }

    /// The entity as it will be written, for create and update.
    pub fn target(&self) -> Option<&T> {
        match self {
            Self::Create(t) | Self::Update(t) => Some(t),
            Self::NoOp | Self::Delete(_) => None,
        }
    }
}

/// Plan one device against `snapshot`.
pub fn plan_device(spec: &DeviceSpec, snapshot: &ConfigSnapshot) -> Result<Action<Device>, CoreError> {
    Planner::new(snapshot).device(spec)
}

/// Plan one folder against `snapshot`. Member names resolve against the
/// snapshot only; use [`Planner::with_declared`] to include a batch.
pub fn plan_folder(spec: &FolderSpec, snapshot: &ConfigSnapshot) -> Result<Action<Folder>, CoreError> {
    Planner::new(snapshot).folder(spec)
}

/// Plans specs against one snapshot, resolving folder members by name
/// through the snapshot and through devices declared alongside.
#[derive(Debug)]
pub struct Planner<'a> {
    snapshot: &'a ConfigSnapshot,
    declared: HashMap<&'a str, BTreeSet<&'a DeviceId>>,
    /// Devices the batch names explicitly; their snapshot names are stale.
    renamed: BTreeSet<&'a DeviceId>,
    /// Devices the batch removes; folders cannot be shared with them.
    removed: BTreeSet<&'a DeviceId>,
}

impl<'a> Planner<'a> {
    pub fn new(snapshot: &'a ConfigSnapshot) -> Self {
        Self {
            snapshot,
            declared: HashMap::new(),
            renamed: BTreeSet::new(),
            removed: BTreeSet::new(),
        }
    }

    /// Let folder specs name devices that are declared in the same batch.
    /// Devices the batch removes or renames no longer answer to their
    /// snapshot names.
    #[must_use]
    pub fn with_declared(mut self, devices: &'a [DeviceSpec]) -> Self {
        for spec in devices {
            if spec.state == TargetState::Absent {
                self.removed.insert(&spec.id);
            } else if let Some(name) = &spec.name {
                self.declared.entry(name.as_str()).or_default().insert(&spec.id);
                self.renamed.insert(&spec.id);
            }
        }
        self
    }

    pub fn snapshot(&self) -> &'a ConfigSnapshot {
        self.snapshot
    }

    // ── Devices ──────────────────────────────────────────────────────

    pub fn device(&self, spec: &DeviceSpec) -> Result<Action<Device>, CoreError> {
        let existing = self.snapshot.device(&spec.id);
        let is_local = self.snapshot.local_id() == Some(&spec.id);

        if spec.state == TargetState::Absent {
            if is_local && existing.is_some() {
                return Err(precondition(
                    EntityKind::Device,
                    &spec.id,
                    "refusing to remove the daemon's own device",
                ));
            }
            return Ok(existing.map_or(Action::NoOp, |d| Action::Delete(d.id.clone())));
        }

        let paused = spec.state == TargetState::Pause;
        if paused && is_local {
            return Err(precondition(
                EntityKind::Device,
                &spec.id,
                "the daemon's own device cannot be paused",
            ));
        }

        let Some(current) = existing else {
            if paused {
                return Err(precondition(
                    EntityKind::Device,
                    &spec.id,
                    "cannot pause a device that is not configured",
                ));
            }
            let mut target = Device::new(spec.id.clone());
            merge_device(&mut target, spec);
            return Ok(Action::Create(target));
        };

        let mut target = current.clone();
        merge_device(&mut target, spec);
        target.paused = paused;

        if target.same_settings(current) {
            trace!(device = %spec.id, "device already converged");
            Ok(Action::NoOp)
        } else {
            Ok(Action::Update(target))
        }
    }

    // ── Folders ──────────────────────────────────────────────────────

    pub fn folder(&self, spec: &FolderSpec) -> Result<Action<Folder>, CoreError> {
        let existing = self.snapshot.folder(&spec.id);

        if spec.state == TargetState::Absent {
            return Ok(existing.map_or(Action::NoOp, |f| Action::Delete(f.id.clone())));
        }

        if let Some(path) = &spec.path {
            if let Some(other) = self.snapshot.folder_at(path).filter(|f| f.id != spec.id) {
                return Err(CoreError::validation(
                    "path",
                    format!(
                        "'{path}' is already shared as folder '{}'; folder IDs cannot be changed",
                        other.id
                    ),
                ));
            }
        }

        let peers = spec
            .devices
            .as_deref()
            .map(|entries| self.resolve_peers(entries))
            .transpose()?;
        let local = self.snapshot.local_id();
        let paused = spec.state == TargetState::Pause;

        let Some(current) = existing else {
            if paused {
                return Err(precondition(
                    EntityKind::Folder,
                    &spec.id,
                    "cannot pause a folder that is not configured",
                ));
            }
            let Some(path) = &spec.path else {
                return Err(CoreError::validation(
                    "path",
                    format!("required when creating folder '{}'", spec.id),
                ));
            };
            let mut target = Folder::new(&spec.id, path);
            if let Some(label) = &spec.label {
                target.label.clone_from(label);
            }
            target.set_members(local, &peers.unwrap_or_default());
            return Ok(Action::Create(target));
        };

        let mut target = current.clone();
        if let Some(path) = &spec.path {
            target.path.clone_from(path);
        }
        if let Some(label) = &spec.label {
            target.label.clone_from(label);
        }
        if let Some(peers) = peers {
            if peers != current.peers(local) {
                target.set_members(local, &peers);
            }
        }
        target.paused = paused;

        if target.same_settings(current) {
            trace!(folder = %spec.id, "folder already converged");
            Ok(Action::NoOp)
        } else {
            Ok(Action::Update(target))
        }
    }

    /// Resolve folder member entries (IDs or names) to peer IDs, dropping
    /// the local device.
    fn resolve_peers(&self, entries: &[String]) -> Result<BTreeSet<DeviceId>, CoreError> {
        let local = self.snapshot.local_id();
        let mut peers = BTreeSet::new();
        for entry in entries {
            let id = self.resolve_member(entry)?;
            if Some(&id) != local {
                peers.insert(id);
            }
        }
        Ok(peers)
    }

    fn resolve_member(&self, entry: &str) -> Result<DeviceId, CoreError> {
        if let Ok(id) = entry.parse::<DeviceId>() {
            if self.removed.contains(&id) {
                return Err(removed_member(entry));
            }
            return Ok(id);
        }

        let candidates: BTreeSet<&DeviceId> = match self.declared.get(entry) {
            Some(ids) => ids.clone(),
            None => {
                let named: BTreeSet<&DeviceId> = self
                    .snapshot
                    .devices_named(entry)
                    .map(|d| &d.id)
                    .filter(|id| !self.renamed.contains(id))
                    .collect();
                if !named.is_empty() && named.iter().all(|id| self.removed.contains(id)) {
                    return Err(removed_member(entry));
                }
                named
                    .into_iter()
                    .filter(|id| !self.removed.contains(id))
                    .collect()
            }
        };

        let mut iter = candidates.into_iter();
        match (iter.next(), iter.next()) {
            (Some(id), None) => Ok(id.clone()),
            (None, _) => Err(CoreError::validation(
                "devices",
                format!("'{entry}' is neither a device ID nor the name of a known device"),
            )),
            (Some(_), Some(_)) => Err(CoreError::validation(
                "devices",
                format!("device name '{entry}' is ambiguous; use the device ID"),
            )),
        }
    }
}

fn merge_device(target: &mut Device, spec: &DeviceSpec) {
    if let Some(name) = &spec.name {
        target.name.clone_from(name);
    }
    if let Some(addresses) = &spec.addresses {
        target.addresses.clone_from(addresses);
    }
}

fn removed_member(entry: &str) -> CoreError {
    CoreError::validation(
        "devices",
        format!("'{entry}' is a device removed in the same batch"),
    )
}

fn precondition(kind: EntityKind, id: &impl std::fmt::Display, reason: &str) -> CoreError {
    CoreError::Precondition {
        kind,
        id: id.to_string(),
        reason: reason.to_owned(),
    }
}

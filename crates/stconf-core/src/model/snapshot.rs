use indexmap::IndexMap;
use serde::Serialize;

use super::{Device, DeviceId, Entity, EntityState, Folder};
use crate::reconcile::Action;

/// A point-in-time view of the daemon's devices and folders.
///
/// Snapshots are immutable values: [`ConfigSnapshot::with_applied`]
/// returns a new snapshot rather than editing this one, so a run can plan
/// every entity against the state it fetched at the start.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfigSnapshot {
    pub(crate) local_id: Option<DeviceId>,
    pub(crate) devices: IndexMap<DeviceId, Device>,
    pub(crate) folders: IndexMap<String, Folder>,
}

impl ConfigSnapshot {
    pub fn new(
        local_id: Option<DeviceId>,
        devices: impl IntoIterator<Item = Device>,
        folders: impl IntoIterator<Item = Folder>,
    ) -> Self {
        Self {
            local_id,
            devices: devices.into_iter().map(|d| (d.id.clone(), d)).collect(),
            folders: folders.into_iter().map(|f| (f.id.clone(), f)).collect(),
        }
    }

    /// The daemon's own device ID, if it was fetched.
    pub fn local_id(&self) -> Option<&DeviceId> {
        self.local_id.as_ref()
    }

    pub fn device(&self, id: &DeviceId) -> Option<&Device> {
        self.devices.get(id)
    }

    pub fn folder(&self, id: &str) -> Option<&Folder> {
        self.folders.get(id)
    }

    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    pub fn folders(&self) -> impl Iterator<Item = &Folder> {
        self.folders.values()
    }

    /// Devices carrying `name`. More than one is possible; names are not
    /// unique on the daemon.
    pub fn devices_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Device> {
        self.devices.values().filter(move |d| d.name == name)
    }

    /// The folder already syncing `path`, if any.
    pub fn folder_at(&self, path: &str) -> Option<&Folder> {
        self.folders.values().find(|f| f.path == path)
    }

    /// Lifecycle state of one entity.
    pub fn state_of<T: Entity>(&self, id: &T::Id) -> EntityState {
        EntityState::of(T::table(self).get(id))
    }

    /// The snapshot as it would be after `action` succeeds.
    pub fn with_applied<T: Entity>(&self, action: &Action<T>) -> Self {
        let mut next = self.clone();
        match action {
            Action::NoOp => {}
            Action::Create(entity) | Action::Update(entity) => {
                T::table_mut(&mut next).insert(entity.id().clone(), entity.clone());
            }
            Action::Delete(id) => {
                T::table_mut(&mut next).shift_remove(id);
            }
        }
        next
    }
}

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use super::{ConfigSnapshot, DeviceId, Entity, EntityKind};

/// One device a folder is shared with.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FolderMember {
    pub id: DeviceId,
    #[serde(skip)]
    pub unmanaged: Map<String, Value>,
}

impl FolderMember {
    pub fn new(id: DeviceId) -> Self {
        Self {
            id,
            unmanaged: Map::new(),
        }
    }
}

/// A shared folder as configured on the daemon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Folder {
    pub id: String,
    pub label: String,
    pub path: String,
    pub devices: Vec<FolderMember>,
    pub paused: bool,
    #[serde(skip)]
    pub unmanaged: Map<String, Value>,
}

impl Folder {
    /// A folder with the daemon's creation defaults: labelled by its ID,
    /// shared with nobody, not paused.
    pub fn new(id: impl Into<String>, path: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            path: path.into(),
            devices: Vec::new(),
            paused: false,
            unmanaged: Map::new(),
        }
    }

    /// Member device IDs, excluding the local device.
    pub fn peers(&self, local: Option<&DeviceId>) -> BTreeSet<DeviceId> {
        self.devices
            .iter()
            .map(|m| &m.id)
            .filter(|id| Some(*id) != local)
            .cloned()
            .collect()
    }

    /// Replace the member list with `local` (when known) followed by
    /// `peers`, keeping the unmanaged settings of members that stay.
    pub fn set_members(&mut self, local: Option<&DeviceId>, peers: &BTreeSet<DeviceId>) {
        let mut previous = std::mem::take(&mut self.devices);
        let mut take = |id: &DeviceId| match previous.iter().position(|m| &m.id == id) {
            Some(idx) => previous.swap_remove(idx),
            None => FolderMember::new(id.clone()),
        };

        let mut members: Vec<FolderMember> = local.map(&mut take).into_iter().collect();
        members.extend(peers.iter().filter(|id| Some(*id) != local).map(take));
        self.devices = members;
    }

    /// Whether the managed attributes match. Membership compares as a set.
    pub fn same_settings(&self, other: &Self) -> bool {
        let members = |f: &Self| f.devices.iter().map(|m| m.id.clone()).collect::<BTreeSet<_>>();
        self.id == other.id
            && self.label == other.label
            && self.path == other.path
            && self.paused == other.paused
            && members(self) == members(other)
    }
}

impl Entity for Folder {
    const KIND: EntityKind = EntityKind::Folder;
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }

    fn paused(&self) -> bool {
        self.paused
    }

    fn table(snapshot: &ConfigSnapshot) -> &IndexMap<String, Self> {
        &snapshot.folders
    }

    fn table_mut(snapshot: &mut ConfigSnapshot) -> &mut IndexMap<String, Self> {
        &mut snapshot.folders
    }
}

// ── Domain model ──
//
// Reconciler-facing representations of daemon configuration. Wire types
// from `stconf-api` are converted at the boundary (see `convert`), so the
// rest of the crate works with validated IDs and never sees JSON.

mod device;
mod device_id;
mod folder;
mod snapshot;

use std::fmt;
use std::hash::Hash;

use indexmap::IndexMap;
use serde::Serialize;
use strum::{Display, EnumString};

pub use device::Device;
pub use device_id::{DeviceId, DeviceIdError};
pub use folder::{Folder, FolderMember};
pub use snapshot::ConfigSnapshot;

/// The two kinds of entity the reconciler manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
    Device,
    Folder,
}

/// Observed lifecycle state of one entity.
///
/// `Absent -> PresentActive | PresentPaused` on create, transitions
/// between the two present states on update, back to `Absent` on delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityState {
    Absent,
    PresentActive,
    PresentPaused,
}

impl EntityState {
    pub fn of<T: Entity>(entity: Option<&T>) -> Self {
        match entity {
            None => Self::Absent,
            Some(e) if e.paused() => Self::PresentPaused,
            Some(_) => Self::PresentActive,
        }
    }
}

/// Shared surface of [`Device`] and [`Folder`], so snapshot updates and
/// outcome reporting can be written once.
pub trait Entity: Clone + fmt::Debug + PartialEq + Serialize {
    const KIND: EntityKind;
    type Id: Clone + Eq + Hash + fmt::Display + fmt::Debug + Serialize;

    fn id(&self) -> &Self::Id;
    fn paused(&self) -> bool;

    #[doc(hidden)]
    fn table(snapshot: &ConfigSnapshot) -> &IndexMap<Self::Id, Self>;
    #[doc(hidden)]
    fn table_mut(snapshot: &mut ConfigSnapshot) -> &mut IndexMap<Self::Id, Self>;
}

/// Either entity, for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EntityView {
    Device(Device),
    Folder(Folder),
}

impl From<Device> for EntityView {
    fn from(device: Device) -> Self {
        Self::Device(device)
    }
}

impl From<Folder> for EntityView {
    fn from(folder: Folder) -> Self {
        Self::Folder(folder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_displays_lowercase() {
        assert_eq!(EntityKind::Device.to_string(), "device");
        assert_eq!(EntityKind::Folder.to_string(), "folder");
    }

    #[test]
    fn state_displays_snake_case() {
        assert_eq!(EntityState::PresentPaused.to_string(), "present_paused");
        assert_eq!(EntityState::of::<Device>(None), EntityState::Absent);
    }
}

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use super::{ConfigSnapshot, DeviceId, Entity, EntityKind};

/// A remote (or the local) device as configured on the daemon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    /// Connection addresses. Order is significant to the daemon.
    pub addresses: Vec<String>,
    pub paused: bool,
    /// Daemon-side settings this tool does not manage, written back as-is.
    #[serde(skip)]
    pub unmanaged: Map<String, Value>,
}

impl Device {
    /// A device with the daemon's creation defaults: named by its short
    /// ID, dynamic address discovery, not paused.
    pub fn new(id: DeviceId) -> Self {
        Self {
            name: id.short().to_owned(),
            id,
            addresses: vec!["dynamic".to_owned()],
            paused: false,
            unmanaged: Map::new(),
        }
    }

    /// Whether the managed attributes match. Unmanaged settings are ignored.
    pub fn same_settings(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.addresses == other.addresses
            && self.paused == other.paused
    }
}

impl Entity for Device {
    const KIND: EntityKind = EntityKind::Device;
    type Id = DeviceId;

    fn id(&self) -> &DeviceId {
        &self.id
    }

    fn paused(&self) -> bool {
        self.paused
    }

    fn table(snapshot: &ConfigSnapshot) -> &IndexMap<DeviceId, Self> {
        &snapshot.devices
    }

    fn table_mut(snapshot: &mut ConfigSnapshot) -> &mut IndexMap<DeviceId, Self> {
        &mut snapshot.devices
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ID: &str = "UJZDEGX-DNCF32H-EPF3DHO-DZDOCIE-S2JHTLG-MXGEDNB-73U55XT-PLPFT7K";

    #[test]
    fn new_uses_daemon_defaults() {
        let device = Device::new(ID.parse().unwrap());
        assert_eq!(device.name, "UJZDEGX");
        assert_eq!(device.addresses, vec!["dynamic".to_string()]);
        assert!(!device.paused);
    }

    #[test]
    fn same_settings_ignores_unmanaged() {
        let a = Device::new(ID.parse().unwrap());
        let mut b = a.clone();
        b.unmanaged
            .insert("compression".into(), Value::String("always".into()));
        assert!(a.same_settings(&b));

        b.addresses = vec!["tcp://10.0.0.2:22000".into(), "dynamic".into()];
        assert!(!a.same_settings(&b));
    }

    #[test]
    fn address_order_is_significant() {
        let mut a = Device::new(ID.parse().unwrap());
        a.addresses = vec!["dynamic".into(), "tcp://10.0.0.2:22000".into()];
        let mut b = a.clone();
        b.addresses.reverse();
        assert!(!a.same_settings(&b));
    }
}

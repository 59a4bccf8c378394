// stconf-api: Async Rust client for the Syncthing REST configuration API

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod system;
pub mod transport;

pub use client::SyncthingClient;
pub use config::ApplySignal;
pub use error::Error;
pub use models::{
    Configuration, DeviceConfiguration, FolderConfiguration, FolderDeviceConfiguration,
    SystemStatus,
};
pub use transport::{TlsMode, TransportConfig};

// stconf-core: Reconciliation engine between stconf-api and the CLI.

pub mod config;
pub mod convert;
pub mod desired;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod reconcile;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ConnectionConfig, TlsVerification};
pub use desired::{DesiredState, DeviceSpec, FolderSpec, TargetState};
pub use error::CoreError;
pub use orchestrator::{EntityDiff, EntityOutcome, Orchestrator, RunOptions, RunReport};
pub use reconcile::{Action, ActionKind, Planner, plan_device, plan_folder};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    ConfigSnapshot, Device, DeviceId, DeviceIdError, Entity, EntityKind, EntityState, EntityView,
    Folder, FolderMember,
};

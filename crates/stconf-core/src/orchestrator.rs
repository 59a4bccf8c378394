// ── Orchestrator ──
//
// One reconciliation run: validate the batch, fetch a snapshot, plan every
// spec against it, execute the writes, and report per entity. Requests are
// issued one at a time; nothing runs concurrently against the daemon.

use serde::Serialize;
use tracing::{debug, info, warn};

use stconf_api::{DeviceConfiguration, FolderConfiguration, SyncthingClient};

use crate::config::ConnectionConfig;
use crate::desired::DesiredState;
use crate::error::CoreError;
use crate::model::{ConfigSnapshot, Device, Entity, EntityKind, EntityState, EntityView, Folder};
use crate::reconcile::{Action, ActionKind, Planner};

/// Knobs for one run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Plan and report without writing.
    pub check_mode: bool,
    /// Restart the daemon once at the end if any write asked for it.
    pub restart_if_required: bool,
}

/// Before and after views of one changed entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityDiff {
    pub before: Option<EntityView>,
    pub after: Option<EntityView>,
}

/// Result for one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityOutcome {
    pub kind: EntityKind,
    pub id: String,
    pub action: ActionKind,
    pub changed: bool,
    /// Lifecycle state after the run (or as it would be, in check mode).
    pub state: EntityState,
    /// The entity as it now stands, absent once deleted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<EntityView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<EntityDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EntityOutcome {
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Result of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub changed: bool,
    pub check_mode: bool,
    pub restart_required: bool,
    pub restarted: bool,
    pub outcomes: Vec<EntityOutcome>,
}

impl RunReport {
    pub fn failures(&self) -> impl Iterator<Item = &EntityOutcome> {
        self.outcomes.iter().filter(|o| o.failed())
    }

    pub fn failed(&self) -> bool {
        self.failures().next().is_some()
    }
}

/// Drives reconciliation runs against one daemon.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    client: SyncthingClient,
    options: RunOptions,
}

impl Orchestrator {
    pub fn new(client: SyncthingClient, options: RunOptions) -> Self {
        Self { client, options }
    }

    pub fn connect(config: &ConnectionConfig, options: RunOptions) -> Result<Self, CoreError> {
        Ok(Self::new(config.client()?, options))
    }

    pub fn options(&self) -> RunOptions {
        self.options
    }

    /// Fetch the daemon's configuration and local device ID.
    pub async fn snapshot(&self) -> Result<ConfigSnapshot, CoreError> {
        let config = self.client.config().await?;
        let status = self.client.system_status().await?;
        let snapshot = ConfigSnapshot::from_api(config, Some(&status))?;
        debug!(
            devices = snapshot.devices().count(),
            folders = snapshot.folders().count(),
            "fetched daemon configuration"
        );
        Ok(snapshot)
    }

    /// Reconcile a batch.
    ///
    /// Validation and fetch errors abort the run before any write. Errors
    /// planning or writing one entity are recorded on its outcome and the
    /// run continues with the next.
    pub async fn run(&self, desired: &DesiredState) -> Result<RunReport, CoreError> {
        desired.validate()?;
        let snapshot = self.snapshot().await?;
        let planner = Planner::new(&snapshot).with_declared(&desired.devices);

        let mut report = RunReport {
            check_mode: self.options.check_mode,
            ..RunReport::default()
        };

        for spec in &desired.devices {
            let planned = planner.device(spec);
            self.settle(&snapshot, &spec.id, planned, &mut report).await;
        }
        for spec in &desired.folders {
            let planned = planner.folder(spec);
            self.settle(&snapshot, &spec.id, planned, &mut report).await;
        }

        report.changed = report.outcomes.iter().any(|o| o.changed);

        if report.restart_required && self.options.restart_if_required {
            info!("restarting daemon to apply configuration");
            match self.client.restart().await {
                Ok(()) => report.restarted = true,
                Err(e) => warn!(error = %e, "restart request failed; restart the daemon manually"),
            }
        } else if report.restart_required {
            info!("daemon reports a restart is required to apply the changes");
        }

        Ok(report)
    }

    /// Execute one planned action and record its outcome.
    async fn settle<T>(
        &self,
        snapshot: &ConfigSnapshot,
        key: &T::Id,
        planned: Result<Action<T>, CoreError>,
        report: &mut RunReport,
    ) where
        T: WriteAction + Into<EntityView>,
    {
        let id = key.to_string();
        let before = T::table(snapshot).get(key).cloned();

        let action = match planned {
            Ok(action) => action,
            Err(err) => {
                warn!(kind = %T::KIND, %id, error = %err, "cannot plan");
                report.outcomes.push(unchanged(&id, ActionKind::NoOp, before, &err));
                return;
            }
        };
        let kind = action.kind();

        if action.is_noop() {
            debug!(kind = %T::KIND, %id, "unchanged");
            report.outcomes.push(EntityOutcome {
                kind: T::KIND,
                id,
                action: kind,
                changed: false,
                state: EntityState::of(before.as_ref()),
                entity: before.map(Into::into),
                diff: None,
                error: None,
            });
            return;
        }

        let after = action.target().cloned();
        let mut signal_error = None;
        if self.options.check_mode {
            info!(kind = %T::KIND, %id, action = %kind, "would apply (check mode)");
        } else {
            match T::write(&self.client, &action).await {
                Ok(true) => {
                    info!(kind = %T::KIND, %id, action = %kind, "applied");
                    match self.client.signal_apply().await {
                        Ok(signal) => report.restart_required |= signal.restart_required,
                        Err(e) => {
                            let err = CoreError::apply(T::KIND, &id, "signal", &CoreError::from(e));
                            warn!(error = %err, "write accepted but apply signal failed");
                            signal_error = Some(err.to_string());
                        }
                    }
                }
                Ok(false) => {
                    debug!(kind = %T::KIND, %id, "already gone on the daemon");
                    report.outcomes.push(EntityOutcome {
                        kind: T::KIND,
                        id,
                        action: kind,
                        changed: false,
                        state: EntityState::Absent,
                        entity: None,
                        diff: None,
                        error: None,
                    });
                    return;
                }
                Err(e) => {
                    let err = CoreError::apply(T::KIND, &id, &kind.to_string(), &CoreError::from(e));
                    warn!(error = %err, "write failed");
                    report.outcomes.push(unchanged(&id, kind, before, &err));
                    return;
                }
            }
        }

        report.outcomes.push(EntityOutcome {
            kind: T::KIND,
            id,
            action: kind,
            changed: true,
            state: EntityState::of(after.as_ref()),
            entity: after.clone().map(Into::into),
            diff: Some(EntityDiff {
                before: before.map(Into::into),
                after: after.map(Into::into),
            }),
            error: signal_error,
        });
    }
}

fn unchanged<T>(id: &str, action: ActionKind, before: Option<T>, err: &CoreError) -> EntityOutcome
where
    T: Entity + Into<EntityView>,
{
    EntityOutcome {
        kind: T::KIND,
        id: id.to_owned(),
        action,
        changed: false,
        state: EntityState::of(before.as_ref()),
        entity: before.map(Into::into),
        diff: None,
        error: Some(err.to_string()),
    }
}

// ── Writes ───────────────────────────────────────────────────────────

/// Maps an action onto the client's per-kind endpoints. `Ok(false)` means
/// a delete found nothing to remove.
trait WriteAction: Entity {
    async fn write(
        client: &SyncthingClient,
        action: &Action<Self>,
    ) -> Result<bool, stconf_api::Error>;
}

impl WriteAction for Device {
    async fn write(
        client: &SyncthingClient,
        action: &Action<Self>,
    ) -> Result<bool, stconf_api::Error> {
        match action {
            Action::NoOp => Ok(false),
            Action::Create(d) | Action::Update(d) => client
                .put_device(&DeviceConfiguration::from(d))
                .await
                .map(|()| true),
            Action::Delete(id) => client.delete_device(id.as_str()).await,
        }
    }
}

impl WriteAction for Folder {
    async fn write(
        client: &SyncthingClient,
        action: &Action<Self>,
    ) -> Result<bool, stconf_api::Error> {
        match action {
            Action::NoOp => Ok(false),
            Action::Create(f) | Action::Update(f) => client
                .put_folder(&FolderConfiguration::from(f))
                .await
                .map(|()| true),
            Action::Delete(id) => client.delete_folder(id).await,
        }
    }
}

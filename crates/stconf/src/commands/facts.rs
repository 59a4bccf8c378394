//! `stconf facts`: what stconf knows about the daemon it would act on.

use std::fmt::Write as _;

use serde::Serialize;
use tabled::Tabled;

use stconf_core::{ConfigSnapshot, ConnectionConfig, Device, Folder, Orchestrator, RunOptions};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

/// Connection facts plus the current device and folder inventory.
/// The API key is never echoed.
#[derive(Debug, Serialize)]
pub struct Facts {
    pub host: String,
    pub local_id: Option<String>,
    pub validate_certs: bool,
    pub api_key: &'static str,
    pub devices: Vec<Device>,
    pub folders: Vec<Folder>,
}

impl Facts {
    pub fn gather(connection: &ConnectionConfig, snapshot: &ConfigSnapshot) -> Self {
        Self {
            host: connection.host.to_string(),
            local_id: snapshot.local_id().map(ToString::to_string),
            validate_certs: connection.tls.validates_certs(),
            api_key: "****",
            devices: snapshot.devices().cloned().collect(),
            folders: snapshot.folders().cloned().collect(),
        }
    }
}

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let connection = config::resolve_connection(global)?;
    let orchestrator = Orchestrator::connect(&connection, RunOptions::default())?;
    let snapshot = orchestrator.snapshot().await?;
    let facts = Facts::gather(&connection, &snapshot);

    let out = render(&facts, global.output)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "ADDRESSES")]
    addresses: String,
    #[tabled(rename = "PAUSED")]
    paused: bool,
}

#[derive(Tabled)]
struct FolderRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "LABEL")]
    label: String,
    #[tabled(rename = "PATH")]
    path: String,
    #[tabled(rename = "DEVICES")]
    devices: usize,
    #[tabled(rename = "PAUSED")]
    paused: bool,
}

fn render(facts: &Facts, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => {
            let mut out = String::new();
            let _ = writeln!(out, "Host:           {}", facts.host);
            let _ = writeln!(
                out,
                "Local device:   {}",
                facts.local_id.as_deref().unwrap_or("-")
            );
            let _ = writeln!(out, "Validate certs: {}", facts.validate_certs);
            let _ = writeln!(out, "API key:        {}", facts.api_key);

            let devices: Vec<DeviceRow> = facts
                .devices
                .iter()
                .map(|d| DeviceRow {
                    id: d.id.to_string(),
                    name: d.name.clone(),
                    addresses: d.addresses.join(", "),
                    paused: d.paused,
                })
                .collect();
            let folders: Vec<FolderRow> = facts
                .folders
                .iter()
                .map(|f| FolderRow {
                    id: f.id.clone(),
                    label: f.label.clone(),
                    path: f.path.clone(),
                    devices: f.devices.len(),
                    paused: f.paused,
                })
                .collect();

            let _ = write!(
                out,
                "\nDevices\n{}\n\nFolders\n{}",
                output::render_table(&devices),
                output::render_table(&folders)
            );
            Ok(out)
        }
        OutputFormat::Json => output::render_json(facts, false),
        OutputFormat::JsonCompact => output::render_json(facts, true),
        OutputFormat::Yaml => output::render_yaml(facts),
        OutputFormat::Plain => Ok(facts.local_id.clone().unwrap_or_default()),
    }
}

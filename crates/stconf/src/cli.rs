//! Clap derive structures for the `stconf` CLI.
//!
//! Defines the command tree, global flags, and shared value enums. Kept
//! free of workspace types so `build.rs` can include it for man pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// stconf -- declarative devices and folders for Syncthing
#[derive(Debug, Parser)]
#[command(
    name = "stconf",
    version,
    about = "Reconcile Syncthing devices and folders to a declared state",
    long_about = "Declare the devices and shared folders a Syncthing daemon should have,\n\
        and stconf computes and applies the minimal set of REST API changes.\n\n\
        The daemon address and API key are read from the daemon's own config.xml\n\
        unless given with --host / --api-key or a profile.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Profile to use
    #[arg(long, short = 'p', env = "STCONF_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Daemon GUI/REST address, e.g. https://127.0.0.1:8384 (overrides profile)
    #[arg(long, short = 'H', env = "STCONF_HOST", global = true)]
    pub host: Option<String>,

    /// REST API key (overrides profile)
    #[arg(long, env = "STCONF_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Path of the daemon's config.xml for host/API key discovery
    #[arg(long, env = "STCONF_DAEMON_CONFIG", global = true, value_name = "PATH")]
    pub daemon_config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "STCONF_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept the daemon's self-signed TLS certificate
    #[arg(long, short = 'k', env = "STCONF_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds [default: 30]
    #[arg(long, env = "STCONF_TIMEOUT", global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Report what would change without writing anything
    #[arg(long, global = true)]
    pub check: bool,

    /// Show a before/after diff for every changed entity
    #[arg(long, global = true)]
    pub diff: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one entity per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

/// Requested state of a device or folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StateArg {
    /// Exists and is active
    Present,
    /// Exists and is paused
    #[value(alias = "paused")]
    Pause,
    /// Does not exist
    Absent,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add, update, pause, or remove a remote device
    #[command(alias = "dev", alias = "d")]
    Device(DeviceArgs),

    /// Add, update, pause, or remove a shared folder
    #[command(alias = "f")]
    Folder(FolderArgs),

    /// Reconcile every device and folder declared in a YAML/JSON file
    Apply(ApplyArgs),

    /// Show the daemon's address, local device ID, devices, and folders
    Facts,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Entity commands ──────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DeviceArgs {
    /// Device ID (52 or 56 base32 characters, dashes optional)
    #[arg(long)]
    pub id: String,

    /// Display name [default on create: first group of the ID]
    #[arg(long)]
    pub name: Option<String>,

    /// Connection address, repeatable and ordered (e.g. tcp://10.0.0.2:22000)
    /// [default on create: dynamic]
    #[arg(long = "address", value_name = "ADDR")]
    pub addresses: Vec<String>,

    /// Requested state
    #[arg(long, value_enum, default_value = "present")]
    pub state: StateArg,

    /// Restart the daemon afterwards if the change requires it
    #[arg(long)]
    pub restart: bool,
}

#[derive(Debug, Args)]
pub struct FolderArgs {
    /// Folder ID
    #[arg(long)]
    pub id: String,

    /// Folder path on the daemon's host (required on create)
    #[arg(long)]
    pub path: Option<String>,

    /// Folder label [default on create: the folder ID]
    #[arg(long)]
    pub label: Option<String>,

    /// Device to share with, by ID or name; repeatable
    #[arg(long = "device", value_name = "DEVICE", conflicts_with = "no_devices")]
    pub devices: Vec<String>,

    /// Share the folder with no remote device
    #[arg(long)]
    pub no_devices: bool,

    /// Requested state
    #[arg(long, value_enum, default_value = "present")]
    pub state: StateArg,

    /// Restart the daemon afterwards if the change requires it
    #[arg(long)]
    pub restart: bool,
}

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Desired-state file (YAML or JSON); `-` reads stdin
    pub file: PathBuf,

    /// Restart the daemon once at the end if any change requires it
    #[arg(long)]
    pub restart: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// Display the current configuration (secrets masked)
    Show,

    /// Create or update a profile
    SetProfile(SetProfileArgs),
}

#[derive(Debug, Args)]
pub struct SetProfileArgs {
    /// Profile name
    pub name: String,

    /// Daemon address
    #[arg(long = "profile-host", value_name = "URL")]
    pub host: Option<String>,

    /// API key, stored in plaintext (prefer --api-key-env)
    #[arg(long = "profile-api-key", value_name = "KEY")]
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    #[arg(long, value_name = "VAR")]
    pub api_key_env: Option<String>,

    /// Path of the daemon's config.xml
    #[arg(long = "profile-daemon-config", value_name = "PATH")]
    pub daemon_config: Option<PathBuf>,

    /// Custom CA certificate
    #[arg(long, value_name = "PATH")]
    pub ca_cert: Option<PathBuf>,

    /// Accept self-signed certificates for this profile
    #[arg(long = "profile-insecure", value_name = "BOOL")]
    pub insecure: Option<bool>,

    /// Request timeout in seconds for this profile
    #[arg(long = "profile-timeout", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Make this the default profile
    #[arg(long)]
    pub default: bool,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

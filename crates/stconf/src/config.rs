//! CLI side of configuration: picks the active profile and layers the
//! global flags over it before handing off to `stconf_config`.
//!
//! Precedence is flag > env var > profile > daemon `config.xml`.

use stconf_config::{Config, ConfigError, Profile};
use stconf_core::ConnectionConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use stconf_config::config_path;

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// The profile selected by `--profile` (or the default one), with every
/// connection flag the user passed written over it.
pub fn effective_profile(global: &GlobalOpts, config: &Config) -> Result<Profile, CliError> {
    let (_, mut profile) = config
        .profile(global.profile.as_deref())
        .map_err(|err| match err {
            ConfigError::UnknownProfile(name) => CliError::ProfileNotFound {
                name,
                available: available_profiles(config),
            },
            other => other.into(),
        })?;

    if let Some(ref host) = global.host {
        profile.host = Some(host.clone());
    }
    if let Some(ref key) = global.api_key {
        profile.api_key = Some(key.clone());
        profile.api_key_env = None;
    }
    if let Some(ref path) = global.daemon_config {
        profile.daemon_config = Some(path.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    Ok(profile)
}

/// Build the `ConnectionConfig` for a daemon-bound command.
///
/// This is the single boundary where CLI config types cross into core types.
pub fn resolve_connection(global: &GlobalOpts) -> Result<ConnectionConfig, CliError> {
    let config = stconf_config::load_config()?;
    let profile = effective_profile(global, &config)?;
    tracing::debug!(
        profile = %active_profile_name(global, &config),
        explicit_host = profile.host.is_some(),
        "resolving daemon connection"
    );
    Ok(stconf_config::profile_to_connection_config(
        &profile,
        &config.defaults,
    )?)
}

fn available_profiles(config: &Config) -> String {
    let mut names: Vec<&str> = config.profiles.keys().map(String::as_str).collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort_unstable();
    names.join(", ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["stconf"];
        argv.extend_from_slice(args);
        argv.push("facts");
        Cli::try_parse_from(argv).unwrap().global
    }

    fn config_with_nas() -> Config {
        let mut config = Config::default();
        config.profiles.insert(
            "nas".into(),
            Profile {
                host: Some("https://nas.lan:8384".into()),
                api_key_env: Some("NAS_KEY".into()),
                timeout: Some(5),
                ..Profile::default()
            },
        );
        config
    }

    #[test]
    fn flags_override_profile() {
        let config = config_with_nas();
        let profile = effective_profile(
            &global(&["-p", "nas", "--host", "http://127.0.0.1:9999", "--api-key", "k"]),
            &config,
        )
        .unwrap();
        assert_eq!(profile.host.as_deref(), Some("http://127.0.0.1:9999"));
        assert_eq!(profile.api_key.as_deref(), Some("k"));
        assert!(profile.api_key_env.is_none());
        assert_eq!(profile.timeout, Some(5));
    }

    #[test]
    fn unknown_profile_lists_alternatives() {
        let config = config_with_nas();
        let err = effective_profile(&global(&["-p", "office"]), &config).unwrap_err();
        match err {
            CliError::ProfileNotFound { name, available } => {
                assert_eq!(name, "office");
                assert_eq!(available, "nas");
            }
            other => panic!("expected ProfileNotFound, got {other:?}"),
        }
    }
}

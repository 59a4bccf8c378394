//! Config subcommand handlers.

use stconf_config::{Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat, SetProfileArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = redacted(stconf_config::load_config()?);
            let out = match global.output {
                OutputFormat::Json => output::render_json(&cfg, false)?,
                OutputFormat::JsonCompact => output::render_json(&cfg, true)?,
                OutputFormat::Yaml => output::render_yaml(&cfg)?,
                OutputFormat::Table | OutputFormat::Plain => toml::to_string_pretty(&cfg)
                    .map_err(|e| CliError::Render(e.to_string()))?,
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::SetProfile(args) => {
            let mut cfg = stconf_config::load_config()?;
            let name = args.name.clone();
            let profile = cfg.profiles.entry(name.clone()).or_default();
            merge_profile(profile, profile_update(&args));
            if args.default {
                cfg.default_profile = Some(name.clone());
            }
            let path = stconf_config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Profile '{name}' saved to {}", path.display());
            }
            Ok(())
        }
    }
}

/// Replace stored secrets with a mask before printing.
fn redacted(mut cfg: Config) -> Config {
    for profile in cfg.profiles.values_mut() {
        if profile.api_key.is_some() {
            profile.api_key = Some("****".into());
        }
    }
    cfg
}

/// Copy every field the user passed into `profile`, leaving the rest.
fn merge_profile(profile: &mut Profile, update: Profile) {
    if update.host.is_some() {
        profile.host = update.host;
    }
    if update.api_key.is_some() {
        profile.api_key = update.api_key;
    }
    if update.api_key_env.is_some() {
        profile.api_key_env = update.api_key_env;
    }
    if update.daemon_config.is_some() {
        profile.daemon_config = update.daemon_config;
    }
    if update.ca_cert.is_some() {
        profile.ca_cert = update.ca_cert;
    }
    if update.insecure.is_some() {
        profile.insecure = update.insecure;
    }
    if update.timeout.is_some() {
        profile.timeout = update.timeout;
    }
}

fn profile_update(args: &SetProfileArgs) -> Profile {
    Profile {
        host: args.host.clone(),
        api_key: args.api_key.clone(),
        api_key_env: args.api_key_env.clone(),
        daemon_config: args.daemon_config.clone(),
        ca_cert: args.ca_cert.clone(),
        insecure: args.insecure,
        timeout: args.timeout,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_unset_fields() {
        let mut profile = Profile {
            host: Some("http://old:8384".into()),
            api_key: Some("k".into()),
            timeout: Some(10),
            ..Profile::default()
        };
        merge_profile(
            &mut profile,
            Profile {
                host: Some("https://new:8384".into()),
                insecure: Some(true),
                ..Profile::default()
            },
        );
        assert_eq!(profile.host.as_deref(), Some("https://new:8384"));
        assert_eq!(profile.api_key.as_deref(), Some("k"));
        assert_eq!(profile.insecure, Some(true));
        assert_eq!(profile.timeout, Some(10));
    }

    #[test]
    fn show_masks_api_keys() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "nas".into(),
            Profile {
                api_key: Some("s3cret".into()),
                api_key_env: Some("NAS_KEY".into()),
                ..Profile::default()
            },
        );
        let shown = toml::to_string_pretty(&redacted(cfg)).unwrap();
        assert!(!shown.contains("s3cret"));
        assert!(shown.contains("****"));
        assert!(shown.contains("NAS_KEY"));
    }
}

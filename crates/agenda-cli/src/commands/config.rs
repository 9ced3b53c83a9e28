//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use agenda_core::{Config, Environment};

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    let service_url = config.service_url().map(|url| url.to_string());

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "base_url": config.base_url,
                    "environment": config.environment,
                    "environments": config.environments,
                    "service_url": service_url.as_ref().ok(),
                    "request_timeout_secs": config.request_timeout_secs,
                    "data_dir": config.data_dir,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", service_url?);
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  base_url:             {}", config.base_url);
            println!(
                "  environment:          {}",
                config.environment.as_deref().unwrap_or("(not set)")
            );
            for (name, env) in &config.environments {
                println!("    {:<20}{}", name, env.base_url);
            }
            println!("  request_timeout_secs: {}", config.request_timeout_secs);
            println!("  data_dir:             {}", config.data_dir.display());
            println!(
                "  log_file:             {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            match &service_url {
                Ok(url) => println!("Service URL: {}", url),
                Err(e) => println!("Service URL: invalid ({})", e),
            }
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
///
/// `environments.<name>` adds or replaces a named environment; the value
/// `none` removes it. Only the file is edited: `AGENDA_*` overrides in the
/// current environment are neither saved nor checked.
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    let mut config =
        Config::load_file_only(&save_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    // Never save a configuration that cannot reach a service
    config
        .service_url()
        .context("Configuration not saved")?;

    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let unset = value.is_empty() || value == "none";

    match key {
        "base_url" => {
            config.base_url = value.to_string();
        }
        "environment" => {
            config.environment = if unset { None } else { Some(value.to_string()) };
        }
        "request_timeout_secs" => {
            config.request_timeout_secs = value
                .parse()
                .context("Invalid value for request_timeout_secs. Use a whole number of seconds.")?;
        }
        "data_dir" => {
            config.data_dir = value.into();
        }
        "log_file" => {
            config.log_file = if unset { None } else { Some(value.into()) };
        }
        _ => {
            let Some(name) = key.strip_prefix("environments.").filter(|n| !n.is_empty()) else {
                bail!(
                    "Unknown configuration key: '{}'\n\
                     Valid keys: base_url, environment, environments.<name>, \
                     request_timeout_secs, data_dir, log_file",
                    key
                );
            };
            if unset {
                config.environments.remove(name);
            } else {
                config.environments.insert(
                    name.to_string(),
                    Environment {
                        base_url: value.to_string(),
                    },
                );
            }
        }
    }

    Ok(())
}

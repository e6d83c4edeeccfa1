//! Configuration view and validation commands: `backoffice config`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use backoffice::config::{BackofficeToml, CONFIG_FILE};

use super::super::ConfigCommands;

pub fn cmd_config(
    config_dir: &Path,
    db_path: Option<&PathBuf>,
    command: Option<ConfigCommands>,
) -> Result<()> {
    let config_path = config_dir.join(CONFIG_FILE);

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Backoffice Configuration");
            println!("========================");
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No {} found at {}", CONFIG_FILE, config_path.display());
                println!("Using default configuration.");
            }
            println!();

            let settings = super::load_settings(config_dir, db_path)?;
            println!("Effective values (with env/CLI overrides):");
            let rendered =
                toml::to_string_pretty(&settings).context("Failed to render configuration")?;
            for line in rendered.lines() {
                println!("  {}", line);
            }
            println!();
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !config_path.exists() {
                println!("No {} found. Using defaults (valid).", CONFIG_FILE);
                return Ok(());
            }

            let toml = BackofficeToml::load(&config_path)?;
            let warnings = toml.validate();

            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("{} already exists at {}", CONFIG_FILE, config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            std::fs::create_dir_all(config_dir)
                .with_context(|| format!("Failed to create {}", config_dir.display()))?;
            BackofficeToml::default().save(&config_path)?;

            println!("Created {} at {}", CONFIG_FILE, config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [server] host, port, dev_mode");
            println!("  - [database] path");
            println!("  - [auth] user_header, dev_user");
            println!("  - [listings.<slug>] page_size, export_formats");
            println!();
        }
    }

    Ok(())
}

//! CLI command implementations.
//!
//! Each submodule owns one `Commands` variant:
//!
//! | Module    | Commands handled                                     |
//! |-----------|------------------------------------------------------|
//! | `serve`   | `Serve`                                              |
//! | `init`    | `Init`                                               |
//! | `export`  | `Export`                                             |
//! | `config`  | `Config`                                             |

pub mod config;
pub mod export;
pub mod init;
pub mod serve;

use std::path::{Path, PathBuf};

use anyhow::Result;
use backoffice::config::BackofficeToml;

pub use config::cmd_config;
pub use export::cmd_export;
pub use init::cmd_init;
pub use serve::cmd_serve;

/// Effective settings: `backoffice.toml` in `config_dir`, then the
/// environment, then the `--db-path` flag.
pub fn load_settings(config_dir: &Path, db_path: Option<&PathBuf>) -> Result<BackofficeToml> {
    let mut settings = BackofficeToml::load_or_default(config_dir)?;
    settings.apply_env()?;
    if let Some(path) = db_path {
        settings.database.path = path.clone();
    }
    Ok(settings)
}

/// Create the parent directory of a database file when it has one.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

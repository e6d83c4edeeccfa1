//! Configuration for the backoffice, read from `backoffice.toml`.
//!
//! Settings are layered: file, then environment (`BACKOFFICE_PORT`,
//! `BACKOFFICE_DB`, plus anything in a `.env` file), then CLI flags.
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8000
//! dev_mode = false
//!
//! [database]
//! path = "backoffice.db"
//!
//! [auth]
//! user_header = "X-Remote-User"
//! dev_user = "admin"
//!
//! [logging]
//! json = false
//! dir = "logs"
//!
//! [listings.users]
//! page_size = 25
//! export_formats = ["csv", "xlsx"]
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use backoffice_kit::ExportFormat;
use serde::{Deserialize, Serialize};

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "backoffice.toml";

/// Slugs that accept a `[listings.<slug>]` section.
pub const KNOWN_LISTINGS: [&str; 3] = ["users", "items", "dashboard"];

pub const ENV_PORT: &str = "BACKOFFICE_PORT";
pub const ENV_DB: &str = "BACKOFFICE_DB";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Permissive CORS and wildcard bind for local front-end work
    #[serde(default)]
    pub dev_mode: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            dev_mode: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSection {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("backoffice.db")
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSection {
    /// Header set by the fronting proxy with the authenticated username
    #[serde(default = "default_user_header")]
    pub user_header: String,
    /// Username assumed when the header is absent (local development only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_user: Option<String>,
}

fn default_user_header() -> String {
    "X-Remote-User".to_string()
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            user_header: default_user_header(),
            dev_user: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSection {
    #[serde(default)]
    pub json: bool,
    /// Directory for daily-rolling log files; stderr only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

/// Per-listing overrides (`[listings.<slug>]`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_formats: Option<Vec<String>>,
}

impl ListingOverride {
    /// Export formats this override names, unknown names dropped.
    pub fn formats(&self) -> Option<Vec<ExportFormat>> {
        self.export_formats
            .as_ref()
            .map(|names| names.iter().filter_map(|n| ExportFormat::parse(n)).collect())
    }
}

/// The complete backoffice.toml structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackofficeToml {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub database: DatabaseSection,
    #[serde(default)]
    pub auth: AuthSection,
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default)]
    pub listings: BTreeMap<String, ListingOverride>,
}

impl BackofficeToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse backoffice.toml")
    }

    /// Load `backoffice.toml` from `dir`, or the defaults when it is absent.
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize backoffice.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Apply `BACKOFFICE_PORT` and `BACKOFFICE_DB` from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides read through `lookup`.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("{} must be a port number, got '{}'", ENV_PORT, port))?;
        }
        if let Some(db) = lookup(ENV_DB).filter(|v| !v.trim().is_empty()) {
            self.database.path = PathBuf::from(db.trim());
        }
        Ok(())
    }

    pub fn listing(&self, slug: &str) -> Option<&ListingOverride> {
        self.listings.get(slug)
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0: the OS will pick a random port".to_string());
        }
        if self.auth.user_header.trim().is_empty() {
            warnings.push("auth.user_header is empty: every request will be anonymous".to_string());
        }
        if let Some(user) = &self.auth.dev_user {
            if user.trim().is_empty() {
                warnings.push("auth.dev_user is set but empty".to_string());
            } else if !self.server.dev_mode {
                warnings.push(format!(
                    "auth.dev_user '{}' is set outside dev_mode: requests without '{}' act as that user",
                    user, self.auth.user_header
                ));
            }
        }

        for (slug, listing) in &self.listings {
            if !KNOWN_LISTINGS.contains(&slug.as_str()) {
                warnings.push(format!(
                    "Unknown listing '{}' (known: {})",
                    slug,
                    KNOWN_LISTINGS.join(", ")
                ));
            }
            if listing.page_size == Some(0) {
                warnings.push(format!("listings.{}.page_size must be at least 1", slug));
            }
            for format in listing.export_formats.iter().flatten() {
                if ExportFormat::parse(format).is_none() {
                    warnings.push(format!(
                        "Invalid export format '{}' in listings.{} (valid: csv, xlsx, pdf)",
                        format, slug
                    ));
                }
            }
        }

        warnings
    }
}

//! Web server command: `backoffice serve`.

use anyhow::Result;
use backoffice::admin::server::{ServerConfig, start_server};
use backoffice::config::BackofficeToml;

pub async fn cmd_serve(
    mut settings: BackofficeToml,
    port: Option<u16>,
    open: bool,
    dev: bool,
) -> Result<()> {
    if let Some(port) = port {
        settings.server.port = port;
    }
    if dev {
        settings.server.dev_mode = true;
    }
    for warning in settings.validate() {
        tracing::warn!("{}", warning);
    }

    let mut config = ServerConfig::from_settings(settings);
    // No browser inside dev containers.
    config.open_browser = open && !config.dev_mode;
    start_server(config).await
}

//! Coordination point server command: `taskboard serve`.

use anyhow::Result;

use taskboard::config::TaskboardConfig;

pub async fn cmd_serve(
    mut config: TaskboardConfig,
    host: Option<String>,
    port: Option<u16>,
    dev: bool,
) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if dev {
        config.server.dev_mode = true;
    }

    taskboard::sync::server::start_server(&config).await
}

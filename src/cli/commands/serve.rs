use anyhow::Context;
use tracing::info;

use crate::app::{self, AppState};
use crate::config::AppConfig;

pub async fn handle(port: Option<u16>) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env().context("loading configuration")?;
    if let Some(port) = port {
        config.server.port = port;
    }
    info!("starting gymdesk API in {:?} mode", config.environment);

    let state = AppState::from_config(config).await.context("initialising application")?;
    app::serve(state).await?;
    Ok(())
}

//! Hosting the bundled execution service.

use anyhow::Result;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::server;

pub async fn run(addr_override: Option<&str>, cfg: &Config) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vibescript=info,tower_http=info")),
        )
        .init();
    debug!(rc = %cfg.config_path.display(), "configuration loaded");
    let addr = match addr_override {
        Some(addr) => addr.to_string(),
        None => cfg
            .get("SERVER_ADDR")
            .unwrap_or_else(|| "127.0.0.1:5000".into()),
    };
    server::serve(&addr, cfg.examples_path()).await
}

//! Fetching and listing example programs.

use anyhow::{Context, Result};

use crate::client::ServiceClient;
use crate::config::Config;

/// Fetch one example from the service and print its source.
pub async fn fetch(name: &str, cfg: &Config) -> Result<()> {
    let client = ServiceClient::from_config(cfg)?;
    let code = client.fetch_example(name).await?;
    print!("{}", code);
    if !code.ends_with('\n') {
        println!();
    }
    Ok(())
}

/// List the example names available under the local examples directory.
pub fn list(cfg: &Config) -> Result<()> {
    let dir = cfg.examples_path();
    let entries = std::fs::read_dir(&dir)
        .with_context(|| format!("cannot read examples directory {}", dir.display()))?;
    let mut names = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("vs") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
    }
    names.sort();
    for name in names {
        println!("{}", name);
    }
    Ok(())
}

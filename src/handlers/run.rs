//! Program execution with replay-based interactivity.

use std::io::{self, Write};

use anyhow::{bail, Result};

use crate::client::ServiceClient;
use crate::config::Config;
use crate::interp::LocalEngine;
use crate::printer::TextPrinter;
use crate::run::{drive, ExecutionBackend, InputSource, RunOutcome};

/// Answers input requests from `--input` presets first, then the terminal.
/// With `no_interaction` set, an unanswered request cancels the run.
pub struct CliInputs {
    presets: Vec<(String, String)>,
    no_interaction: bool,
    declined: Option<String>,
}

impl CliInputs {
    pub fn new(presets: Vec<(String, String)>, no_interaction: bool) -> Self {
        CliInputs {
            presets,
            no_interaction,
            declined: None,
        }
    }
}

impl InputSource for CliInputs {
    fn request(&mut self, variable: &str) -> Result<Option<String>> {
        if let Some(idx) = self.presets.iter().position(|(name, _)| name == variable) {
            let (_, value) = self.presets.remove(idx);
            return Ok(Some(value));
        }
        if self.no_interaction {
            self.declined = Some(variable.to_string());
            return Ok(None);
        }
        print!("Enter value for {}: ", variable);
        io::stdout().flush().ok();
        let mut value = String::new();
        if io::stdin().read_line(&mut value)? == 0 {
            // stdin closed mid-run
            self.declined = Some(variable.to_string());
            return Ok(None);
        }
        Ok(Some(value.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Execute against the remote service.
pub async fn remote(
    source: &str,
    cfg: &Config,
    inputs: CliInputs,
    color: Option<&'static str>,
) -> Result<()> {
    let client = ServiceClient::from_config(cfg)?;
    execute(&client, source, inputs, color).await
}

/// Execute with the in-process engine. Same replay loop, no network.
pub async fn local(source: &str, inputs: CliInputs, color: Option<&'static str>) -> Result<()> {
    execute(&LocalEngine, source, inputs, color).await
}

async fn execute<B: ExecutionBackend>(
    backend: &B,
    source: &str,
    mut inputs: CliInputs,
    color: Option<&'static str>,
) -> Result<()> {
    match drive(backend, source, &mut inputs).await? {
        RunOutcome::Output(text) => {
            TextPrinter { color }.print(&text);
            Ok(())
        }
        RunOutcome::Failed(err) => bail!(err),
        RunOutcome::Cancelled => match inputs.declined {
            Some(variable) => bail!("input '{}' was left unanswered", variable),
            None => bail!("run cancelled"),
        },
    }
}

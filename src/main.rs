mod cli;
mod client;
mod config;
mod handlers;
mod interp;
mod lexer;
mod printer;
mod protocol;
mod run;
mod server;

use anyhow::{bail, Context, Result};
use config::Config;
use is_terminal::IsTerminal;
use std::io::{self, Read};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // CLI overrides config through the environment
    if let Some(url) = args.url.as_deref() {
        std::env::set_var("SERVICE_URL", url);
    }

    let cfg = Config::load();

    // Modes that take no script
    if args.serve {
        return handlers::serve::run(args.addr.as_deref(), &cfg).await;
    }
    if args.list_examples {
        return handlers::examples::list(&cfg);
    }
    if let Some(name) = args.example.as_deref() {
        return handlers::examples::fetch(name, &cfg).await;
    }

    let source = read_source(args.file.as_deref())?;

    if args.tokens {
        return handlers::highlight::tokens(&source);
    }

    // Color: flags win, otherwise only a terminal gets colored output
    let want_color = if args.no_color {
        false
    } else if args.color {
        true
    } else {
        io::stdout().is_terminal()
    };

    if args.highlight {
        return handlers::highlight::highlight(&source, want_color);
    }

    let color = if want_color {
        color_name(&cfg.get("DEFAULT_COLOR").unwrap_or_default())
    } else {
        None
    };

    let inputs = handlers::run::CliInputs::new(parse_inputs(&args.input)?, args.no_interaction);

    if args.local {
        handlers::run::local(&source, inputs, color).await
    } else {
        handlers::run::remote(&source, &cfg, inputs, color).await
    }
}

/// Resolve the script text: named file, "-", or piped stdin.
fn read_source(file: Option<&str>) -> Result<String> {
    match file {
        Some("-") => read_stdin(),
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path))
        }
        None => {
            if io::stdin().is_terminal() {
                bail!("no script given; pass a FILE or pipe one on stdin");
            }
            read_stdin()
        }
    }
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("cannot read stdin")?;
    Ok(buf)
}

/// Parse repeated --input NAME=VALUE flags, keeping the CLI order.
fn parse_inputs(pairs: &[String]) -> Result<Vec<(String, String)>> {
    let mut out = Vec::with_capacity(pairs.len());
    for raw in pairs {
        match raw.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                out.push((name.trim().to_string(), value.to_string()));
            }
            _ => bail!("invalid --input '{}', expected NAME=VALUE", raw),
        }
    }
    Ok(out)
}

fn color_name(value: &str) -> Option<&'static str> {
    match value.to_ascii_lowercase().as_str() {
        "green" => Some("green"),
        "cyan" => Some("cyan"),
        "magenta" => Some("magenta"),
        "yellow" => Some("yellow"),
        _ => None,
    }
}

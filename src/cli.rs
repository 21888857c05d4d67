use clap::{ArgGroup, Parser};

#[derive(Parser, Debug, Clone)]
#[command(name = "vibescript", about = "VibeScript CLI and execution service", version)]
#[command(group(ArgGroup::new("mode").args(["local", "serve", "highlight", "tokens", "example", "list_examples"]).multiple(false)))]
#[command(group(ArgGroup::new("color_switch").args(["color", "no_color"]).multiple(false)))]
pub struct Cli {
    /// Script file to run, or "-" to read from stdin.
    #[arg(value_name = "FILE")]
    pub file: Option<String>,

    /// Run the script in-process instead of sending it to the service.
    #[arg(long)]
    pub local: bool,

    /// Start the execution service.
    #[arg(long)]
    pub serve: bool,

    /// Print the script with syntax highlighting and exit.
    #[arg(long)]
    pub highlight: bool,

    /// Dump the highlight token stream and exit.
    #[arg(long)]
    pub tokens: bool,

    /// Fetch a named example from the service and print its source.
    #[arg(short = 'e', long)]
    pub example: Option<String>,

    /// List the examples available locally.
    #[arg(short = 'l', long = "list-examples", visible_alias = "le")]
    pub list_examples: bool,

    /// Execution service URL (overrides SERVICE_URL).
    #[arg(long)]
    pub url: Option<String>,

    /// Answer a prompt ahead of time.
    /// Can be used multiple times: --input name=world --input count=3
    #[arg(long = "input", value_name = "NAME=VALUE", action = clap::ArgAction::Append)]
    pub input: Vec<String>,

    /// Never prompt on stdin; a script asking for an unanswered input fails.
    #[arg(long = "no-interaction")]
    pub no_interaction: bool,

    /// Listen address for --serve (overrides SERVER_ADDR).
    #[arg(long)]
    pub addr: Option<String>,

    /// Force colored output.
    #[arg(long)]
    pub color: bool,
    /// Disable colored output.
    #[arg(long = "no-color")]
    pub no_color: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

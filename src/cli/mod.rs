pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gymdesk-api")]
#[command(about = "gymdesk API server and administration tools")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    /// Defaults to `serve` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides GYMDESK_PORT / PORT)")]
        port: Option<u16>,
    },

    #[command(about = "Print a bcrypt hash for a password")]
    HashPassword {
        #[arg(help = "Plaintext password")]
        password: String,
    },

    #[command(about = "Back-office account management")]
    Admin {
        #[command(subcommand)]
        cmd: commands::admin::AdminCommands,
    },

    #[command(about = "Session token tools")]
    Token {
        #[command(subcommand)]
        cmd: commands::token::TokenCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => commands::serve::handle(port).await,
        Commands::HashPassword { password } => commands::password::handle(&password, output_format),
        Commands::Admin { cmd } => commands::admin::handle(cmd, output_format).await,
        Commands::Token { cmd } => commands::token::handle(cmd, output_format),
    }
}

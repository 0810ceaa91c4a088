use anyhow::Context;
use clap::Subcommand;

use crate::auth::{Identity, Role, TokenCodec};
use crate::cli::utils::output_value;
use crate::cli::OutputFormat;
use crate::config::AppConfig;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Sign a session token with the configured JWT_SECRET")]
    Issue {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long, help = "super_admin or trainer")]
        role: Role,
    },
}

pub fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Issue {
            user_id,
            email,
            name,
            role,
        } => {
            let config = AppConfig::from_env().context("loading configuration")?;
            let codec = TokenCodec::new(&config.security.jwt_secret)?;
            let token = codec.issue(&Identity::new(user_id, email, role, name))?;
            output_value(output_format, "token", &token)
        }
    }
}

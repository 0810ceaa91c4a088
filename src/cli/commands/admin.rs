use anyhow::Context;
use clap::Subcommand;
use serde_json::json;
use tracing::warn;

use crate::app::connect_store;
use crate::auth::password::hash_password;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::models::NewAdmin;

#[derive(Subcommand)]
pub enum AdminCommands {
    #[command(about = "Create a super_admin account in the configured database")]
    Create {
        #[arg(long, help = "Login email")]
        email: String,
        #[arg(long, help = "Display name")]
        name: String,
        #[arg(long, help = "Plaintext password")]
        password: String,
    },
}

pub async fn handle(cmd: AdminCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AdminCommands::Create { email, name, password } => {
            let config = AppConfig::from_env().context("loading configuration")?;
            if config.database.url.is_none() {
                warn!("DATABASE_URL is not set; the account will only live for this process");
            }
            let store = connect_store(&config).await?;

            if store.find_admin_by_email(&email).await?.is_some() {
                anyhow::bail!("an admin with email '{}' already exists", email);
            }

            let admin = store
                .create_admin(NewAdmin {
                    email,
                    name,
                    password_hash: hash_password(&password)?,
                })
                .await?;

            output_success(
                output_format,
                &format!("Created admin {}", admin.email),
                Some(json!({ "admin": admin })),
            )
        }
    }
}

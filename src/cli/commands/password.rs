use crate::auth::password::hash_password;
use crate::cli::utils::output_value;
use crate::cli::OutputFormat;

pub fn handle(password: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    if password.is_empty() {
        anyhow::bail!("password must not be empty");
    }
    let hash = hash_password(password)?;
    output_value(output_format, "hash", &hash)
}

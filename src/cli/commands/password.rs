use serde_json::json;

use crate::auth::password::hash_password;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

pub fn handle(password: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    if password.is_empty() {
        anyhow::bail!("Password cannot be empty");
    }

    let hash = hash_password(password)?;
    match output_format {
        OutputFormat::Json => output_success(&output_format, "Password hashed", Some(json!({ "hash": hash }))),
        OutputFormat::Text => {
            println!("{}", hash);
            Ok(())
        }
    }
}

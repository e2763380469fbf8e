use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::auth::AccountKind;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::service::email_taken;
use crate::database::DatabaseManager;

#[derive(Subcommand)]
pub enum SuperadminCommands {
    #[command(about = "Create a super-admin account")]
    Create {
        #[arg(long, help = "Login email")]
        email: String,

        #[arg(long, help = "Plain-text password, hashed before storing")]
        password: String,

        #[arg(long, help = "Display name")]
        full_name: Option<String>,
    },
}

pub async fn handle(cmd: SuperadminCommands, databases: &DatabaseManager, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        SuperadminCommands::Create { email, password, full_name } => {
            let email = email.trim();
            if email.is_empty() || password.is_empty() {
                anyhow::bail!("Email and password are required");
            }

            let settings = databases.settings_pool().await?;
            if email_taken(&settings, email, None).await? {
                anyhow::bail!("A user with email {} already exists", email);
            }

            let password_hash = hash_password(&password)?;
            let (id,): (Uuid,) = sqlx::query_as(
                "INSERT INTO users (email, password_hash, full_name, account_kind) VALUES ($1, $2, $3, $4) RETURNING id",
            )
            .bind(email)
            .bind(&password_hash)
            .bind(&full_name)
            .bind(AccountKind::SuperAdmin.as_str())
            .fetch_one(&settings)
            .await?;

            tracing::info!("Super-admin {} created", id);
            output_success(
                &output_format,
                &format!("Super-admin {} created", email),
                Some(json!({ "id": id, "email": email })),
            )
        }
    }
}

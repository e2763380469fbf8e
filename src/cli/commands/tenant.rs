use clap::Subcommand;
use serde_json::json;

use crate::auth::PermissionSet;
use crate::cli::utils::{output_empty_collection, output_success, split_list};
use crate::cli::OutputFormat;
use crate::database::models::Tenant;
use crate::database::{DatabaseManager, Repository};
use crate::services::{NewTenant, TenantService};

#[derive(Subcommand)]
pub enum TenantCommands {
    #[command(about = "List live tenants")]
    List,

    #[command(about = "Register a tenant and provision its database")]
    Provision {
        #[arg(long, help = "Tenant display name")]
        name: String,

        #[arg(long, help = "Database name; derived from the tenant name when omitted")]
        db_name: Option<String>,

        #[arg(long, help = "Business mailbox used for customer emails")]
        email: Option<String>,

        #[arg(long, help = "Business mailbox password")]
        email_password: Option<String>,

        #[arg(long, help = "Comma-separated permission allow-list")]
        permissions: Option<String>,
    },

    #[command(about = "Create and migrate an already registered tenant database")]
    Reprovision {
        #[arg(help = "Tenant database name")]
        db_name: String,
    },
}

pub async fn handle(cmd: TenantCommands, databases: &DatabaseManager, output_format: OutputFormat) -> anyhow::Result<()> {
    let settings = databases.settings_pool().await?;

    match cmd {
        TenantCommands::List => {
            let tenants = Repository::<Tenant>::new("tenants", "Tenant", settings).select_live().await?;
            if tenants.is_empty() {
                return output_empty_collection(&output_format, "tenants", "No tenants registered");
            }

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "tenants": tenants }))?);
                }
                OutputFormat::Text => {
                    println!("{:<38} {:<25} {:<25} {}", "ID", "NAME", "DATABASE", "ACTIVE");
                    println!("{}", "-".repeat(95));
                    for t in &tenants {
                        println!("{:<38} {:<25} {:<25} {}", t.id, t.name, t.database_name, t.is_active);
                    }
                }
            }
            Ok(())
        }
        TenantCommands::Provision { name, db_name, email, email_password, permissions } => {
            let requested = split_list(permissions.as_deref());
            let allow_list = requested
                .iter()
                .map(|p| p.parse())
                .collect::<Result<PermissionSet, _>>()?;

            let service = TenantService::new(settings, databases.clone());
            let tenant = service
                .create_tenant(NewTenant {
                    name,
                    database_name: db_name,
                    business_email: email,
                    business_email_password: email_password,
                    phone_number: None,
                    is_active: true,
                    permissions: allow_list,
                })
                .await?;

            output_success(
                &output_format,
                &format!("Tenant '{}' registered with database {}", tenant.name, tenant.database_name),
                Some(json!({ "id": tenant.id, "dbName": tenant.database_name })),
            )
        }
        TenantCommands::Reprovision { db_name } => {
            TenantService::new(settings, databases.clone()).provision_database(&db_name).await?;
            output_success(&output_format, &format!("Database {} provisioned", db_name), None)
        }
    }
}

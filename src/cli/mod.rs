pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::database::DatabaseManager;

#[derive(Parser)]
#[command(name = "shopctl")]
#[command(about = "shopctl - operator tooling for the Shop Admin API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create the settings database and apply its schema")]
    Migrate {
        #[arg(long, help = "Also re-apply the tenant schema to every live tenant database")]
        tenants: bool,
    },

    #[command(about = "Tenant registration and database provisioning")]
    Tenant {
        #[command(subcommand)]
        cmd: commands::tenant::TenantCommands,
    },

    #[command(about = "Super-admin account management")]
    Superadmin {
        #[command(subcommand)]
        cmd: commands::superadmin::SuperadminCommands,
    },

    #[command(about = "Print an argon2 hash for a password")]
    HashPassword {
        #[arg(help = "Plain-text password")]
        password: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
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

/// Registry built from the same environment the server reads.
fn databases() -> DatabaseManager {
    let config = AppConfig::from_env();
    DatabaseManager::new(&config.database)
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Migrate { tenants } => commands::migrate::handle(&databases(), tenants, output_format).await,
        Commands::Tenant { cmd } => commands::tenant::handle(cmd, &databases(), output_format).await,
        Commands::Superadmin { cmd } => commands::superadmin::handle(cmd, &databases(), output_format).await,
        Commands::HashPassword { password } => commands::password::handle(&password, output_format),
    }
}

pub mod commands;

use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::database::{DatabaseManager, MemoryStore, PgStore, Store};

#[derive(Parser)]
#[command(name = "recipe-api")]
#[command(about = "Recipe API - REST backend for recipes, tags and ingredients")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Address to bind, overrides SERVER_HOST")]
        host: Option<String>,
        #[arg(long, help = "Port to listen on, overrides PORT")]
        port: Option<u16>,
    },

    #[command(about = "Create missing database tables")]
    Migrate,

    #[command(about = "Create a user account from the command line")]
    CreateUser {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long, env = "RECIPE_API_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    let command = cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
    });

    match command {
        Commands::Serve { host, port } => commands::serve::handle(config, host, port).await,
        Commands::Migrate => commands::migrate::handle(config).await,
        Commands::CreateUser {
            email,
            name,
            password,
        } => commands::user::create(config, email, name, password).await,
    }
}

/// PostgreSQL when a database URL is configured, in-memory otherwise
pub async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn Store>> {
    if config.database.url.is_none() {
        warn!("DATABASE_URL not set; using in-memory storage, data is lost on exit");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let pool = DatabaseManager::connect(&config.database).await?;
    if config.database.run_migrations {
        DatabaseManager::migrate(&pool).await?;
    }
    info!("Using PostgreSQL storage");
    Ok(Arc::new(PgStore::new(pool)))
}

//! Hero Service Admin CLI
//!
//! Administrative CLI tool for the configured hero store.
//! Provides inspection, seeding, cleanup and envelope token issuing.

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tracing::{error, info};

use hero_service::{
    EnvelopeCodec, HeroInput, HeroService, HeroServiceError, Settings, StoreBackend,
};

#[derive(Parser)]
#[command(name = "hero-admin")]
#[command(about = "Hero Service Admin CLI - Inspect and maintain the hero store")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Document store backend (overrides HERO_STORE)
    #[arg(long)]
    store: Option<StoreBackend>,

    /// NATS server URL (overrides HERO_NATS_URL)
    #[arg(long, env = "NATS_URL")]
    nats_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the number of stored heroes
    Stats,

    /// List heroes
    List {
        /// Only heroes whose name starts with this prefix
        #[arg(long)]
        name: Option<String>,
    },

    /// Show a single hero
    Show {
        /// Hero id
        id: i64,
    },

    /// Insert the classic heroes into an empty store
    Seed {
        /// Confirm the seed operation
        #[arg(long)]
        confirm: bool,
    },

    /// Delete every hero
    Cleanup {
        /// Confirm the cleanup operation
        #[arg(long)]
        confirm: bool,
    },

    /// Print an envelope token for POST /api/heroes
    SignToken {
        /// Hero name
        #[arg(long)]
        name: String,

        /// Hero id; omitted means assigned by the server
        #[arg(long)]
        id: Option<i64>,

        /// Expiry in seconds; omitted means the token never expires
        #[arg(long)]
        expires_in: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    let mut settings = Settings::load()?;
    if let Some(store) = cli.store {
        settings.store = store;
    }
    if let Some(nats_url) = cli.nats_url {
        settings.nats_url = nats_url;
    }

    // Token issuing needs the secret, not the store
    if let Commands::SignToken {
        name,
        id,
        expires_in,
    } = &cli.command
    {
        let codec = EnvelopeCodec::new(&settings.token_secret);
        let hero = HeroInput {
            id: *id,
            name: Some(name.clone()),
        };
        let token = codec.seal(hero, expires_in.map(Duration::from_secs))?;
        println!("{}", token);
        return Ok(());
    }

    if settings.store == StoreBackend::Memory {
        info!("ℹ️  Using the in-memory store; changes are discarded on exit");
    }
    let service = settings.build_service().await?;

    match cli.command {
        Commands::Stats => show_stats(&service).await?,

        Commands::List { name } => list_heroes(&service, name.as_deref()).await?,

        Commands::Show { id } => show_hero(&service, id).await?,

        Commands::Seed { confirm } => {
            if !confirm {
                error!("❌ Seed operation requires --confirm flag for safety");
                return Ok(());
            }
            let inserted = service.seed_defaults().await?;
            if inserted == 0 {
                info!("Store is not empty, nothing seeded");
            } else {
                info!("✅ Seeded {} heroes", inserted);
            }
        }

        Commands::Cleanup { confirm } => {
            if !confirm {
                error!("❌ Cleanup operation requires --confirm flag for safety");
                return Ok(());
            }
            let summary = service.clear().await?;
            info!("✅ Deleted {} heroes", summary.deleted_count);
        }

        Commands::SignToken { .. } => {}
    }

    Ok(())
}

async fn show_stats(service: &HeroService) -> Result<()> {
    let count = service.count().await?;
    info!("📊 Hero store statistics");
    info!("   Heroes: {}", count);
    Ok(())
}

async fn list_heroes(service: &HeroService, name: Option<&str>) -> Result<()> {
    let heroes = service.list(name).await?;
    info!("📋 {} heroes", heroes.len());
    for hero in heroes {
        println!("{:>5}  {}", hero.id, hero.name);
    }
    Ok(())
}

async fn show_hero(service: &HeroService, id: i64) -> Result<()> {
    let hero = service
        .get(id)
        .await?
        .ok_or_else(|| HeroServiceError::NotFound(format!("hero {}", id)))?;
    println!("{}", serde_json::to_string_pretty(&hero)?);
    Ok(())
}

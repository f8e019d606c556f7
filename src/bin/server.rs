// Hero Service - HTTP Server
// Serves the REST and GraphQL APIs over the configured document store
// Run with: cargo run --bin server

//! # Hero Service Server Binary
//!
//! Starts the HTTP server. Everything interesting lives in the library crate;
//! this file only wires configuration, logging and the store together.
//!
//! ## Startup Sequence
//!
//! ```text
//! .env (dotenv)
//!   ↓
//! Settings (defaults → HERO_* → API_PORT)
//!   ↓
//! CLI flags (--port, --store, --seed)
//!   ↓
//! tracing subscriber, banner
//!   ↓
//! DocumentStore backend → HeroService → HeroServer
//! ```
//!
//! ## Usage Examples
//!
//! ```bash
//! cargo run --bin server -- --port 4000 --seed
//! HERO_STORE=nats HERO_NATS_URL=nats://localhost:4222 cargo run --bin server
//! ```

use clap::Parser;
use dotenv::dotenv;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hero_service::server::banner::{self, BannerInfo};
use hero_service::{HeroServerBuilder, Settings, StoreBackend};

#[derive(Parser)]
#[command(name = "hero-server")]
#[command(about = "Hero Service - REST and GraphQL API for Hero records")]
#[command(version)]
struct Cli {
    /// Port to listen on (overrides API_PORT and HERO_API_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Document store backend: memory or nats
    #[arg(long)]
    store: Option<StoreBackend>,

    /// Seed the classic heroes when the store is empty
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    let env_loaded = dotenv().is_ok();

    let cli = Cli::parse();
    let mut settings = Settings::load()?;
    if let Some(port) = cli.port {
        settings.api_port = port;
    }
    if let Some(store) = cli.store {
        settings.store = store;
    }
    settings.seed_defaults |= cli.seed;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if !env_loaded {
        warn!("No .env file loaded, using process environment only");
    }

    banner::print(&BannerInfo {
        store: settings.store.to_string(),
        host: settings.host.clone(),
        port: settings.api_port,
        graphiql: settings.graphiql,
    });

    let service = settings.build_service().await?;
    if settings.seed_defaults {
        let inserted = service.seed_defaults().await?;
        info!("🌱 Seeding finished ({} heroes inserted)", inserted);
    }

    HeroServerBuilder::new()
        .with_config(settings.server_config())
        .with_service(service)
        .build_and_run()
        .await?;

    Ok(())
}

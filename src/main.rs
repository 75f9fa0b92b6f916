use std::sync::Arc;

use clap::Parser;
use migration::MigratorTrait;
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::{fmt, EnvFilter};

use valoris::authz::engine::PolicyEngine;
use valoris::authz::resolver::ResourceResolver;
use valoris::authz::types::{PolicyTuple, ACTION_READ, ACTION_WRITE};
use valoris::{settings, storage, web};

#[derive(Parser, Debug)]
#[command(
    name = "valoris",
    version,
    about = "Waste-recycling management backend - authorization core"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    // load settings
    let settings = settings::Settings::load(&cli.config)?;
    tracing::info!(?settings, "Loaded configuration");

    // init storage (database) and bring the schema up to date
    let db = storage::init(&settings.database)
        .await
        .map_err(|e| miette::miette!("database init failed: {e}"))?;
    migration::Migrator::up(&db, None).await.into_diagnostic()?;

    let resolver = Arc::new(ResourceResolver::new());

    // ensure a baseline policy set exists on first boot
    ensure_seed_policies(&db, &resolver).await?;

    // Boot is fail-fast: the service must not serve traffic with an
    // unloaded authorization model.
    let engine = Arc::new(PolicyEngine::new(db.clone()));
    engine
        .load()
        .await
        .map_err(|e| miette::miette!("failed to load authorization policies: {e}"))?;

    // start web server
    web::serve(settings, db, engine, resolver).await?;
    Ok(())
}

/// Seed an ADMIN read+write grant for every protected resource when the
/// policy table is empty, so a fresh install is administrable.
async fn ensure_seed_policies(
    db: &sea_orm::DatabaseConnection,
    resolver: &ResourceResolver,
) -> Result<()> {
    let existing = storage::load_all(db)
        .await
        .map_err(|e| miette::miette!("failed to read policy store: {e}"))?;
    if !existing.is_empty() {
        return Ok(());
    }

    for resource in resolver.resources() {
        for action in [ACTION_READ, ACTION_WRITE] {
            storage::insert(db, &PolicyTuple::permission("ADMIN", resource, action))
                .await
                .map_err(|e| miette::miette!("failed to seed policies: {e}"))?;
        }
    }
    tracing::info!("Seeded default ADMIN policies for all protected resources");
    Ok(())
}

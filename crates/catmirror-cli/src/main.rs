mod status;
mod sync;

use catmirror_core::SyncEntity;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "catmirror-cli")]
#[command(about = "Inventory catalog mirror command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a sync now, in the foreground.
    Sync {
        /// `all`, `categories`, `products`, or `variants`.
        #[arg(long, default_value = "all", value_parser = parse_entity_filter)]
        entity: EntityFilter,
    },
    /// Show the last full sync and recent stage outcomes.
    Status {
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
    /// Apply pending database migrations.
    Migrate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntityFilter {
    All,
    One(SyncEntity),
}

fn parse_entity_filter(value: &str) -> Result<EntityFilter, String> {
    if value.trim().eq_ignore_ascii_case("all") {
        return Ok(EntityFilter::All);
    }
    value
        .parse::<SyncEntity>()
        .map(EntityFilter::One)
        .map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = catmirror_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = catmirror_db::PoolConfig::from_app_config(&config);
    let pool = catmirror_db::connect_pool(&config.database_url, pool_config).await?;

    match cli.command {
        Commands::Sync { entity } => {
            catmirror_db::run_migrations(&pool).await?;
            sync::run_sync(pool, &config, entity).await
        }
        Commands::Status { limit } => status::run_status(&pool, limit).await,
        Commands::Migrate => {
            let applied = catmirror_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests;

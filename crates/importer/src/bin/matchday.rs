use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use importer::config::{BUDGET_THRESHOLD, DEFAULT_API_HOST, DEFAULT_REQUEST_DELAY_MS};
use importer::{
    ApiFootballSource, ApiSettings, EligibleWindow, IngestContext, IngestSettings,
    IngestionCoordinator, RedisSeasonCache, RunOutcome,
};
use std::path::PathBuf;
use storage::Database;
use storage::models::{RatingConfig, SeasonOrder};
use storage::services::RatingEngine;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "matchday")]
#[command(about = "Football match ingestion and Elo rating", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Ingest unprocessed seasons until done or out of call budget
    Ingest {
        #[command(flatten)]
        ingest: IngestArgs,
    },
    /// Re-fetch processed seasons and ingest fixtures that are missing
    Recheck {
        #[command(flatten)]
        ingest: IngestArgs,
    },
    /// Compute Elo and form for every unrated match
    Rate {
        #[arg(long, env = "RATING_CONFIG", default_value = "./config/rating_config.json")]
        config: PathBuf,
    },
}

#[derive(Args)]
struct IngestArgs {
    #[arg(long, env = "API_BASE_URL", default_value = "https://v3.football.api-sports.io")]
    api_base_url: String,

    #[arg(long, env = "API_KEY", hide_env_values = true)]
    api_key: String,

    #[arg(long, env = "API_HOST", default_value = DEFAULT_API_HOST)]
    api_host: String,

    #[arg(long, env = "REQUEST_DELAY_MS", default_value_t = DEFAULT_REQUEST_DELAY_MS)]
    request_delay_ms: u64,

    #[arg(long, env = "REDIS_URL", default_value = "redis://127.0.0.1:6379")]
    redis_url: String,

    /// Only fixtures on or after this date are stored
    #[arg(long, env = "ELIGIBLE_FROM")]
    eligible_from: Option<NaiveDate>,

    /// Only fixtures on or before this date are stored
    #[arg(long, env = "ELIGIBLE_UNTIL")]
    eligible_until: Option<NaiveDate>,

    #[arg(long, env = "SEASON_ORDER", default_value = "earliest")]
    season_order: SeasonOrder,

    #[arg(long, env = "BUDGET_THRESHOLD", default_value_t = BUDGET_THRESHOLD)]
    budget_threshold: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "matchday={},importer={},storage={}",
                    log_level, log_level, log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = cli
        .database_url
        .ok_or("DATABASE_URL must be set (or pass --database-url)")?;
    let db = Database::connect(&database_url).await?;

    match cli.command {
        Commands::Migrate => {
            db.run_migrations().await?;
            tracing::info!("Migrations applied");
        }
        Commands::Ingest { ingest } => {
            handle_ingest(&db, ingest).await?;
        }
        Commands::Recheck { ingest } => {
            handle_recheck(&db, ingest).await?;
        }
        Commands::Rate { config } => {
            handle_rate(&db, config).await?;
        }
    }

    Ok(())
}

async fn build_context(
    db: &Database,
    args: IngestArgs,
) -> Result<IngestContext<storage::PgStore, RedisSeasonCache, ApiFootballSource>, Box<dyn std::error::Error>> {
    let api = ApiSettings::new(args.api_base_url, args.api_key, args.api_host, args.request_delay_ms)?;
    let window = EligibleWindow::new(args.eligible_from, args.eligible_until)?;

    tracing::info!("Connecting to Redis...");
    let cache = RedisSeasonCache::connect(&args.redis_url).await?;

    Ok(IngestContext {
        store: db.store(),
        cache,
        source: ApiFootballSource::new(api)?,
        settings: IngestSettings {
            season_order: args.season_order,
            window,
            budget_threshold: args.budget_threshold,
        },
    })
}

async fn handle_ingest(db: &Database, args: IngestArgs) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = build_context(db, args).await?;
    tracing::info!(
        "Starting ingestion ({} seasons first)",
        ctx.settings.season_order
    );

    let outcome = IngestionCoordinator::new(&ctx).run().await?;
    match &outcome {
        RunOutcome::AllSeasonsProcessed => tracing::info!("✓ Every season is ingested"),
        RunOutcome::BudgetExhausted => {
            tracing::warn!("Stopped: API call budget exhausted, rerun once it resets")
        }
        RunOutcome::SeasonDeferred(key) => {
            tracing::warn!("Stopped: {} has fixtures left to retry", key)
        }
        RunOutcome::FetchFailed(key) => {
            tracing::error!("Stopped: fixture list for {} could not be fetched", key)
        }
    }

    Ok(())
}

async fn handle_recheck(db: &Database, args: IngestArgs) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = build_context(db, args).await?;
    let summary = IngestionCoordinator::new(&ctx)
        .recheck_processed_seasons()
        .await?;

    if summary.budget_exhausted {
        tracing::warn!("Re-check stopped early: API call budget exhausted");
    }
    tracing::info!(
        "Re-checked {} season(s): {} missing, {} recovered",
        summary.seasons_checked,
        summary.missing,
        summary.recovered
    );

    Ok(())
}

async fn handle_rate(db: &Database, config: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Loading rating configuration from: {}", config.display());
    let config = RatingConfig::load(&config).await?;
    let store = db.store();

    let summary = RatingEngine::new(&store, &config).run().await?;
    tracing::info!(
        "✓ Rated {} match(es), {} with form",
        summary.rated,
        summary.form_updates
    );

    Ok(())
}

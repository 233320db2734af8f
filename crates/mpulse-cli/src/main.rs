mod news;
mod query;
mod scrape;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use mpulse_core::{AppConfig, Ticker};
use tracing_subscriber::EnvFilter;

use crate::scrape::SourceSelection;

const DEFAULT_TICKER: &str = "RELIANCE";

#[derive(Debug, Parser)]
#[command(name = "mpulse-cli")]
#[command(about = "Market Pulse: stock news scraping and sentiment")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch headlines for a ticker, score them and store the result
    Scrape {
        #[arg(long, default_value = DEFAULT_TICKER)]
        ticker: Ticker,

        /// News source identifier, or `all` for every source with credentials
        #[arg(long, default_value = "newsapi")]
        source: SourceSelection,

        /// Start date (YYYY-MM-DD); defaults to 30 days before `--to`
        #[arg(long)]
        from: Option<NaiveDate>,

        /// End date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Fetch and score without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Show stored headlines with their sentiment
    Headlines {
        #[arg(long, default_value = DEFAULT_TICKER)]
        ticker: Ticker,

        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
    /// Show average sentiment per publication day
    Trend {
        #[arg(long, default_value = DEFAULT_TICKER)]
        ticker: Ticker,
    },
    /// List every stored ticker with its headline count and average sentiment
    Tickers,
    /// Summarize stored headlines for a ticker
    Summary {
        #[arg(long, default_value = DEFAULT_TICKER)]
        ticker: Ticker,
    },
    /// List large-cap Indian stocks
    Stocks,
    /// List news sources and whether each one is usable
    Sources,
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

async fn connect(config: &AppConfig) -> anyhow::Result<sqlx::SqlitePool> {
    let pool_config = mpulse_db::PoolConfig::from_app_config(config);
    let pool = mpulse_db::connect_pool(&config.database_url, pool_config).await?;
    Ok(pool)
}

/// Connect and bring the schema up to date before any read or write.
async fn connect_migrated(config: &AppConfig) -> anyhow::Result<sqlx::SqlitePool> {
    let pool = connect(config).await?;
    mpulse_db::run_migrations(&pool).await?;
    Ok(pool)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    let config = mpulse_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Scrape {
            ticker,
            source,
            from,
            to,
            dry_run,
        }) => {
            let pool = if dry_run {
                None
            } else {
                Some(connect_migrated(&config).await?)
            };
            let request = scrape::ScrapeRequest {
                ticker,
                sources: source,
                from,
                to,
            };
            scrape::run_scrape(&config, pool.as_ref(), &request).await?;
        }
        Some(Commands::Headlines { ticker, limit }) => {
            let pool = connect_migrated(&config).await?;
            query::run_headlines(&pool, &ticker, limit).await?;
        }
        Some(Commands::Trend { ticker }) => {
            let pool = connect_migrated(&config).await?;
            query::run_trend(&pool, &ticker).await?;
        }
        Some(Commands::Tickers) => {
            let pool = connect_migrated(&config).await?;
            query::run_tickers(&pool).await?;
        }
        Some(Commands::Summary { ticker }) => {
            let pool = connect_migrated(&config).await?;
            query::run_summary(&config, &pool, &ticker).await?;
        }
        Some(Commands::Stocks) => news::run_stocks(&config).await?,
        Some(Commands::Sources) => news::run_sources(&config)?,
        Some(Commands::Db { command }) => {
            let pool = connect(&config).await?;
            match command {
                DbCommands::Ping => {
                    mpulse_db::health_check(&pool).await?;
                    println!("database ok: {}", redact_url(&config.database_url));
                }
                DbCommands::Migrate => {
                    let applied = mpulse_db::run_migrations(&pool).await?;
                    println!("applied {applied} migration(s)");
                }
            }
        }
        None => {
            println!("mpulse-cli: run with --help to list commands");
        }
    }

    Ok(())
}

/// Database URL with any query string dropped for display.
fn redact_url(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}

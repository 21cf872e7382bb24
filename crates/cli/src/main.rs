use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use {
    anyhow::Context,
    clap::{Parser, Subcommand},
    secrecy::Secret,
    tokio_util::sync::CancellationToken,
    tracing::{error, info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    dealwatch_catalog::{CatalogStore, SqliteCatalogStore},
    dealwatch_config::DealwatchConfig,
    dealwatch_telegram::{ChannelFeedConfig, Listener},
};

#[derive(Parser)]
#[command(name = "dealwatch", about = "Dealwatch — Telegram deal-channel ingestion")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file path (overrides discovery).
    #[arg(long, global = true, env = "DEALWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database path (overrides the config value).
    #[arg(long, global = true, env = "DEALWATCH_DB")]
    database: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the deal listener (default when no subcommand is provided).
    Run,
    /// Validate the configuration and report problems.
    Check,
    /// Parse message text from a file (`-` for stdin) and print the
    /// candidates as JSON.
    Parse {
        /// Path of a text file, or `-` for stdin.
        file: String,
    },
}

/// Initialise tracing from `RUST_LOG` or the `--log-level` flag.
fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut cli = Cli::parse();
    init_telemetry(&cli);

    let command = cli.command.take().unwrap_or(Commands::Run);
    let config = load_config(&cli)?;

    match command {
        Commands::Run => run(config).await,
        Commands::Check => check(&config),
        Commands::Parse { file } => parse(&file),
    }
}

/// Load config from the explicit `--config` path or standard locations,
/// then layer env and flag overrides on top.
fn load_config(cli: &Cli) -> anyhow::Result<DealwatchConfig> {
    let mut config = match &cli.config {
        Some(path) => dealwatch_config::load_config(path)?,
        None => dealwatch_config::discover_and_load(),
    };
    dealwatch_config::apply_env_overrides(&mut config);
    if let Some(database) = &cli.database {
        config.catalog.database_path = database.clone();
    }
    Ok(config)
}

async fn run(config: DealwatchConfig) -> anyhow::Result<()> {
    if config.telegram.token.is_empty() {
        anyhow::bail!("no Telegram token configured (set telegram.token or DEALWATCH_TG_TOKEN)");
    }

    let allowlist = config.telegram.allowlist();
    if allowlist.is_empty() {
        warn!("channel allow-list is empty, no posts will be ingested");
    }

    let db_path = &config.catalog.database_path;
    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
    let store: Arc<dyn CatalogStore> = Arc::new(SqliteCatalogStore::new(&db_url).await?);
    info!(path = %db_path.display(), "catalog database ready");

    let feed = ChannelFeedConfig {
        token: Secret::new(config.telegram.token.clone()),
        allowlist,
        poll_timeout_secs: config.telegram.poll_timeout_secs,
        media_timeout_secs: config.telegram.media_timeout_secs,
    };

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
            shutdown.cancel();
        }
    });

    supervise(feed, store, cancel).await;
    Ok(())
}

/// Keep the listener alive: restart with exponential backoff on failure.
///
/// The backoff doubles up to a cap and resets after a run that stayed up
/// long enough to count as healthy, so a brief outage doesn't leave the
/// process stuck at the slowest retry cadence.
async fn supervise(feed: ChannelFeedConfig, store: Arc<dyn CatalogStore>, cancel: CancellationToken) {
    const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
    const MAX_BACKOFF: Duration = Duration::from_secs(60);
    const STEADY_RUN: Duration = Duration::from_secs(60);

    let mut backoff = INITIAL_BACKOFF;
    loop {
        let listener = Listener::new(feed.clone(), Arc::clone(&store));
        let started = Instant::now();

        match listener.run(cancel.clone()).await {
            Ok(()) => return,
            Err(e) => {
                if cancel.is_cancelled() {
                    return;
                }
                if started.elapsed() >= STEADY_RUN {
                    backoff = INITIAL_BACKOFF;
                }
                error!(
                    error = %e,
                    backoff_secs = backoff.as_secs(),
                    "listener failed, restarting"
                );
                tokio::select! {
                    () = cancel.cancelled() => return,
                    () = tokio::time::sleep(backoff) => {},
                }
                backoff = (backoff * 2).min(MAX_BACKOFF);
            },
        }
    }
}

fn check(config: &DealwatchConfig) -> anyhow::Result<()> {
    let mut fatal = false;

    if config.telegram.token.is_empty() {
        eprintln!("error: telegram.token is not set (and DEALWATCH_TG_TOKEN is empty)");
        fatal = true;
    }

    let allowlist = config.telegram.allowlist();
    if allowlist.is_empty() {
        eprintln!("warning: telegram.channels is empty, nothing will be ingested");
    } else {
        println!(
            "tracking {} channel(s): {}",
            allowlist.len(),
            allowlist.join(", ")
        );
    }
    println!("catalog database: {}", config.catalog.database_path.display());

    if fatal {
        anyhow::bail!("configuration is incomplete");
    }
    println!("configuration OK");
    Ok(())
}

fn parse(file: &str) -> anyhow::Result<()> {
    let text = if file == "-" {
        let mut buf = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf)?;
        buf
    } else {
        std::fs::read_to_string(file).with_context(|| format!("failed to read {file}"))?
    };

    let products = dealwatch_telegram::parser::parse_deals(&text);
    println!("{}", serde_json::to_string_pretty(&products)?);
    Ok(())
}

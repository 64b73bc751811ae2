//! # Cohort Cache Warmer
//!
//! Entry point invoked by the periodic scheduler. `run` performs one warming
//! run against the configured database and waits for the submitted chains to
//! finish; `validate` loads and checks the configuration without connecting.

use clap::{Parser, Subcommand};
use prometheus::Registry;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::{error, info, warn};

use cohort_cache_warmer::config::ConfigManager;
use cohort_cache_warmer::database::{DatabaseConnection, PgTeamStore};
use cohort_cache_warmer::execution::ChainWorker;
use cohort_cache_warmer::logging::{get_environment, init_structured_logging, log_run_operation};
use cohort_cache_warmer::messaging::LocalChainQueue;
use cohort_cache_warmer::metrics::{export_metrics, AtomicGauge, PrometheusGauge, ProgressGauge};
use cohort_cache_warmer::orchestration::{CacheWarmingOrchestrator, RunSummary};
use cohort_cache_warmer::warming::{SqlFunctionCacheWarmer, TeamWarmer};
use cohort_cache_warmer::{Result, WarmerError};

#[derive(Parser)]
#[command(name = "cohort-cache-warmer")]
#[command(about = "Warm the cohort dependency cache for every team with many cohorts")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Configuration directory (default: config)
    #[arg(short, long, env = "COHORT_WARMING_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Environment whose overrides to apply (development, test, production)
    #[arg(short, long)]
    environment: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Perform one warming run and wait for its chains
    Run,

    /// Load and validate configuration, then print it with secrets masked
    Validate,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_structured_logging();

    let result = match cli.command.as_ref().unwrap_or(&Commands::Run) {
        Commands::Run => run(&cli).await,
        Commands::Validate => validate(&cli),
    };

    if let Err(e) = result {
        error!(error = %e, "Cohort cache warming failed");
        process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Result<Arc<ConfigManager>> {
    let environment = cli.environment.clone().unwrap_or_else(get_environment);
    let directory = cli
        .config_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("config"));
    ConfigManager::load_from_directory_with_env(directory, &environment)
}

fn validate(cli: &Cli) -> Result<()> {
    let manager = load_config(cli)?;
    println!("Environment: {}", manager.environment());
    println!("Config Directory: {}", manager.config_directory().display());
    println!("{:#}", manager.debug_config());
    info!("Configuration validation completed successfully");
    Ok(())
}

async fn run(cli: &Cli) -> Result<()> {
    let manager = load_config(cli)?;
    let config = manager.config();

    let registry = Registry::new();
    let gauge: Arc<dyn ProgressGauge> = if config.metrics.enabled {
        Arc::new(PrometheusGauge::register(&registry)?)
    } else {
        Arc::new(AtomicGauge::new())
    };

    let db = DatabaseConnection::connect(&config.database).await?;
    if !db.health_check().await? {
        db.close().await;
        return Err(WarmerError::database("health_check", "unexpected health check result"));
    }
    let routine = SqlFunctionCacheWarmer::new(
        db.pool().clone(),
        &config.database.warm_function,
        config.database.warm_function_arg_type,
    )?;
    let team_warmer =
        TeamWarmer::new(Arc::new(routine)).with_max_retries(config.warming.team_warm_max_retries);
    let worker = ChainWorker::new(team_warmer, gauge.clone());
    let queue = Arc::new(LocalChainQueue::new(worker, &config.queue));
    let store = Arc::new(PgTeamStore::new(db.pool().clone()));

    let orchestrator = CacheWarmingOrchestrator::new(store, queue.clone(), gauge.clone(), config)?;

    let outcome = orchestrator.run().await;
    // Chains already submitted still run to completion or expiry
    let reports = queue.shutdown().await;
    let expired = reports.iter().filter(|report| report.expired).count();
    let failed: usize = reports.iter().map(|report| report.failed()).sum();

    let summary = match outcome {
        Ok(summary) => summary,
        Err(e) => {
            log_run_operation("warm_all_teams", "failed", None, None, None, Some(&e.to_string()));
            db.close().await;
            return Err(e);
        }
    };

    log_run_operation(
        "warm_all_teams",
        "success",
        Some(summary.teams_found),
        Some(summary.teams_scheduled),
        Some(summary.failed_teams),
        None,
    );
    info!(
        chains = reports.len(),
        expired_chains = expired,
        failed_team_warms = failed,
        active_chains = gauge.value(),
        "Submitted chains finished"
    );
    if gauge.value() != 0 {
        warn!(active_chains = gauge.value(), "Active chains gauge did not return to zero");
    }
    let metrics = if config.metrics.enabled {
        Some(export_metrics(&registry)?)
    } else {
        None
    };
    write_report(
        &summary,
        metrics.as_deref(),
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    )?;

    db.close().await;
    Ok(())
}

/// The summary JSON is the only thing written to `out`; metrics go to `diagnostics`
fn write_report(
    summary: &RunSummary,
    metrics: Option<&str>,
    out: &mut impl Write,
    diagnostics: &mut impl Write,
) -> Result<()> {
    if let Some(metrics) = metrics {
        diagnostics.write_all(metrics.as_bytes())?;
        diagnostics.flush()?;
    }
    writeln!(out, "{}", summary.to_json())?;
    out.flush()?;
    Ok(())
}

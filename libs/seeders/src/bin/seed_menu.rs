use std::{process::ExitCode, sync::Arc, time::Instant};

use anyhow::{Context, Result};
use appwrite_connection::{AppwriteClient, AppwriteConfig};
use clap::Parser;
use menu_models::SeedDataset;
use seeders::{
    HttpAssetFetcher, ProgressTracker, RunReport, SeedConfig, SeedRunner,
    cli::{Cli, Commands},
    cli_progress::CliProgress,
};
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_filter = if cli.quiet {
        "warn"
    } else {
        "seeders=info,appwrite_connection=info"
    };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let start_time = Instant::now();

    let store_config =
        AppwriteConfig::from_env().context("Invalid Appwrite settings")?;
    let mut config =
        SeedConfig::from_env().context("Invalid seeding settings")?;
    cli.apply(&mut config);

    let client = AppwriteClient::new(store_config.clone())
        .context("Failed to build Appwrite client")?;
    let fetcher = HttpAssetFetcher::new(
        config.scratch_dir.clone(),
        store_config.request_timeout(),
    )
    .context("Failed to build HTTP asset fetcher")?;

    let dataset = match cli.command() {
        Commands::Run => {
            let dataset = SeedDataset::from_json_file(&cli.data)
                .with_context(|| {
                    format!("Failed to load dataset {}", cli.data.display())
                })?;
            info!(
                "Loaded {} categories, {} customizations, {} menu items \
                 from {}",
                dataset.categories.len(),
                dataset.customizations.len(),
                dataset.menu.len(),
                cli.data.display()
            );
            dataset
        }
        Commands::Erase => SeedDataset::default(),
    };

    let runner =
        SeedRunner::new(config, Arc::new(client), Arc::new(fetcher));

    let show_progress = !cli.quiet && !cli.json;
    let report = if show_progress {
        match CliProgress::new() {
            Ok(mut progress_ui) => {
                let (progress_tracker, progress_rx) = ProgressTracker::new();
                let runner = runner.with_progress(progress_tracker.clone());

                let seeding = async {
                    let report =
                        execute(&runner, cli.command(), &dataset).await;
                    progress_tracker.finish();
                    report
                };
                let (report, ()) =
                    tokio::join!(seeding, progress_ui.run(progress_rx));
                report
            }
            Err(e) => {
                info!(
                    "Failed to initialize progress UI, falling back to \
                     quiet mode: {}",
                    e
                );
                execute(&runner, cli.command(), &dataset).await
            }
        }
    } else {
        execute(&runner, cli.command(), &dataset).await
    };

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report)
                .context("Failed to serialize run report")?
        );
    }

    let total_time = start_time.elapsed();
    if report.is_success() {
        info!(
            "Seeding completed: deleted {}, created {} in {:.2}s",
            report.deleted.total(),
            report.created.total(),
            total_time.as_secs_f64()
        );
        if !report.skipped_items.is_empty() {
            warn!(
                "Skipped {} menu items with unresolved references",
                report.skipped_items.len()
            );
        }
        Ok(ExitCode::SUCCESS)
    } else {
        if let Some(failure) = &report.failure {
            error!(
                "Seeding failed during {} after {:.2}s: {}",
                failure.stage,
                total_time.as_secs_f64(),
                failure.message
            );
        }
        Ok(ExitCode::FAILURE)
    }
}

async fn execute(
    runner: &SeedRunner, command: Commands, dataset: &SeedDataset,
) -> RunReport {
    match command {
        Commands::Run => runner.run(dataset).await,
        Commands::Erase => runner.erase_only().await,
    }
}

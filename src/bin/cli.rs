//! CLI binary for verdant.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use verdant::calendar::dates::{format_date_only, parse_date_only, today_utc};
use verdant::calendar::{GenerationWindow, TaskSchedule, generate_tasks};
use verdant::notifications::{
    MemoryNotificationClient, NotificationReconciler, NotificationScheduler,
};
use verdant::{CareConfig, CareTask};

/// Verdant: recurring plant-care tasks and reminders.
#[derive(Parser)]
#[command(name = "verdant", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Expand a schedule (JSON) into task occurrences.
    Generate {
        /// Schedule JSON file.
        #[arg(short, long)]
        schedule: PathBuf,
        /// Last date to generate (YYYY-MM-DD). Defaults to start + horizon.
        #[arg(short, long)]
        end: Option<String>,
        /// Stop after this many tasks.
        #[arg(short, long)]
        max: Option<usize>,
    },

    /// Show the reminders that should be scheduled for a task list (JSON).
    Preview {
        /// Task list JSON file.
        #[arg(short, long)]
        tasks: PathBuf,
        /// Reference date (YYYY-MM-DD). Defaults to today (UTC).
        #[arg(long)]
        today: Option<String>,
    },

    /// Reconcile a task list against an in-memory scheduler twice and report.
    SyncDemo {
        /// Task list JSON file.
        #[arg(short, long)]
        tasks: PathBuf,
        /// Reference date (YYYY-MM-DD). Defaults to today (UTC).
        #[arg(long)]
        today: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Users can override with RUST_LOG=debug to see generation details.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("verdant=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => CareConfig::from_file(path)?,
        None => {
            let default_path = CareConfig::default_config_path();
            if default_path.exists() {
                CareConfig::from_file(&default_path)?
            } else {
                CareConfig::default()
            }
        }
    };

    match cli.command {
        Command::Generate { schedule, end, max } => run_generate(&config, &schedule, end, max),
        Command::Preview { tasks, today } => run_preview(&config, &tasks, today.as_deref()),
        Command::SyncDemo { tasks, today } => {
            run_sync_demo(&config, &tasks, today.as_deref()).await
        }
    }
}

fn run_generate(
    config: &CareConfig,
    path: &Path,
    end: Option<String>,
    max: Option<usize>,
) -> anyhow::Result<()> {
    let schedule: TaskSchedule = read_json(path)?;
    let end_date = match end {
        Some(end) => end,
        None => {
            let start = parse_date_only(&schedule.start_date)
                .with_context(|| format!("invalid start date {:?}", schedule.start_date))?;
            format_date_only(config.window_end(start))
        }
    };
    let mut window = GenerationWindow::until(end_date);
    window.max_tasks = max;

    let tasks = generate_tasks(&schedule, &window)?;
    info!("generated {} tasks for {}", tasks.len(), schedule.plant_name);
    println!("{}", serde_json::to_string_pretty(&tasks)?);
    Ok(())
}

fn run_preview(config: &CareConfig, path: &Path, today: Option<&str>) -> anyhow::Result<()> {
    let tasks: Vec<CareTask> = read_json(path)?;
    let today = resolve_today(today)?;
    let reconciler = NotificationReconciler::new(NotificationScheduler::new(Arc::new(
        MemoryNotificationClient::granted(),
    )));
    let (target, failures) = reconciler.target_set(&tasks, today, config.reminder_options());
    for failure in &failures {
        eprintln!("skipped {}: {}", failure.id, failure.error);
    }
    let payloads: Vec<_> = target.into_values().collect();
    println!("{}", serde_json::to_string_pretty(&payloads)?);
    Ok(())
}

async fn run_sync_demo(
    config: &CareConfig,
    path: &Path,
    today: Option<&str>,
) -> anyhow::Result<()> {
    let tasks: Vec<CareTask> = read_json(path)?;
    let today = resolve_today(today)?;
    let client = Arc::new(MemoryNotificationClient::granted());
    let reconciler = NotificationReconciler::new(NotificationScheduler::new(client.clone()));

    for pass in 1..=2 {
        let report = reconciler.sync_with_config(&tasks, config, today).await?;
        println!(
            "pass {pass}: scheduled {}, rescheduled {}, canceled {}, unchanged {}, failed {}",
            report.scheduled.len(),
            report.rescheduled.len(),
            report.canceled.len(),
            report.unchanged,
            report.failures.len()
        );
        for failure in &report.failures {
            println!("  {} {}: {}", failure.op, failure.id, failure.error);
        }
    }
    println!("{} reminders held", client.records().len());
    Ok(())
}

fn resolve_today(value: Option<&str>) -> anyhow::Result<NaiveDate> {
    match value {
        Some(v) => parse_date_only(v)
            .with_context(|| format!("invalid date {v:?}, expected YYYY-MM-DD")),
        None => Ok(today_utc()),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("cannot parse {}", path.display()))
}

//! Queuelength CLI - load generator and operator client for the worker service

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use reqwest::StatusCode;
use serde::Deserialize;
use tabled::{Table, Tabled};

const DEFAULT_URL: &str = "http://127.0.0.1:8080";

#[derive(Parser)]
#[command(name = "queuelength-cli")]
#[command(about = "Queuelength worker service CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Service base URL
    #[arg(long, env = "QUEUELENGTH_URL", default_value = DEFAULT_URL)]
    url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit simulated work
    Work {
        /// How long each job runs (e.g. 2s, 500ms)
        #[arg(short, long)]
        delay: String,

        /// Number of jobs to submit
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,
    },

    /// Stop reporting queue length to the autoscaler
    Stop,

    /// Show service status
    Status,
}

#[derive(Tabled, Default)]
struct WorkSummary {
    submitted: usize,
    created: usize,
    rejected: usize,
    invalid: usize,
    failed: usize,
}

#[derive(Deserialize)]
struct Health {
    status: String,
    version: String,
    queue_length: usize,
    queue_capacity: usize,
    workers: usize,
    admission: String,
    reporter: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let base = cli.url.trim_end_matches('/');
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Work { delay, count } => {
            let mut summary = WorkSummary {
                submitted: count,
                ..Default::default()
            };
            let mut last_error = None;

            for _ in 0..count {
                let response = client
                    .post(format!("{}/work", base))
                    .query(&[("delay", delay.as_str())])
                    .send()
                    .await
                    .context("Failed to connect to service")?;

                match response.status() {
                    StatusCode::CREATED => summary.created += 1,
                    StatusCode::SERVICE_UNAVAILABLE => summary.rejected += 1,
                    StatusCode::BAD_REQUEST => {
                        summary.invalid += 1;
                        last_error = Some(response.text().await.unwrap_or_default());
                    }
                    other => {
                        summary.failed += 1;
                        last_error = Some(format!("unexpected status {}", other));
                    }
                }
            }

            if summary.created == count {
                println!("{}", "✓ All jobs admitted".green().bold());
            } else {
                println!("{}", "! Some jobs were not admitted".yellow().bold());
            }
            println!();
            println!("{}", Table::new(vec![summary]));
            if let Some(err) = last_error {
                println!("{} {}", "Last error:".bold(), err.trim());
            }
        }

        Commands::Stop => {
            let response = client
                .post(format!("{}/emitStop", base))
                .send()
                .await
                .context("Failed to connect to service")?;

            match response.status() {
                StatusCode::OK => println!("{}", "✓ Metric reporting stopped".green().bold()),
                StatusCode::CONFLICT => println!("{}", "○ Metric reporting was already stopped".yellow()),
                other => anyhow::bail!("Unexpected status {}", other),
            }
        }

        Commands::Status => {
            println!("{}", "Service Status".cyan().bold());
            println!();

            let result = async {
                client
                    .get(format!("{}/health", base))
                    .send()
                    .await?
                    .error_for_status()?
                    .json::<Health>()
                    .await
            }
            .await;

            match result {
                Ok(health) => {
                    println!("  {} {}", "URL:".bold(), base);
                    println!("  {} {} (v{})", "Status:".bold(), health.status.to_uppercase().green(), health.version);
                    println!();
                    println!("  {} {} / {}", "Queue:".bold(), health.queue_length, health.queue_capacity);
                    println!("  {} {}", "Workers:".bold(), health.workers);
                    println!("  {} {}", "Admission:".bold(), health.admission);
                    println!("  {} {}", "Reporter:".bold(), health.reporter);
                }
                Err(e) => {
                    println!("  {} {}", "Status:".bold(), "ERROR".red());
                    println!("  {} {}", "Error:".bold(), e);
                }
            }
        }
    }

    Ok(())
}

use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};
use metaphor::health::HealthStatus;
use metaphor::simulation::PerformanceReport;
use metaphor::views;

#[derive(Parser)]
#[command(name = "metaphor-cli")]
#[command(about = "Check and verify a running metaphor deployment", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000", env = "METAPHOR_URL")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the liveness endpoint
    Healthz,
    /// Fire concurrent latency-simulation calls and compare reported vs observed delay
    Performance {
        #[arg(short, long, default_value_t = 1)]
        count: usize,
    },
    /// Trigger the kill switch
    Kill,
    /// Fetch the index page and check every expected value is rendered (HTML-escaped)
    Verify {
        #[arg(short, long = "expect", required = true)]
        expect: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Healthz => {
            let res = client.get(format!("{base}/healthz")).send().await?;
            let status = res.status();
            let body: serde_json::Value = res.json().await?;
            println!("{status} {body}");
            if !status.is_success() || body != serde_json::to_value(HealthStatus::OK)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Performance { count } => {
            let mut calls = tokio::task::JoinSet::new();
            for i in 0..count {
                let client = client.clone();
                let url = format!("{base}/performance");
                calls.spawn(async move {
                    let start = Instant::now();
                    let report = client.get(url).send().await?.json::<PerformanceReport>().await?;
                    Ok::<_, reqwest::Error>((i, report, start.elapsed()))
                });
            }
            while let Some(done) = calls.join_next().await {
                let (i, report, elapsed) = done??;
                println!(
                    "call {i}: sleepTime={}ms observed={}ms",
                    report.sleep_time,
                    elapsed.as_millis()
                );
            }
        }
        Commands::Kill => {
            let res = client.get(format!("{base}/kill")).send().await?;
            println!("{}", res.status());
            if !res.status().is_success() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Verify { expect } => {
            let page = client.get(format!("{base}/")).send().await?.text().await?;
            let missing: Vec<&String> = expect.iter().filter(|s| !views::shows_value(&page, s)).collect();
            for s in &missing {
                eprintln!("missing: {s}");
            }
            if !missing.is_empty() {
                return Ok(ExitCode::FAILURE);
            }
            println!("all {} expected strings present", expect.len());
        }
    }

    Ok(ExitCode::SUCCESS)
}

//! CLI definition and wiring of the provisioning run.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use crate::config::ProvisionConfig;
use crate::engine::{endpoint, DockerEngine};
use crate::probe::PgProbe;
use crate::provision::Orchestrator;

/// Provision a containerized database and wait until it accepts connections.
#[derive(Parser, Debug)]
#[command(name = "dbforge")]
#[command(about = "Ensure a database container is running and ready")]
#[command(version)]
pub struct Cli {
    /// Image repository.
    #[arg(long, default_value = "postgres")]
    pub image: String,

    /// Image tag.
    #[arg(long, default_value = "16-alpine")]
    pub tag: String,

    /// Logical container name used for reuse across runs.
    #[arg(long, default_value = "dbforge-db")]
    pub name: String,

    /// Database port, published 1:1 on the host.
    #[arg(long, default_value = "5432")]
    pub port: u16,

    /// Database superuser name.
    #[arg(long, default_value = "postgres")]
    pub user: String,

    /// Database password.
    #[arg(long, env = "DB_PASSWORD", default_value = "postgres", hide_env_values = true)]
    pub password: String,

    /// Extra container environment variables (KEY=VALUE, repeatable).
    #[arg(long = "env", value_name = "KEY=VALUE")]
    pub extra_env: Vec<String>,

    /// Readiness budget in seconds when reusing a running container.
    #[arg(long, default_value = "10")]
    pub warm_timeout_secs: u64,

    /// Readiness budget in seconds for a cold start.
    #[arg(long, default_value = "120")]
    pub cold_timeout_secs: u64,

    /// Seconds between readiness probe attempts.
    #[arg(long, default_value = "1")]
    pub poll_interval_secs: u64,

    /// Print the provisioning report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Parses command-line arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Builds the provisioning configuration from CLI arguments.
fn build_config(cli: &Cli) -> ProvisionConfig {
    let mut config = ProvisionConfig::new(&cli.image, &cli.tag, &cli.name, cli.port)
        .with_env("POSTGRES_USER", &cli.user)
        .with_env("POSTGRES_PASSWORD", &cli.password)
        .with_timeouts(
            Duration::from_secs(cli.warm_timeout_secs),
            Duration::from_secs(cli.cold_timeout_secs),
        )
        .with_poll_interval(Duration::from_secs(cli.poll_interval_secs));
    config.env.extend(cli.extra_env.iter().cloned());
    config
}

/// Runs the provisioning with parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    let endpoint = endpoint::resolve()?;
    info!(endpoint = %endpoint.address(), "Resolved container engine endpoint");

    let engine = Arc::new(DockerEngine::connect(&endpoint)?);
    let probe = Arc::new(PgProbe::for_local(cli.port, &cli.user, &cli.password));
    let config = build_config(&cli);

    let orchestrator = Orchestrator::new(engine, probe, config);
    let report = orchestrator.ensure_database_container_running().await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        info!(
            container = %report.container_name,
            id = %report.container_id,
            reused = report.reused,
            evicted = report.removed.len(),
            attempts = report.probe_attempts,
            "Database container ready"
        );
    }

    Ok(())
}

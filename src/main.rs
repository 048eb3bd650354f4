//! BICS Agent CLI
//!
//! Starts the plugin registry, lists what it holds, or calls a single
//! operation from the command line.

use anyhow::{Context, Result};
use bics_agent::{AgentConfiguration, ApiKind, BicsAgent, Telemetry};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "bics-agent")]
#[command(about = "BICS Agent - API plugins for the BICS platform", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file (default: $BICS_AGENT_CONFIG, ./application.yml, then the bundled one)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log directory (default: <data_dir>/bics-agent/logs)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the agent and wait for Ctrl-C
    Run,

    /// List registered plugins and their operations
    Plugins,

    /// Show the resolved base URL of every API
    Endpoints,

    /// Call one plugin operation and print the response body
    Call {
        /// Plugin name, e.g. SMSAPI
        plugin: String,

        /// Operation name, e.g. send_sms
        operation: String,

        /// Arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let log_dir = cli
        .log_dir
        .clone()
        .unwrap_or_else(bics_agent::telemetry::default_log_dir);
    let telemetry = Arc::new(Telemetry::init(&log_dir, cli.verbose)?);

    let config = Arc::new(
        AgentConfiguration::load(cli.config.as_deref()).context("Failed to load configuration")?,
    );
    let agent = BicsAgent::new(config).with_telemetry(telemetry.clone());

    match cli.command {
        Some(Commands::Plugins) => {
            agent.start()?;
            show_plugins(&agent);
            agent.stop();
        }
        Some(Commands::Endpoints) => show_endpoints(agent.config()),
        Some(Commands::Call {
            plugin,
            operation,
            args,
        }) => {
            let args: serde_json::Value =
                serde_json::from_str(&args).context("--args must be valid JSON")?;

            agent.start()?;
            let result = agent.invoke(&plugin, &operation, &args).await;
            agent.stop();

            println!("{}", result?);
            println!("---");
            println!("{}", telemetry.stats());
        }
        Some(Commands::Run) | None => run_until_interrupted(&agent).await?,
    }

    Ok(())
}

async fn run_until_interrupted(agent: &BicsAgent) -> Result<()> {
    agent.start()?;

    println!("BICS Agent");
    println!("Session: {}", agent.telemetry().session_id());
    if let Some(dir) = agent.telemetry().log_dir() {
        println!("Logs: {}", dir.display());
    }
    println!("Plugins: {}", agent.plugin_names().join(", "));
    println!("Press Ctrl-C to stop.");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    agent.stop();
    println!("{}", agent.telemetry().stats());
    Ok(())
}

fn show_plugins(agent: &BicsAgent) {
    for (name, plugin) in agent.all_plugins() {
        println!("{} ({})", name, plugin.base_url());
        for op in plugin.operations() {
            println!("  {:28} {}", op.name, op.description);
        }
    }
}

fn show_endpoints(config: &AgentConfiguration) {
    println!("Configuration: {}\n", config.origin());
    for kind in ApiKind::ALL {
        println!(
            "  {:30} {:24} {}",
            kind.plugin_name(),
            kind.config_key(),
            config.base_url(kind)
        );
    }
}

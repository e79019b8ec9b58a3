//! gateway-cli: submit and evaluate transactions against an in-process network.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, warn};

use gateway_cli::{connect, parse_line, run_step, GatewayClientConfig, Mode, Step};
use lp_telemetry::{init_telemetry, TelemetryConfig};

/// Ledger gateway client
#[derive(Parser, Debug)]
#[command(name = "gateway-cli")]
#[command(about = "Submit and evaluate ledger transactions")]
struct Args {
    /// Client configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Channel to use, overriding the configuration
    #[arg(long)]
    channel: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Endorse, order and commit a transaction
    Submit {
        contract: String,
        function: String,
        args: Vec<String>,
    },
    /// Query a peer without committing
    Evaluate {
        contract: String,
        function: String,
        args: Vec<String>,
    },
    /// Run `submit`/`evaluate` lines from a file against one network
    Script { path: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_telemetry(&TelemetryConfig::for_service("gateway-cli"))?;

    let mut config = match &args.config {
        Some(path) => GatewayClientConfig::load(path)?,
        None => GatewayClientConfig::default(),
    }
    .with_env_overrides();
    if let Some(channel) = args.channel {
        config.channel = channel;
    }
    if config.signing_key.is_none() {
        warn!("No signing_key configured, using an ephemeral key");
    }

    let connection = connect(&config)?;
    let steps = match args.command {
        Command::Submit {
            contract,
            function,
            args,
        } => vec![Step {
            mode: Mode::Submit,
            contract,
            function,
            args,
        }],
        Command::Evaluate {
            contract,
            function,
            args,
        } => vec![Step {
            mode: Mode::Evaluate,
            contract,
            function,
            args,
        }],
        Command::Script { path } => {
            let script = std::fs::read_to_string(&path)
                .with_context(|| format!("reading script {}", path.display()))?;
            let mut steps = Vec::new();
            for (number, line) in script.lines().enumerate() {
                let step = parse_line(line)
                    .map_err(anyhow::Error::msg)
                    .with_context(|| format!("{}:{}", path.display(), number + 1))?;
                steps.extend(step);
            }
            steps
        }
    };

    for step in &steps {
        match run_step(&connection.context, &connection.channel, step).await {
            Ok(outcome) => println!("{outcome}"),
            Err(e) => {
                if e.is_indeterminate() {
                    error!(error = %e, "Transaction outcome unknown, check its status before retrying");
                }
                return Err(e).with_context(|| format!("{} {}", step.contract, step.function));
            }
        }
    }
    Ok(())
}

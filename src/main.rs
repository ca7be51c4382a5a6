use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use poker_adviser::web;
use poker_adviser::{AdviserConfig, Engine, ReplayConfig, Replayer};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "poker-adviser",
    version,
    about = "Real-time GTO + exploit poker adviser",
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON config file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable ANSI colors in CLI output
    #[arg(long = "no-color", global = true, default_value_t = false)]
    no_color: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the HTTP adviser
    Serve {
        /// Address to bind (HOST:PORT)
        #[arg(long, default_value = "0.0.0.0:8080")]
        addr: String,
    },
    /// Feed a recorded event file through the engine and print the decision
    Replay {
        /// JSON array or JSON-lines file of events
        file: PathBuf,

        /// Exploit weight in [0, 1]; the config default applies when omitted
        #[arg(long)]
        lambda: Option<f32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    init_tracing();

    let config = match &cli.config {
        Some(path) => AdviserConfig::load(path)?,
        None => AdviserConfig::default(),
    };
    let engine = Engine::new(config)?;

    match cli.command {
        Commands::Serve { addr } => run_server(addr, engine).await?,
        Commands::Replay { file, lambda } => {
            let replayer = Replayer::new(
                engine,
                ReplayConfig {
                    lambda,
                    no_color: cli.no_color,
                },
            );
            replayer.run(&file)?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run_server(addr: String, engine: Engine) -> Result<()> {
    let addr: SocketAddr = addr
        .parse()
        .with_context(|| format!("invalid bind address {addr}"))?;
    web::serve(addr, engine).await
}

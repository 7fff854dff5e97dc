mod scenarios;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "eventide")]
#[command(about = "Replay event-loop ordering scenarios", long_about = None)]
struct Cli {
    /// Show per-turn scheduler traces
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synchronous code, a zero-delay timer and a resolved promise
    Basic,
    /// Next-tick callbacks against promises and timers
    NextTick,
    /// A timer-produced value consumed by a reaction
    Fetch {
        /// Delay hint recorded on the timer, in milliseconds
        #[arg(long, default_value_t = 1000)]
        delay_ms: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let transcript = match &cli.command {
        Commands::Basic => scenarios::basic()?,
        Commands::NextTick => scenarios::next_tick()?,
        Commands::Fetch { delay_ms } => scenarios::fetch(Duration::from_millis(*delay_ms))?,
    };

    for line in &transcript.lines {
        println!("{}", line);
    }

    let stats = transcript.report.stats;
    tracing::info!(
        executed = stats.executed(),
        failed = stats.failed(),
        "scenario finished"
    );
    if stats.failed() > 0 {
        anyhow::bail!("{} action(s) failed", stats.failed());
    }

    Ok(())
}

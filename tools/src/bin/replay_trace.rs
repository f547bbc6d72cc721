use anyhow::{Context, Result};
use clap::Parser;
use imegate_core::HandlerConfig;
use imegate_tools::{replay, Script};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Replay a script of host lifecycle notifications through the
/// reconfiguration gate and print what reaches the session controller.
#[derive(Parser)]
#[command(name = "replay_trace", version)]
struct Args {
    /// Script of notifications and clock advances (TOML)
    #[arg(long)]
    script: PathBuf,

    /// Handler timing overrides (TOML); defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the trace as a JSON array
    #[arg(long)]
    json: bool,

    /// Log filter, e.g. "debug" or "imegate_core=trace"
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = match &args.config {
        Some(path) => HandlerConfig::load_toml(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => HandlerConfig::default(),
    };
    let script = Script::load(&args.script)?;
    let trace = replay(&script, config);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&trace)?);
    } else {
        for line in &trace {
            println!("{line}");
        }
    }
    Ok(())
}

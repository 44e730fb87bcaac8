//! HoloNet console - hand-gesture globe control, headless host.
//!
//! Plays recorded landmark frames through the gesture pipeline and reports
//! HUD state; without a replay script it runs the offline demo.

use std::path::PathBuf;

use clap::Parser;
use holonet_console::backend::{self, HeadlessConfig};
use holonet_console::gesture::orchestrator::{
    FrameOrchestrator, HandDetector, OrchestratorConfig, StaleFramePolicy,
};
use holonet_console::replay::ScriptedDetector;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "holonet-console", about = "HoloNet gesture console")]
struct Cli {
    /// Replay script of landmark frames (omit for offline mode)
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Restart the replay script when it runs out
    #[arg(long)]
    loop_replay: bool,

    /// Viewport aspect ratio (width / height) used to unproject the grab
    #[arg(long, default_value_t = 16.0 / 9.0)]
    aspect: f32,

    /// Ticks per second
    #[arg(long, default_value_t = 30)]
    tick_rate: u32,

    /// Exit after N seconds
    #[arg(long)]
    exit_after: Option<u64>,

    /// Print each HUD snapshot to stdout as an s-expression
    #[arg(long)]
    emit_hud: bool,

    /// Ticks without a new frame: empty or hold-previous
    #[arg(long, default_value = "empty")]
    stale_policy: String,

    /// Print the active configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Show version and exit
    #[arg(long)]
    version: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("holonet-console {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "holonet_console=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("holonet-console v{} starting", env!("CARGO_PKG_VERSION"));

    let stale_policy = match StaleFramePolicy::parse(&cli.stale_policy) {
        Some(policy) => policy,
        None => {
            eprintln!(
                "Unknown stale policy: {}. Use: empty or hold-previous",
                cli.stale_policy
            );
            std::process::exit(1);
        }
    };

    let tick_interval_ms = HeadlessConfig::interval_for_rate(cli.tick_rate).ok_or_else(|| {
        anyhow::anyhow!("tick rate must be between 1 and 1000 Hz, got {}", cli.tick_rate)
    })?;

    if !(cli.aspect.is_finite() && cli.aspect > 0.0) {
        return Err(anyhow::anyhow!("aspect ratio must be positive, got {}", cli.aspect));
    }

    let mut config = OrchestratorConfig {
        stale_policy,
        budget_ms: tick_interval_ms as f64,
        ..Default::default()
    };
    config.camera.aspect = cli.aspect;

    // A missing or unreadable script is not fatal: run offline instead.
    let detector: Option<Box<dyn HandDetector>> = match &cli.replay {
        Some(path) => match ScriptedDetector::from_file(path, cli.loop_replay) {
            Ok(d) => Some(Box::new(d)),
            Err(e) => {
                warn!("replay unavailable: {:#}", e);
                None
            }
        },
        None => None,
    };

    let orchestrator = FrameOrchestrator::new(config, detector);

    let headless = HeadlessConfig {
        tick_interval_ms,
        exit_after: cli.exit_after,
        emit_hud: cli.emit_hud,
        ..Default::default()
    };

    if cli.print_config {
        println!("{}", orchestrator.config_sexp());
        println!("{}", headless.config_sexp());
        return Ok(());
    }

    backend::run(orchestrator, headless)
}

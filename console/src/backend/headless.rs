//! Headless backend: ticks the orchestrator on a fixed interval with no
//! window or audio device.
//!
//! Stage side effects go to the log, HUD snapshots optionally go to stdout
//! as one s-expression per line, and SIGINT/SIGTERM or the exit timer end
//! the loop cleanly.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use calloop::timer::{TimeoutAction, Timer};
use calloop::EventLoop;
use tracing::{info, warn};

use crate::gesture::elimination::{AudioCue, Speech};
use crate::gesture::orchestrator::{EffectSink, FrameOrchestrator};

/// Global flag set by SIGTERM/SIGINT handlers.
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Headless loop configuration.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Interval between ticks in milliseconds.
    pub tick_interval_ms: u64,
    /// Exit after N seconds.
    pub exit_after: Option<u64>,
    /// Seconds between status log lines.
    pub status_interval_s: u64,
    /// Print every HUD snapshot to stdout.
    pub emit_hud: bool,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 33,
            exit_after: None,
            status_interval_s: 10,
            emit_hud: false,
        }
    }
}

impl HeadlessConfig {
    /// Tick interval in milliseconds for a rate in Hz.  Rates outside
    /// 1..=1000 are rejected.
    pub fn interval_for_rate(hz: u32) -> Option<u64> {
        if (1..=1000).contains(&hz) {
            Some((1000 / hz) as u64)
        } else {
            None
        }
    }

    pub fn config_sexp(&self) -> String {
        format!(
            "(:tick-interval-ms {} :exit-after {} :status-interval-s {} :emit-hud {})",
            self.tick_interval_ms,
            self.exit_after
                .map(|s| s.to_string())
                .unwrap_or_else(|| "nil".to_string()),
            self.status_interval_s,
            if self.emit_hud { "t" } else { "nil" },
        )
    }
}

/// Effect sink that logs cues and speech instead of playing them.
#[derive(Debug, Default)]
pub struct TracingEffects {
    pub cues_played: u64,
    pub lines_spoken: u64,
}

impl EffectSink for TracingEffects {
    fn play_cue(&mut self, cue: AudioCue) {
        self.cues_played += 1;
        info!("audio cue: {}", cue.as_str());
    }

    fn speak(&mut self, speech: &Speech) {
        self.lines_spoken += 1;
        info!("speech ({:.1}s): {}", speech.duration_s, speech.text);
    }
}

/// Everything the tick callback mutates.
struct Session {
    orchestrator: FrameOrchestrator,
    effects: TracingEffects,
    start: Instant,
    emit_hud: bool,
    running: bool,
}

impl Session {
    fn tick(&mut self) {
        let now_s = self.start.elapsed().as_secs_f64();
        let hud = self.orchestrator.tick(now_s, &mut self.effects);
        if self.emit_hud {
            let mut out = std::io::stdout().lock();
            if let Err(e) = writeln!(out, "{}", hud.to_sexp()) {
                warn!("failed to write HUD snapshot: {}", e);
                self.running = false;
            }
        }
    }
}

/// Install signal handlers for graceful shutdown (SIGTERM, SIGINT).
fn install_signal_handlers() {
    unsafe {
        libc::signal(libc::SIGTERM, signal_handler as libc::sighandler_t);
        libc::signal(libc::SIGINT, signal_handler as libc::sighandler_t);
    }
}

extern "C" fn signal_handler(_sig: libc::c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

/// Run the orchestrator until a signal, the exit timer, or a stdout failure.
pub fn run(orchestrator: FrameOrchestrator, config: HeadlessConfig) -> anyhow::Result<()> {
    let mut event_loop = EventLoop::<Session>::try_new()
        .map_err(|e| anyhow::anyhow!("failed to create event loop: {}", e))?;
    let handle = event_loop.handle();

    let interval = Duration::from_millis(config.tick_interval_ms.max(1));
    let tick_token = handle
        .insert_source(Timer::immediate(), move |_deadline, _, session| {
            session.tick();
            TimeoutAction::ToDuration(interval)
        })
        .map_err(|e| anyhow::anyhow!("failed to register tick timer: {}", e.error))?;

    install_signal_handlers();

    let mut session = Session {
        orchestrator,
        effects: TracingEffects::default(),
        start: Instant::now(),
        emit_hud: config.emit_hud,
        running: true,
    };

    let exit_duration = config.exit_after.map(Duration::from_secs);
    let status_interval = Duration::from_secs(config.status_interval_s.max(1));
    let mut last_status_log = Instant::now();

    info!(
        "Headless backend initialized (tick interval: {}ms, detector: {}), entering event loop",
        interval.as_millis(),
        session.orchestrator.detector_mode().as_str()
    );
    info!("config: {}", session.orchestrator.config_sexp());

    while session.running {
        if SHUTDOWN_REQUESTED.load(Ordering::SeqCst) {
            info!("Shutdown signal received, exiting");
            break;
        }

        if let Some(dur) = exit_duration {
            if session.start.elapsed() >= dur {
                info!("Headless exit timer fired after {}s", dur.as_secs());
                break;
            }
        }

        if last_status_log.elapsed() >= status_interval {
            let hud = session.orchestrator.hud();
            info!(
                "Headless status: stage {}, status \"{}\", region {}, {} cue(s), {} line(s)",
                hud.stage.as_str(),
                hud.status,
                hud.region.label(),
                session.effects.cues_played,
                session.effects.lines_spoken
            );
            info!("timing: {}", session.orchestrator.timing().stats_sexp());
            last_status_log = Instant::now();
        }

        event_loop
            .dispatch(Some(interval), &mut session)
            .map_err(|e| anyhow::anyhow!("event loop dispatch failed: {}", e))?;
    }

    handle.remove(tick_token);

    info!(
        "Headless backend shutting down after {} tick(s): {}",
        session.orchestrator.hud().tick,
        session.orchestrator.status_sexp()
    );
    Ok(())
}

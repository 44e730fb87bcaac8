//! Frame orchestrator: one tick of the console.
//!
//! Each tick advances the elimination clock, pulls at most one detection
//! frame, classifies it, runs the manipulation controller, eases the
//! rendered pose and publishes a `HudSnapshot`.  Stage side effects are
//! handed to an `EffectSink` in the order they occur.

use std::time::Instant;

use tracing::{debug, info, warn};

use super::classifier::{classify, ClassifiedHands};
use super::elimination::{
    AudioCue, EliminationConfig, EliminationSequencer, EliminationStage, Speech, StageBundle,
};
use super::frame_timing::FrameTiming;
use super::landmarks::DetectionFrame;
use super::manipulation::{
    CameraConfig, ControlMode, ControlTarget, ManipulationConfig, ManipulationController,
};
use super::pose::{PoseConfig, PoseFollower, RenderedPose};
use super::region::Region;

/// Status line shown while no detector is available.
pub const OFFLINE_STATUS: &str = "Camera unavailable: running offline demo";

// ── Collaborators ──────────────────────────────────────────

/// Source of hand landmark frames.
pub trait HandDetector {
    /// Short name for logging.
    fn name(&self) -> &str;

    /// Latest frame, or `None` when nothing new arrived since the last call.
    fn detect(&mut self, now_s: f64) -> Option<DetectionFrame>;
}

/// Receiver for stage side effects.  Fire-and-forget.
pub trait EffectSink {
    fn play_cue(&mut self, cue: AudioCue);
    fn speak(&mut self, speech: &Speech);
}

fn dispatch(bundle: &StageBundle, effects: &mut dyn EffectSink) {
    debug!("{}", bundle.to_sexp());
    if let Some(cue) = bundle.cue {
        effects.play_cue(cue);
    }
    if let Some(speech) = &bundle.speech {
        effects.speak(speech);
    }
}

// ── Config ─────────────────────────────────────────────────

/// What to do on a tick where the detector has nothing new.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleFramePolicy {
    /// Treat the tick as a frame with no hands.
    Empty,
    /// Reprocess the last frame the detector delivered.
    HoldPrevious,
}

impl StaleFramePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::HoldPrevious => "hold-previous",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "empty" => Some(Self::Empty),
            "hold-previous" | "hold" => Some(Self::HoldPrevious),
            _ => None,
        }
    }
}

/// Whether frames come from a real detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorMode {
    Live,
    Offline,
}

impl DetectorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Offline => "offline",
        }
    }
}

/// Everything the orchestrator and its components are built from.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub manipulation: ManipulationConfig,
    pub camera: CameraConfig,
    pub elimination: EliminationConfig,
    pub pose: PoseConfig,
    pub stale_policy: StaleFramePolicy,
    /// Tick intervals kept for percentile stats.
    pub timing_window: usize,
    /// Tick interval budget in milliseconds.
    pub budget_ms: f64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            manipulation: ManipulationConfig::default(),
            camera: CameraConfig::default(),
            elimination: EliminationConfig::default(),
            pose: PoseConfig::default(),
            stale_policy: StaleFramePolicy::Empty,
            timing_window: 300,
            budget_ms: 1000.0 / 30.0,
        }
    }
}

// ── HUD ────────────────────────────────────────────────────

/// Everything the HUD shows after a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct HudSnapshot {
    pub tick: u64,
    pub now_s: f64,
    pub target: ControlTarget,
    pub rendered: RenderedPose,
    pub stage: EliminationStage,
    pub mode: ControlMode,
    pub status: &'static str,
    pub grabbing: bool,
    pub fps: f64,
    pub region: Region,
    pub speaking: bool,
    /// Right wrist in mirrored screen coordinates.
    pub cursor: Option<(f32, f32)>,
    pub hand_detected: bool,
    pub detector: DetectorMode,
}

impl HudSnapshot {
    pub fn to_sexp(&self) -> String {
        let cursor = self
            .cursor
            .map(|(x, y)| format!("({:.3} {:.3})", x, y))
            .unwrap_or_else(|| "nil".to_string());
        let t = &self.target;
        format!(
            "(:type :hud :tick {} :time {:.3} :stage :{} :mode :{} :status \"{}\" :grabbing {} :rotation ({:.3} {:.3}) :position ({:.3} {:.3} {:.3}) :scale {:.3} :fps {:.0} :region \"{}\" :speaking {} :cursor {} :hand-detected {} :detector :{})",
            self.tick,
            self.now_s,
            self.stage.as_str(),
            self.mode.as_str(),
            self.status,
            if self.grabbing { "t" } else { "nil" },
            t.pitch,
            t.yaw,
            t.position.x,
            t.position.y,
            t.position.z,
            t.scale,
            self.fps,
            self.region.label(),
            if self.speaking { "t" } else { "nil" },
            cursor,
            if self.hand_detected { "t" } else { "nil" },
            self.detector.as_str(),
        )
    }
}

// ── Orchestrator ───────────────────────────────────────────

/// Owns every piece of per-session state and mutates it once per tick.
pub struct FrameOrchestrator {
    detector: Option<Box<dyn HandDetector>>,
    stale_policy: StaleFramePolicy,
    controller: ManipulationController,
    sequencer: EliminationSequencer,
    pose: PoseFollower,
    timing: FrameTiming,
    last_frame: DetectionFrame,
    hud: HudSnapshot,
}

impl FrameOrchestrator {
    /// Build an orchestrator.  `None` for the detector means offline mode.
    pub fn new(config: OrchestratorConfig, detector: Option<Box<dyn HandDetector>>) -> Self {
        let detector_mode = match &detector {
            Some(d) => {
                info!("hand detector {} attached", d.name());
                DetectorMode::Live
            }
            None => {
                warn!("no hand detector available, running offline");
                DetectorMode::Offline
            }
        };

        let controller = ManipulationController::new(config.manipulation, config.camera);
        let target = *controller.target();
        let pose = PoseFollower::new(config.pose, target.position);
        let hud = HudSnapshot {
            tick: 0,
            now_s: 0.0,
            target,
            rendered: *pose.pose(),
            stage: EliminationStage::Idle,
            mode: ControlMode::Standby,
            status: match detector_mode {
                DetectorMode::Live => ControlMode::Standby.status_label(),
                DetectorMode::Offline => OFFLINE_STATUS,
            },
            grabbing: false,
            fps: 0.0,
            region: pose.region(),
            speaking: false,
            cursor: None,
            hand_detected: false,
            detector: detector_mode,
        };

        Self {
            detector,
            stale_policy: config.stale_policy,
            controller,
            sequencer: EliminationSequencer::new(config.elimination),
            pose,
            timing: FrameTiming::new(config.timing_window, config.budget_ms),
            last_frame: DetectionFrame::empty(),
            hud,
        }
    }

    pub fn detector_mode(&self) -> DetectorMode {
        self.hud.detector
    }

    pub fn hud(&self) -> &HudSnapshot {
        &self.hud
    }

    pub fn controller(&self) -> &ManipulationController {
        &self.controller
    }

    pub fn sequencer(&self) -> &EliminationSequencer {
        &self.sequencer
    }

    pub fn timing(&self) -> &FrameTiming {
        &self.timing
    }

    fn next_frame(&mut self, now_s: f64) -> DetectionFrame {
        let fresh = self.detector.as_mut().and_then(|d| d.detect(now_s));
        match (fresh, self.stale_policy) {
            (Some(frame), _) => {
                self.last_frame = frame.clone();
                frame
            }
            (None, StaleFramePolicy::Empty) => DetectionFrame::empty(),
            (None, StaleFramePolicy::HoldPrevious) => self.last_frame.clone(),
        }
    }

    /// Run one tick at monotonic time `now_s`.
    ///
    /// The HUD frame rate comes from the wall time this call spends working,
    /// not from `now_s`.
    pub fn tick(&mut self, now_s: f64, effects: &mut dyn EffectSink) -> &HudSnapshot {
        let started = Instant::now();
        self.timing.record_tick(now_s);

        for bundle in self.sequencer.advance(now_s) {
            dispatch(&bundle, effects);
        }

        let frame = self.next_frame(now_s);
        let hands: ClassifiedHands = classify(&frame);

        let outcome = self.controller.step(&hands, &mut self.sequencer, now_s);
        if let Some(bundle) = &outcome.armed {
            dispatch(bundle, effects);
        }

        let target = *self.controller.target();
        let rendered = *self.pose.follow(&target, !self.sequencer.is_idle());

        let status = match (self.sequencer.status_label(), self.hud.detector) {
            (Some(label), _) => label,
            (None, DetectorMode::Offline) => OFFLINE_STATUS,
            (None, DetectorMode::Live) => outcome.mode.status_label(),
        };

        let cursor = hands.right.as_ref().map(|hand| {
            let wrist = hand.wrist();
            (1.0 - wrist.x, wrist.y)
        });

        let fps = self
            .timing
            .record_work(started.elapsed().as_secs_f64() * 1000.0);

        self.hud = HudSnapshot {
            tick: self.hud.tick + 1,
            now_s,
            target,
            rendered,
            stage: self.sequencer.stage(),
            mode: outcome.mode,
            status,
            grabbing: self.controller.is_grabbing(),
            fps,
            region: self.pose.region(),
            speaking: self.sequencer.is_speaking(now_s),
            cursor,
            hand_detected: !frame.is_empty(),
            detector: self.hud.detector,
        };
        &self.hud
    }

    /// Generate s-expression for status reporting.
    pub fn status_sexp(&self) -> String {
        format!(
            "(:detector :{} :hud {} :controller {} :sequencer {} :pose {} :timing {})",
            self.hud.detector.as_str(),
            self.hud.to_sexp(),
            self.controller.status_sexp(),
            self.sequencer.status_sexp(self.hud.now_s),
            self.pose.status_sexp(),
            self.timing.stats_sexp(),
        )
    }

    /// Generate s-expression for the active configuration.
    pub fn config_sexp(&self) -> String {
        format!(
            "(:stale-policy :{} :manipulation {} :elimination {} :follow-blend {:.2} :stage-yaw {:.2} :budget-ms {:.1})",
            self.stale_policy.as_str(),
            self.controller.config_sexp(),
            self.sequencer.config_sexp(),
            self.pose.config.follow_blend,
            self.pose.config.stage_yaw,
            self.timing.budget_ms,
        )
    }
}

// ── Tests ──────────────────────────────────────────────────

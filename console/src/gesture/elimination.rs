//! Elimination demo sequence: a timed stage machine armed by the offensive
//! gesture.
//!
//! The sequence runs idle → locking → exploding → destroyed → idle purely on
//! elapsed time.  It owns no timers: the caller passes a monotonic clock to
//! `arm` and `advance`, and each stage records when it was entered.  Entering
//! a stage yields a `StageBundle` describing the side effects the audio,
//! speech and HUD collaborators should perform.

use tracing::{debug, info};

// ── Stage ──────────────────────────────────────────────────

/// Current phase of the demo sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EliminationStage {
    Idle,
    Locking,
    Exploding,
    Destroyed,
}

impl EliminationStage {
    /// String representation for HUD and logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Locking => "locking",
            Self::Exploding => "exploding",
            Self::Destroyed => "destroyed",
        }
    }

    /// Status label shown while this stage is active.  Idle has none; the
    /// manipulation controller's label is shown instead.
    pub fn status_label(&self) -> Option<&'static str> {
        match self {
            Self::Idle => None,
            Self::Locking => Some("Demo mode: locking anomalous node"),
            Self::Exploding => Some("Demo mode: scrubbing traffic"),
            Self::Destroyed => Some("Demo mode: anomalous node isolated"),
        }
    }

    /// Stage that follows this one when its timer expires.
    pub fn next(&self) -> Self {
        match self {
            Self::Idle => Self::Idle,
            Self::Locking => Self::Exploding,
            Self::Exploding => Self::Destroyed,
            Self::Destroyed => Self::Idle,
        }
    }
}

// ── Side effects ───────────────────────────────────────────

/// Named audio cues requested from the sound collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    Charge,
    Explosion,
}

impl AudioCue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Charge => "charge",
            Self::Explosion => "explosion",
        }
    }
}

/// A spoken line and how long the HUD should show the speaking indicator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Speech {
    pub text: &'static str,
    pub duration_s: f64,
}

pub const LOCK_ANNOUNCEMENT: &str =
    "High-risk gesture detected. Entering safety demo mode and isolating the anomalous node.";
pub const AFTERMATH_ANNOUNCEMENT: &str =
    "Simulated scrub complete. Core links are stable. Preparing to leave demo mode.";

/// Side effects emitted once when a stage is entered.
#[derive(Debug, Clone, PartialEq)]
pub struct StageBundle {
    pub stage: EliminationStage,
    /// Clock value at which the stage was (scheduled to be) entered.
    pub entered_at_s: f64,
    pub status: &'static str,
    pub cue: Option<AudioCue>,
    pub speech: Option<Speech>,
}

impl StageBundle {
    /// Serialize the bundle as an s-expression event.
    pub fn to_sexp(&self) -> String {
        let cue = self
            .cue
            .map(|c| format!(":{}", c.as_str()))
            .unwrap_or_else(|| "nil".to_string());
        let speech = self
            .speech
            .map(|s| format!("\"{}\"", s.text))
            .unwrap_or_else(|| "nil".to_string());
        format!(
            "(:type :event :event :elimination-stage :stage :{} :at {:.3} :status \"{}\" :cue {} :speech {})",
            self.stage.as_str(),
            self.entered_at_s,
            self.status,
            cue,
            speech,
        )
    }
}

// ── Config ─────────────────────────────────────────────────

/// Stage durations and speech display times.
#[derive(Debug, Clone)]
pub struct EliminationConfig {
    /// Seconds spent locking before the explosion.
    pub locking_s: f64,
    /// Seconds of explosion before the node is destroyed.
    pub exploding_s: f64,
    /// Seconds the destroyed state is shown before returning to idle.
    pub destroyed_s: f64,
    /// Speaking indicator time for the lock announcement.
    pub lock_speech_s: f64,
    /// Speaking indicator time for the aftermath announcement.
    pub aftermath_speech_s: f64,
}

impl Default for EliminationConfig {
    fn default() -> Self {
        Self {
            locking_s: 3.0,
            exploding_s: 2.0,
            destroyed_s: 8.0,
            lock_speech_s: 2.5,
            aftermath_speech_s: 4.0,
        }
    }
}

impl EliminationConfig {
    /// Length of one complete armed cycle.
    pub fn cycle_s(&self) -> f64 {
        self.locking_s + self.exploding_s + self.destroyed_s
    }
}

// ── Sequencer ──────────────────────────────────────────────

/// Clock-driven elimination stage machine.
#[derive(Debug)]
pub struct EliminationSequencer {
    pub config: EliminationConfig,
    stage: EliminationStage,
    entered_at_s: f64,
    speaking_until_s: Option<f64>,
    completed_cycles: u64,
}

impl Default for EliminationSequencer {
    fn default() -> Self {
        Self::new(EliminationConfig::default())
    }
}

impl EliminationSequencer {
    pub fn new(config: EliminationConfig) -> Self {
        Self {
            config,
            stage: EliminationStage::Idle,
            entered_at_s: 0.0,
            speaking_until_s: None,
            completed_cycles: 0,
        }
    }

    pub fn stage(&self) -> EliminationStage {
        self.stage
    }

    pub fn is_idle(&self) -> bool {
        self.stage == EliminationStage::Idle
    }

    /// Clock value at which the current stage was entered.
    pub fn entered_at_s(&self) -> f64 {
        self.entered_at_s
    }

    /// Number of cycles that have returned to idle.
    pub fn completed_cycles(&self) -> u64 {
        self.completed_cycles
    }

    /// Label overriding the controller's status, if any.
    pub fn status_label(&self) -> Option<&'static str> {
        self.stage.status_label()
    }

    /// Whether a spoken line is still being delivered at `now_s`.
    pub fn is_speaking(&self, now_s: f64) -> bool {
        self.speaking_until_s.is_some_and(|until| now_s < until)
    }

    fn stage_duration(&self, stage: EliminationStage) -> Option<f64> {
        match stage {
            EliminationStage::Idle => None,
            EliminationStage::Locking => Some(self.config.locking_s),
            EliminationStage::Exploding => Some(self.config.exploding_s),
            EliminationStage::Destroyed => Some(self.config.destroyed_s),
        }
    }

    /// Start the sequence.  Ignored unless idle.
    pub fn arm(&mut self, now_s: f64) -> Option<StageBundle> {
        if !self.is_idle() {
            debug!("elimination arm ignored in stage {}", self.stage.as_str());
            return None;
        }
        self.enter(EliminationStage::Locking, now_s)
    }

    /// Move the clock forward to `now_s`, firing every stage timer that has
    /// expired.  Stages are entered at their scheduled deadlines, so a large
    /// jump replays each intermediate transition in order.
    pub fn advance(&mut self, now_s: f64) -> Vec<StageBundle> {
        let mut bundles = Vec::new();
        while let Some(duration) = self.stage_duration(self.stage) {
            let deadline = self.entered_at_s + duration;
            if now_s < deadline {
                break;
            }
            let next = self.stage.next();
            if let Some(bundle) = self.enter(next, deadline) {
                bundles.push(bundle);
            }
        }
        bundles
    }

    fn enter(&mut self, stage: EliminationStage, at_s: f64) -> Option<StageBundle> {
        let previous = self.stage;
        self.stage = stage;
        self.entered_at_s = at_s;

        let (cue, speech) = match stage {
            EliminationStage::Idle => {
                self.completed_cycles += 1;
                info!(
                    "elimination sequence reset to idle at {:.3}s (cycle {})",
                    at_s, self.completed_cycles
                );
                return None;
            }
            EliminationStage::Locking => (
                Some(AudioCue::Charge),
                Some(Speech {
                    text: LOCK_ANNOUNCEMENT,
                    duration_s: self.config.lock_speech_s,
                }),
            ),
            EliminationStage::Exploding => (Some(AudioCue::Explosion), None),
            EliminationStage::Destroyed => (
                None,
                Some(Speech {
                    text: AFTERMATH_ANNOUNCEMENT,
                    duration_s: self.config.aftermath_speech_s,
                }),
            ),
        };

        if let Some(s) = speech {
            self.speaking_until_s = Some(at_s + s.duration_s);
        }

        info!(
            "elimination stage {} -> {} at {:.3}s",
            previous.as_str(),
            stage.as_str(),
            at_s
        );

        Some(StageBundle {
            stage,
            entered_at_s: at_s,
            status: stage.status_label().unwrap_or_default(),
            cue,
            speech,
        })
    }

    /// Generate s-expression for status reporting.
    pub fn status_sexp(&self, now_s: f64) -> String {
        let elapsed = if self.is_idle() {
            0.0
        } else {
            (now_s - self.entered_at_s).max(0.0)
        };
        format!(
            "(:stage :{} :stage-elapsed-s {:.2} :speaking {} :completed-cycles {})",
            self.stage.as_str(),
            elapsed,
            if self.is_speaking(now_s) { "t" } else { "nil" },
            self.completed_cycles,
        )
    }

    /// Generate s-expression for the configured timings.
    pub fn config_sexp(&self) -> String {
        format!(
            "(:locking-s {:.1} :exploding-s {:.1} :destroyed-s {:.1} :lock-speech-s {:.1} :aftermath-speech-s {:.1})",
            self.config.locking_s,
            self.config.exploding_s,
            self.config.destroyed_s,
            self.config.lock_speech_s,
            self.config.aftermath_speech_s,
        )
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_idle() {
        let seq = EliminationSequencer::default();
        assert!(seq.is_idle());
        assert!(seq.status_label().is_none());
        assert!(!seq.is_speaking(0.0));
    }

    #[test]
    fn test_arm_enters_locking() {
        let mut seq = EliminationSequencer::default();
        let bundle = seq.arm(10.0).expect("arm from idle");
        assert_eq!(bundle.stage, EliminationStage::Locking);
        assert_eq!(bundle.cue, Some(AudioCue::Charge));
        assert_eq!(bundle.speech.map(|s| s.text), Some(LOCK_ANNOUNCEMENT));
        assert_eq!(bundle.status, "Demo mode: locking anomalous node");
        assert_eq!(seq.stage(), EliminationStage::Locking);
        assert_eq!(seq.entered_at_s(), 10.0);
    }

    #[test]
    fn test_double_arm_is_noop() {
        let mut seq = EliminationSequencer::default();
        assert!(seq.arm(0.0).is_some());
        assert!(seq.arm(1.0).is_none());
        assert!(seq.arm(2.9).is_none());
        // The second arm did not restart the lock timer.
        assert_eq!(seq.entered_at_s(), 0.0);
        let bundles = seq.advance(3.0);
        assert_eq!(bundles.len(), 1);
        assert_eq!(bundles[0].stage, EliminationStage::Exploding);
    }

    #[test]
    fn test_full_cycle_timing() {
        let mut seq = EliminationSequencer::default();
        seq.arm(0.0);

        assert!(seq.advance(2.999).is_empty());
        assert_eq!(seq.stage(), EliminationStage::Locking);

        let b = seq.advance(3.0);
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].stage, EliminationStage::Exploding);
        assert_eq!(b[0].cue, Some(AudioCue::Explosion));
        assert!(b[0].speech.is_none());

        assert!(seq.advance(4.999).is_empty());
        let b = seq.advance(5.0);
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].stage, EliminationStage::Destroyed);
        assert!(b[0].cue.is_none());
        assert_eq!(b[0].speech.map(|s| s.text), Some(AFTERMATH_ANNOUNCEMENT));

        assert!(seq.advance(12.999).is_empty());
        assert_eq!(seq.stage(), EliminationStage::Destroyed);

        // Return to idle is silent.
        assert!(seq.advance(13.0).is_empty());
        assert!(seq.is_idle());
        assert_eq!(seq.completed_cycles(), 1);
        assert_eq!(seq.entered_at_s(), EliminationConfig::default().cycle_s());
    }

    #[test]
    fn test_clock_jump_replays_every_stage() {
        let mut seq = EliminationSequencer::default();
        seq.arm(1.0);
        let bundles = seq.advance(100.0);
        let stages: Vec<_> = bundles.iter().map(|b| b.stage).collect();
        assert_eq!(
            stages,
            vec![EliminationStage::Exploding, EliminationStage::Destroyed]
        );
        assert_eq!(bundles[0].entered_at_s, 4.0);
        assert_eq!(bundles[1].entered_at_s, 6.0);
        assert!(seq.is_idle());
        assert_eq!(seq.entered_at_s(), 14.0);
    }

    #[test]
    fn test_rearm_after_cycle() {
        let mut seq = EliminationSequencer::default();
        seq.arm(0.0);
        seq.advance(13.0);
        assert!(seq.is_idle());
        assert!(seq.arm(13.5).is_some());
        assert_eq!(seq.stage(), EliminationStage::Locking);
    }

    #[test]
    fn test_speaking_window() {
        let mut seq = EliminationSequencer::default();
        seq.arm(0.0);
        assert!(seq.is_speaking(0.1));
        assert!(seq.is_speaking(2.49));
        assert!(!seq.is_speaking(2.5));

        seq.advance(5.0);
        assert!(seq.is_speaking(5.0));
        assert!(seq.is_speaking(8.99));
        assert!(!seq.is_speaking(9.0));
    }

    #[test]
    fn test_advance_while_idle_is_noop() {
        let mut seq = EliminationSequencer::default();
        assert!(seq.advance(1_000.0).is_empty());
        assert!(seq.is_idle());
        assert_eq!(seq.completed_cycles(), 0);
    }

    #[test]
    fn test_stage_labels() {
        assert!(EliminationStage::Idle.status_label().is_none());
        assert!(EliminationStage::Locking.status_label().is_some());
        assert!(EliminationStage::Exploding.status_label().is_some());
        assert!(EliminationStage::Destroyed.status_label().is_some());
        assert_eq!(EliminationStage::Exploding.as_str(), "exploding");
    }

    #[test]
    fn test_bundle_sexp() {
        let mut seq = EliminationSequencer::default();
        let sexp = seq.arm(1.5).unwrap().to_sexp();
        assert!(sexp.starts_with("(:type :event :event :elimination-stage"));
        assert!(sexp.contains(":stage :locking"));
        assert!(sexp.contains(":cue :charge"));
        assert!(sexp.contains(":at 1.500"));
    }

    #[test]
    fn test_status_and_config_sexp() {
        let mut seq = EliminationSequencer::default();
        assert!(seq.status_sexp(0.0).contains(":stage :idle"));
        seq.arm(0.0);
        let s = seq.status_sexp(1.0);
        assert!(s.contains(":stage :locking"));
        assert!(s.contains(":stage-elapsed-s 1.00"));
        assert!(s.contains(":speaking t"));
        let c = seq.config_sexp();
        assert!(c.contains(":locking-s 3.0"));
        assert!(c.contains(":destroyed-s 8.0"));
    }
}

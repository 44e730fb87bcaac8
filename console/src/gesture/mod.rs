//! Gesture subsystem: hand landmarks in, globe control and HUD state out.
//!
//! Provides:
//! - `landmarks`: 21-point hand records and detection frames
//! - `classifier`: per-frame left/right role assignment
//! - `detectors`: stateless pinch, span, finger and offensive-gesture checks
//! - `manipulation`: grab hysteresis and the smoothed control target
//! - `elimination`: the timed demo sequence armed by the offensive gesture
//! - `pose`: renderer-side easing and the stage pose
//! - `region`: yaw to facing-region lookup
//! - `frame_timing`: tick interval stats
//! - `orchestrator`: one tick of the whole pipeline

pub mod classifier;
pub mod detectors;
pub mod elimination;
pub mod frame_timing;
pub mod landmarks;
pub mod manipulation;
pub mod math;
pub mod orchestrator;
pub mod pose;
pub mod region;

pub use classifier::{classify, ClassifiedHands};
pub use elimination::{AudioCue, EliminationSequencer, EliminationStage, Speech, StageBundle};
pub use landmarks::{DetectionFrame, Hand, HandLandmark, HandRole, Landmark};
pub use manipulation::{ControlMode, ControlTarget, ManipulationController, Vec3};
pub use orchestrator::{
    DetectorMode, EffectSink, FrameOrchestrator, HandDetector, HudSnapshot, OrchestratorConfig,
    StaleFramePolicy,
};
pub use region::Region;

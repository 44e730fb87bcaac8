//! Manipulation controller: turns classified hands into a smoothed control
//! target (rotation, position, scale) for the globe.
//!
//! Owns the only cross-frame gesture memory: the grab flag and its pinch
//! hysteresis.  Every axis moves by exponential blending toward a per-frame
//! target except the left-hand yaw, which follows the wrist directly.
//!
//! Branch order per frame:
//! 1. elimination stage active → frozen (an empty frame still recenters
//!    and releases the grab, without the idle drift)
//! 2. offensive gesture on any hand → arm the sequencer, frozen this frame
//! 3. no hands → scanning (idle drift, recenter, release grab)
//! 4. both hands → pitch from wrist height difference
//! 5. left hand → yaw from wrist x, depth from hand span
//! 6. right hand → grab / rotate-trigger / spread, or recenter if absent

use tracing::debug;

use super::classifier::ClassifiedHands;
use super::detectors::{hand_span, is_offensive_gesture, is_rotate_trigger, pinch_distance};
use super::elimination::{EliminationSequencer, StageBundle};
use super::landmarks::{Hand, HandLandmark};
use super::math::{lerp, map_range};

// ── Vec3 ───────────────────────────────────────────────────

/// Named world-space position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

// ── Config ─────────────────────────────────────────────────

/// Scene camera used to unproject the dragging thumb.
#[derive(Debug, Clone)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_deg: f32,
    /// Camera distance from the origin along +z.
    pub camera_z: f32,
    /// Viewport width / height.
    pub aspect: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_deg: 45.0,
            camera_z: 5.0,
            aspect: 16.0 / 9.0,
        }
    }
}

impl CameraConfig {
    /// Visible (width, height) of the view frustum at depth `object_z`.
    pub fn visible_extent(&self, object_z: f32) -> (f32, f32) {
        let dist = self.camera_z - object_z;
        let height = 2.0 * (self.fov_deg.to_radians() / 2.0).tan() * dist;
        (height * self.aspect, height)
    }

    /// World (x, y) under a normalized camera point at depth `object_z`.
    ///
    /// The camera image is mirrored, so x is flipped before projecting.
    pub fn unproject(&self, norm_x: f32, norm_y: f32, object_z: f32) -> (f32, f32) {
        let (width, height) = self.visible_extent(object_z);
        let screen_x = 1.0 - norm_x;
        ((screen_x - 0.5) * width, -(norm_y - 0.5) * height)
    }
}

/// Thresholds, ranges and blend factors for every control axis.
#[derive(Debug, Clone)]
pub struct ManipulationConfig {
    /// Pinch distance below which an open hand starts grabbing.
    pub grab_on_below: f32,
    /// Pinch distance above which a grabbing hand releases.
    pub grab_off_above: f32,
    /// Wrist height difference (left − right) mapped onto the tilt range.
    pub tilt_input: (f32, f32),
    pub tilt_output: (f32, f32),
    pub pitch_blend: f32,
    /// Left wrist x mapped directly onto yaw.
    pub yaw_input: (f32, f32),
    pub yaw_output: (f32, f32),
    /// Left hand span mapped onto depth.
    pub span_input: (f32, f32),
    pub depth_output: (f32, f32),
    pub depth_blend: f32,
    /// Yaw added per frame while the rotate trigger is held.
    pub rotate_step: f32,
    pub gripped_scale: f32,
    pub gripped_scale_blend: f32,
    pub drag_blend: f32,
    /// Open-hand pinch distance mapped onto scale.
    pub spread_input: (f32, f32),
    pub scale_output: (f32, f32),
    pub spread_scale_blend: f32,
    /// Recenter rate while the right hand is open.
    pub spread_recenter_blend: f32,
    /// Recenter rate when the right hand is gone.
    pub release_recenter_blend: f32,
    /// Yaw added per frame with no hands in view.
    pub idle_drift: f32,
    pub idle_depth_blend: f32,
    /// Rest position (x, y) the globe returns to.
    pub anchor: (f32, f32),
    pub initial_scale: f32,
}

impl Default for ManipulationConfig {
    fn default() -> Self {
        Self {
            grab_on_below: 0.05,
            grab_off_above: 0.08,
            tilt_input: (-0.3, 0.3),
            tilt_output: (-1.0, 1.0),
            pitch_blend: 0.1,
            yaw_input: (0.0, 0.5),
            yaw_output: (-1.5, 1.5),
            span_input: (0.05, 0.25),
            depth_output: (3.0, -8.0),
            depth_blend: 0.05,
            rotate_step: 0.25,
            gripped_scale: 0.8,
            gripped_scale_blend: 0.1,
            drag_blend: 0.15,
            spread_input: (0.08, 0.25),
            scale_output: (0.5, 2.5),
            spread_scale_blend: 0.06,
            spread_recenter_blend: 0.08,
            release_recenter_blend: 0.05,
            idle_drift: 0.002,
            idle_depth_blend: 0.02,
            anchor: (-2.5, 0.0),
            initial_scale: 1.5,
        }
    }
}

// ── Control target ─────────────────────────────────────────

/// Desired pose of the globe; the renderer reads it, only the controller
/// writes it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlTarget {
    /// Rotation about x (radians).
    pub pitch: f32,
    /// Rotation about y (radians).
    pub yaw: f32,
    pub position: Vec3,
    pub scale: f32,
}

impl ControlTarget {
    pub fn at_rest(config: &ManipulationConfig) -> Self {
        Self {
            pitch: 0.0,
            yaw: 0.0,
            position: Vec3::new(config.anchor.0, config.anchor.1, 0.0),
            scale: config.initial_scale,
        }
    }
}

// ── Modes ──────────────────────────────────────────────────

/// Which branch produced this frame's control update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMode {
    /// Hands present but no branch claimed the label.
    Standby,
    DualLink,
    /// Left hand alone steering yaw and depth.
    PoseControl,
    /// Right hand grabbing with the rotate trigger held.
    GravityRotate,
    Grabbing,
    /// Right hand open, pinch distance driving scale.
    PrecisionScale,
    Scanning,
    /// The offensive gesture armed the elimination sequence this frame.
    Armed,
    /// Elimination sequence active; hand input ignored.
    Frozen,
}

impl ControlMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standby => "standby",
            Self::DualLink => "dual-link",
            Self::PoseControl => "pose-control",
            Self::GravityRotate => "gravity-rotate",
            Self::Grabbing => "grabbing",
            Self::PrecisionScale => "precision-scale",
            Self::Scanning => "scanning",
            Self::Armed => "armed",
            Self::Frozen => "frozen",
        }
    }

    /// HUD status line for this mode.
    pub fn status_label(&self) -> &'static str {
        match self {
            Self::Standby | Self::Armed | Self::Frozen => "System standby",
            Self::DualLink => "Dual-link mode",
            Self::PoseControl => "Pose control (push / pull)",
            Self::GravityRotate => "Gravity rotate mode",
            Self::Grabbing => "Grabbing object",
            Self::PrecisionScale => "Precision scale (pinch)",
            Self::Scanning => "Scanning...",
        }
    }
}

/// Result of one controller step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub mode: ControlMode,
    /// Side effects of arming the elimination sequence, when it happened.
    pub armed: Option<StageBundle>,
}

impl StepOutcome {
    fn mode(mode: ControlMode) -> Self {
        Self { mode, armed: None }
    }
}

/// Pinch hysteresis: turn on strictly below `on_below`, off strictly above
/// `off_above`, hold in between.
pub fn next_grab_state(grabbing: bool, pinch: f32, on_below: f32, off_above: f32) -> bool {
    if grabbing {
        pinch <= off_above
    } else {
        pinch < on_below
    }
}

// ── Controller ─────────────────────────────────────────────

/// Per-frame gesture → control-target state machine.
#[derive(Debug)]
pub struct ManipulationController {
    pub config: ManipulationConfig,
    pub camera: CameraConfig,
    target: ControlTarget,
    grabbing: bool,
}

impl Default for ManipulationController {
    fn default() -> Self {
        Self::new(ManipulationConfig::default(), CameraConfig::default())
    }
}

impl ManipulationController {
    pub fn new(config: ManipulationConfig, camera: CameraConfig) -> Self {
        let target = ControlTarget::at_rest(&config);
        Self {
            config,
            camera,
            target,
            grabbing: false,
        }
    }

    pub fn target(&self) -> &ControlTarget {
        &self.target
    }

    pub fn is_grabbing(&self) -> bool {
        self.grabbing
    }

    /// Run one frame of gesture interpretation.
    pub fn step(
        &mut self,
        hands: &ClassifiedHands,
        sequencer: &mut EliminationSequencer,
        now_s: f64,
    ) -> StepOutcome {
        if !sequencer.is_idle() {
            if hands.none() {
                self.settle();
            }
            return StepOutcome::mode(ControlMode::Frozen);
        }

        if hands.iter().any(is_offensive_gesture) {
            let armed = sequencer.arm(now_s);
            return StepOutcome {
                mode: ControlMode::Armed,
                armed,
            };
        }

        if hands.none() {
            self.scan();
            return StepOutcome::mode(ControlMode::Scanning);
        }

        let mut mode = ControlMode::Standby;

        if let (Some(left), Some(right)) = (&hands.left, &hands.right) {
            self.dual_hand(left, right);
            mode = ControlMode::DualLink;
        }

        if let Some(left) = &hands.left {
            self.left_hand(left);
            if hands.right.is_none() {
                mode = ControlMode::PoseControl;
            }
        }

        match &hands.right {
            Some(right) => {
                if let Some(right_mode) = self.right_hand(right, hands.left.is_some()) {
                    mode = right_mode;
                }
            }
            None => {
                self.recenter(self.config.release_recenter_blend);
                self.set_grabbing(false);
            }
        }

        StepOutcome::mode(mode)
    }

    fn dual_hand(&mut self, left: &Hand, right: &Hand) {
        let c = &self.config;
        let diff_y = left.wrist().y - right.wrist().y;
        let tilt = map_range(diff_y, c.tilt_input.0, c.tilt_input.1, c.tilt_output.0, c.tilt_output.1);
        self.target.pitch = lerp(self.target.pitch, tilt, c.pitch_blend);
    }

    fn left_hand(&mut self, left: &Hand) {
        let c = &self.config;
        let wrist = left.wrist();
        self.target.yaw = map_range(wrist.x, c.yaw_input.0, c.yaw_input.1, c.yaw_output.0, c.yaw_output.1);

        let target_z = map_range(
            hand_span(left),
            c.span_input.0,
            c.span_input.1,
            c.depth_output.0,
            c.depth_output.1,
        );
        self.target.position.z = lerp(self.target.position.z, target_z, c.depth_blend);
    }

    /// Returns the mode the right hand claims, if any.
    fn right_hand(&mut self, right: &Hand, has_left: bool) -> Option<ControlMode> {
        let pinch = pinch_distance(right);
        let grabbing = next_grab_state(
            self.grabbing,
            pinch,
            self.config.grab_on_below,
            self.config.grab_off_above,
        );
        self.set_grabbing(grabbing);

        if grabbing {
            let mode = if is_rotate_trigger(right) {
                self.target.yaw += self.config.rotate_step;
                self.target.scale = lerp(
                    self.target.scale,
                    self.config.gripped_scale,
                    self.config.gripped_scale_blend,
                );
                ControlMode::GravityRotate
            } else {
                ControlMode::Grabbing
            };

            let thumb = right.get(HandLandmark::ThumbTip);
            let (tx, ty) = self.camera.unproject(thumb.x, thumb.y, self.target.position.z);
            let blend = self.config.drag_blend;
            self.target.position.x = lerp(self.target.position.x, tx, blend);
            self.target.position.y = lerp(self.target.position.y, ty, blend);
            Some(mode)
        } else {
            let c = &self.config;
            let target_scale = map_range(
                pinch,
                c.spread_input.0,
                c.spread_input.1,
                c.scale_output.0,
                c.scale_output.1,
            );
            self.target.scale = lerp(self.target.scale, target_scale, c.spread_scale_blend);
            self.recenter(self.config.spread_recenter_blend);
            (!has_left).then_some(ControlMode::PrecisionScale)
        }
    }

    fn scan(&mut self) {
        self.target.yaw += self.config.idle_drift;
        self.settle();
    }

    /// No-hands recentering shared by the idle and frozen paths.
    fn settle(&mut self) {
        self.target.position.z = lerp(self.target.position.z, 0.0, self.config.idle_depth_blend);
        self.recenter(self.config.release_recenter_blend);
        self.set_grabbing(false);
    }

    fn recenter(&mut self, blend: f32) {
        let (ax, ay) = self.config.anchor;
        self.target.position.x = lerp(self.target.position.x, ax, blend);
        self.target.position.y = lerp(self.target.position.y, ay, blend);
    }

    fn set_grabbing(&mut self, grabbing: bool) {
        if grabbing != self.grabbing {
            debug!("grab {}", if grabbing { "engaged" } else { "released" });
            self.grabbing = grabbing;
        }
    }

    /// Generate s-expression for status reporting.
    pub fn status_sexp(&self) -> String {
        let t = &self.target;
        format!(
            "(:grabbing {} :pitch {:.3} :yaw {:.3} :position ({:.3} {:.3} {:.3}) :scale {:.3})",
            if self.grabbing { "t" } else { "nil" },
            t.pitch,
            t.yaw,
            t.position.x,
            t.position.y,
            t.position.z,
            t.scale,
        )
    }

    /// Generate s-expression for the active thresholds.
    pub fn config_sexp(&self) -> String {
        format!(
            "(:grab-on-below {:.3} :grab-off-above {:.3} :rotate-step {:.3} :drag-blend {:.2} :fov-deg {:.1} :camera-z {:.1} :aspect {:.3})",
            self.config.grab_on_below,
            self.config.grab_off_above,
            self.config.rotate_step,
            self.config.drag_blend,
            self.camera.fov_deg,
            self.camera.camera_z,
            self.camera.aspect,
        )
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::classifier::classify;
    use crate::gesture::elimination::EliminationStage;
    use crate::gesture::landmarks::{
        test_hand, test_offensive_hand, test_ok_hand, test_pinch_hand, DetectionFrame,
    };

    fn frame(hands: Vec<Hand>) -> ClassifiedHands {
        classify(&DetectionFrame::new(hands))
    }

    fn setup() -> (ManipulationController, EliminationSequencer) {
        (
            ManipulationController::default(),
            EliminationSequencer::default(),
        )
    }

    #[test]
    fn test_initial_target() {
        let (ctl, _) = setup();
        let t = ctl.target();
        assert_eq!(t.pitch, 0.0);
        assert_eq!(t.yaw, 0.0);
        assert_eq!(t.position, Vec3::new(-2.5, 0.0, 0.0));
        assert_eq!(t.scale, 1.5);
        assert!(!ctl.is_grabbing());
    }

    #[test]
    fn test_hysteresis_thresholds() {
        assert!(next_grab_state(false, 0.049, 0.05, 0.08));
        assert!(!next_grab_state(true, 0.081, 0.05, 0.08));
        assert!(next_grab_state(true, 0.01, 0.05, 0.08));
        assert!(!next_grab_state(false, 0.2, 0.05, 0.08));
    }

    #[test]
    fn test_hysteresis_dead_band_sweep() {
        for i in 0..=300 {
            let d = lerp(0.05, 0.08, i as f32 / 300.0).clamp(0.05, 0.08);
            assert!(!next_grab_state(false, d, 0.05, 0.08), "turned on at {}", d);
            assert!(next_grab_state(true, d, 0.05, 0.08), "turned off at {}", d);
        }
    }

    #[test]
    fn test_pinch_scenario_turns_grab_on() {
        let (mut ctl, mut seq) = setup();
        let right = test_hand(0.7, 0.8)
            .with(HandLandmark::ThumbTip, 0.5, 0.5)
            .with(HandLandmark::IndexTip, 0.52, 0.5);
        let out = ctl.step(&frame(vec![right]), &mut seq, 0.0);
        assert!(ctl.is_grabbing());
        assert_eq!(out.mode, ControlMode::Grabbing);
        assert!(out.armed.is_none());
    }

    #[test]
    fn test_grab_drags_toward_unprojected_thumb() {
        let (mut ctl, mut seq) = setup();
        let right = test_hand(0.7, 0.8)
            .with(HandLandmark::ThumbTip, 0.5, 0.5)
            .with(HandLandmark::IndexTip, 0.52, 0.5);
        ctl.step(&frame(vec![right]), &mut seq, 0.0);
        // Thumb at frame centre unprojects to the world origin.
        let p = ctl.target().position;
        assert!((p.x - lerp(-2.5, 0.0, 0.15)).abs() < 1e-5, "x = {}", p.x);
        assert!(p.y.abs() < 1e-6);
    }

    #[test]
    fn test_drag_is_mirrored() {
        let (mut ctl, mut seq) = setup();
        // Thumb on the camera's left half is the viewer's right.
        let right = test_hand(0.7, 0.8)
            .with(HandLandmark::ThumbTip, 0.2, 0.3)
            .with(HandLandmark::IndexTip, 0.22, 0.3);
        for _ in 0..200 {
            ctl.step(&frame(vec![right.clone()]), &mut seq, 0.0);
        }
        let (tx, ty) = ctl.camera.unproject(0.2, 0.3, 0.0);
        assert!(tx > 0.0 && ty > 0.0);
        let p = ctl.target().position;
        assert!((p.x - tx).abs() < 1e-3, "{} vs {}", p.x, tx);
        assert!((p.y - ty).abs() < 1e-3, "{} vs {}", p.y, ty);
    }

    #[test]
    fn test_camera_visible_extent() {
        let cam = CameraConfig::default();
        let (w, h) = cam.visible_extent(0.0);
        let expected_h = 2.0 * (22.5f32).to_radians().tan() * 5.0;
        assert!((h - expected_h).abs() < 1e-5);
        assert!((w - expected_h * 16.0 / 9.0).abs() < 1e-4);

        // Pushing the object away widens the visible area.
        let (_, far_h) = cam.visible_extent(-8.0);
        assert!((far_h - expected_h * 13.0 / 5.0).abs() < 1e-4);

        let (x, y) = cam.unproject(0.0, 0.0, 0.0);
        assert!((x - w / 2.0).abs() < 1e-5);
        assert!((y - h / 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_left_hand_scenario() {
        let (mut ctl, mut seq) = setup();
        let out = ctl.step(&frame(vec![test_hand(0.3, 0.8)]), &mut seq, 0.0);
        assert_eq!(out.mode, ControlMode::PoseControl);
        assert!((ctl.target().yaw - 0.3).abs() < 1e-6, "yaw = {}", ctl.target().yaw);
        assert_eq!(ctl.target().yaw, map_range(0.3, 0.0, 0.5, -1.5, 1.5));

        let target_z = map_range(0.12, 0.05, 0.25, 3.0, -8.0);
        assert!((ctl.target().position.z - lerp(0.0, target_z, 0.05)).abs() < 1e-5);
    }

    #[test]
    fn test_no_hands_then_left_is_deterministic() {
        let (mut a, mut seq_a) = setup();
        a.step(&frame(vec![test_hand(0.7, 0.8), test_hand(0.2, 0.5)]), &mut seq_a, 0.0);
        a.step(&frame(vec![]), &mut seq_a, 0.1);
        let before = *a.target();
        let out = a.step(&frame(vec![test_hand(0.3, 0.8)]), &mut seq_a, 0.2);

        assert_eq!(out.mode, ControlMode::PoseControl);
        assert!(!a.is_grabbing());
        let t = a.target();
        // Yaw follows the wrist directly; nothing from the earlier frames leaks in.
        assert_eq!(t.yaw, map_range(0.3, 0.0, 0.5, -1.5, 1.5));
        assert_eq!(t.pitch, before.pitch);
        let target_z = map_range(0.12, 0.05, 0.25, 3.0, -8.0);
        assert!((t.position.z - lerp(before.position.z, target_z, 0.05)).abs() < 1e-6);
        assert!((t.position.x - lerp(before.position.x, -2.5, 0.05)).abs() < 1e-6);
    }

    #[test]
    fn test_dual_hand_tilt() {
        let (mut ctl, mut seq) = setup();
        let out = ctl.step(
            &frame(vec![test_hand(0.3, 0.8), test_hand(0.7, 0.5)]),
            &mut seq,
            0.0,
        );
        assert_eq!(out.mode, ControlMode::DualLink);
        // diff 0.3 maps to the top of the tilt range; one blend step of 0.1.
        assert!((ctl.target().pitch - 0.1).abs() < 1e-5, "pitch = {}", ctl.target().pitch);
    }

    #[test]
    fn test_dual_hand_grab_claims_label() {
        let (mut ctl, mut seq) = setup();
        let out = ctl.step(
            &frame(vec![test_hand(0.3, 0.6), test_pinch_hand(0.7, 0.6)]),
            &mut seq,
            0.0,
        );
        assert_eq!(out.mode, ControlMode::Grabbing);
        assert!(ctl.is_grabbing());
    }

    #[test]
    fn test_rotate_trigger_spins_and_shrinks() {
        let (mut ctl, mut seq) = setup();
        let out = ctl.step(&frame(vec![test_ok_hand(0.7, 0.8)]), &mut seq, 0.0);
        assert_eq!(out.mode, ControlMode::GravityRotate);
        assert!((ctl.target().yaw - 0.25).abs() < 1e-6);
        assert!((ctl.target().scale - lerp(1.5, 0.8, 0.1)).abs() < 1e-6);

        ctl.step(&frame(vec![test_ok_hand(0.7, 0.8)]), &mut seq, 0.1);
        assert!((ctl.target().yaw - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_spread_scales_and_recenters() {
        let (mut ctl, mut seq) = setup();
        let right = test_hand(0.7, 0.8);
        let pinch = pinch_distance(&right);
        let out = ctl.step(&frame(vec![right]), &mut seq, 0.0);
        assert_eq!(out.mode, ControlMode::PrecisionScale);
        assert!(!ctl.is_grabbing());
        let expected = lerp(1.5, map_range(pinch, 0.08, 0.25, 0.5, 2.5), 0.06);
        assert!((ctl.target().scale - expected).abs() < 1e-6);
    }

    #[test]
    fn test_spread_with_left_keeps_dual_label() {
        let (mut ctl, mut seq) = setup();
        let out = ctl.step(
            &frame(vec![test_hand(0.3, 0.8), test_hand(0.7, 0.8)]),
            &mut seq,
            0.0,
        );
        assert_eq!(out.mode, ControlMode::DualLink);
    }

    #[test]
    fn test_release_after_wide_pinch() {
        let (mut ctl, mut seq) = setup();
        ctl.step(&frame(vec![test_pinch_hand(0.7, 0.8)]), &mut seq, 0.0);
        assert!(ctl.is_grabbing());
        ctl.step(&frame(vec![test_hand(0.7, 0.8)]), &mut seq, 0.1);
        assert!(!ctl.is_grabbing());
    }

    #[test]
    fn test_right_hand_lost_resets_grab() {
        let (mut ctl, mut seq) = setup();
        ctl.step(&frame(vec![test_pinch_hand(0.7, 0.8)]), &mut seq, 0.0);
        assert!(ctl.is_grabbing());
        let dragged_x = ctl.target().position.x;
        ctl.step(&frame(vec![test_hand(0.3, 0.8)]), &mut seq, 0.1);
        assert!(!ctl.is_grabbing());
        assert!((ctl.target().position.x - lerp(dragged_x, -2.5, 0.05)).abs() < 1e-6);
    }

    #[test]
    fn test_scanning_drift() {
        let (mut ctl, mut seq) = setup();
        ctl.step(&frame(vec![test_pinch_hand(0.7, 0.8)]), &mut seq, 0.0);
        let yaw = ctl.target().yaw;
        let out = ctl.step(&frame(vec![]), &mut seq, 0.1);
        assert_eq!(out.mode, ControlMode::Scanning);
        assert!(!ctl.is_grabbing());
        assert!((ctl.target().yaw - (yaw + 0.002)).abs() < 1e-7);
    }

    #[test]
    fn test_offensive_arms_and_freezes_grab() {
        let (mut ctl, mut seq) = setup();
        ctl.step(&frame(vec![test_pinch_hand(0.7, 0.8)]), &mut seq, 0.0);
        assert!(ctl.is_grabbing());
        let before = *ctl.target();

        let out = ctl.step(
            &frame(vec![test_offensive_hand(0.3, 0.8), test_pinch_hand(0.7, 0.8)]),
            &mut seq,
            1.0,
        );
        assert_eq!(out.mode, ControlMode::Armed);
        let bundle = out.armed.expect("sequence armed");
        assert_eq!(bundle.stage, EliminationStage::Locking);
        assert_eq!(seq.stage(), EliminationStage::Locking);
        assert!(ctl.is_grabbing(), "grab state is frozen, not reset");
        assert_eq!(*ctl.target(), before);
    }

    #[test]
    fn test_either_hand_can_arm() {
        let (mut ctl, mut seq) = setup();
        let out = ctl.step(&frame(vec![test_offensive_hand(0.8, 0.8)]), &mut seq, 0.0);
        assert_eq!(out.mode, ControlMode::Armed);
        assert!(!seq.is_idle());
    }

    #[test]
    fn test_non_idle_stage_ignores_hands() {
        let (mut ctl, mut seq) = setup();
        seq.arm(0.0);
        seq.advance(3.5);
        assert_eq!(seq.stage(), EliminationStage::Exploding);
        let before = *ctl.target();

        for hands in [
            vec![test_ok_hand(0.7, 0.8)],
            vec![test_hand(0.3, 0.2), test_pinch_hand(0.9, 0.9)],
            vec![test_offensive_hand(0.4, 0.8)],
        ] {
            let out = ctl.step(&frame(hands), &mut seq, 4.0);
            assert_eq!(out.mode, ControlMode::Frozen);
            assert!(out.armed.is_none());
        }
        assert_eq!(*ctl.target(), before);
        assert!(!ctl.is_grabbing());
        assert_eq!(seq.entered_at_s(), 3.0);
    }

    #[test]
    fn test_empty_frames_while_frozen_release_and_recenter() {
        let (mut ctl, mut seq) = setup();
        for i in 0..5 {
            ctl.step(&frame(vec![test_pinch_hand(0.7, 0.8)]), &mut seq, i as f64 * 0.1);
        }
        assert!(ctl.is_grabbing());
        let out = ctl.step(&frame(vec![test_offensive_hand(0.3, 0.8)]), &mut seq, 0.5);
        assert_eq!(out.mode, ControlMode::Armed);
        assert!(ctl.is_grabbing());
        let dragged = *ctl.target();

        let out = ctl.step(&frame(vec![]), &mut seq, 0.6);
        assert_eq!(out.mode, ControlMode::Frozen);
        assert!(!ctl.is_grabbing());
        let t = *ctl.target();
        assert!((t.position.x - lerp(dragged.position.x, -2.5, 0.05)).abs() < 1e-6);
        assert!((t.position.y - lerp(dragged.position.y, 0.0, 0.05)).abs() < 1e-6);
        assert_eq!(t.yaw, dragged.yaw, "no idle drift while frozen");

        for i in 0..200 {
            ctl.step(&frame(vec![]), &mut seq, 0.7 + i as f64 * 0.05);
        }
        assert!(!seq.is_idle());
        assert!((ctl.target().position.x + 2.5).abs() < 1e-3);
        assert!(ctl.target().position.y.abs() < 1e-3);

        // First idle tick after the cycle: a pinch inside the dead band stays released.
        seq.advance(13.6);
        assert!(seq.is_idle());
        let right = test_hand(0.7, 0.8)
            .with(HandLandmark::ThumbTip, 0.5, 0.5)
            .with(HandLandmark::IndexTip, 0.565, 0.5);
        let out = ctl.step(&frame(vec![right]), &mut seq, 13.6);
        assert_eq!(out.mode, ControlMode::PrecisionScale);
        assert!(!ctl.is_grabbing());
    }

    #[test]
    fn test_status_sexp() {
        let (ctl, _) = setup();
        let s = ctl.status_sexp();
        assert!(s.contains(":grabbing nil"));
        assert!(s.contains(":position (-2.500 0.000 0.000)"));
        assert!(s.contains(":scale 1.500"));
        let c = ctl.config_sexp();
        assert!(c.contains(":grab-on-below 0.050"));
        assert!(c.contains(":fov-deg 45.0"));
    }

    #[test]
    fn test_mode_labels() {
        assert_eq!(ControlMode::Scanning.status_label(), "Scanning...");
        assert_eq!(ControlMode::GravityRotate.as_str(), "gravity-rotate");
        assert_eq!(ControlMode::Standby.status_label(), "System standby");
    }
}

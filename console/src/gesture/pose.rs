//! Rendered pose follower.
//!
//! The renderer never jumps to the control target; it eases toward it by a
//! fixed fraction each tick.  While the elimination sequence runs the globe
//! is pulled to a fixed stage pose instead, and the region label is read off
//! this rendered yaw rather than the raw target.

use std::f32::consts::PI;

use super::manipulation::{ControlTarget, Vec3};
use super::math::lerp;
use super::region::Region;

/// Blend factors and the stage pose used while a sequence is active.
#[derive(Debug, Clone)]
pub struct PoseConfig {
    /// Fraction of the remaining distance covered per tick.
    pub follow_blend: f32,
    /// Rendered pitch tracks this multiple of the target pitch.
    pub pitch_factor: f32,
    /// Added to the target yaw so yaw 0 shows the far hemisphere.
    pub yaw_offset: f32,
    pub stage_position: Vec3,
    pub stage_yaw: f32,
    pub stage_scale: f32,
    /// Mesh scale before the first tick.
    pub initial_scale: f32,
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            follow_blend: 0.1,
            pitch_factor: 0.5,
            yaw_offset: PI,
            stage_position: Vec3::new(0.0, -0.5, 0.0),
            stage_yaw: -4.0,
            stage_scale: 1.2,
            initial_scale: 1.0,
        }
    }
}

/// What the viewer actually sees this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedPose {
    pub pitch: f32,
    pub yaw: f32,
    pub position: Vec3,
    pub scale: f32,
}

#[derive(Debug)]
pub struct PoseFollower {
    pub config: PoseConfig,
    pose: RenderedPose,
}

impl Default for PoseFollower {
    fn default() -> Self {
        Self::new(PoseConfig::default(), Vec3::new(-2.5, 0.0, 0.0))
    }
}

impl PoseFollower {
    /// Start at `position` with no rotation.
    pub fn new(config: PoseConfig, position: Vec3) -> Self {
        let pose = RenderedPose {
            pitch: 0.0,
            yaw: 0.0,
            position,
            scale: config.initial_scale,
        };
        Self { config, pose }
    }

    pub fn pose(&self) -> &RenderedPose {
        &self.pose
    }

    /// Region facing the viewer at the current rendered yaw.
    pub fn region(&self) -> Region {
        Region::from_yaw(self.pose.yaw)
    }

    /// Ease one tick toward `target`, or toward the stage pose when
    /// `sequence_active`.
    pub fn follow(&mut self, target: &ControlTarget, sequence_active: bool) -> &RenderedPose {
        let c = &self.config;
        let t = c.follow_blend;

        let (position, yaw, scale) = if sequence_active {
            (c.stage_position, c.stage_yaw, c.stage_scale)
        } else {
            (target.position, target.yaw + c.yaw_offset, target.scale)
        };

        let p = &mut self.pose;
        p.position.x = lerp(p.position.x, position.x, t);
        p.position.y = lerp(p.position.y, position.y, t);
        p.position.z = lerp(p.position.z, position.z, t);
        // Pitch keeps following the (frozen) target even mid-sequence.
        p.pitch = lerp(p.pitch, target.pitch * c.pitch_factor, t);
        p.yaw = lerp(p.yaw, yaw, t);
        p.scale = lerp(p.scale, scale, t);
        &self.pose
    }

    pub fn status_sexp(&self) -> String {
        let p = &self.pose;
        format!(
            "(:pitch {:.3} :yaw {:.3} :position ({:.3} {:.3} {:.3}) :scale {:.3} :region \"{}\")",
            p.pitch,
            p.yaw,
            p.position.x,
            p.position.y,
            p.position.z,
            p.scale,
            self.region().label(),
        )
    }
}

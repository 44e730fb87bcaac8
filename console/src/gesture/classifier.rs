//! Per-frame hand role assignment.
//!
//! Roles are recomputed from scratch every frame from the wrist's horizontal
//! position; no identity is carried between frames.

use tracing::trace;

use super::landmarks::{DetectionFrame, Hand, HandRole};

/// Wrist x below this is the left-hand role.
pub const ROLE_SPLIT_X: f32 = 0.5;

/// At most one hand per role for a single frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedHands {
    pub left: Option<Hand>,
    pub right: Option<Hand>,
}

impl ClassifiedHands {
    pub fn both(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    pub fn none(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    pub fn get(&self, role: HandRole) -> Option<&Hand> {
        match role {
            HandRole::Left => self.left.as_ref(),
            HandRole::Right => self.right.as_ref(),
        }
    }

    /// Present hands, left first.
    pub fn iter(&self) -> impl Iterator<Item = &Hand> {
        self.left.iter().chain(self.right.iter())
    }
}

/// Role a single hand takes based on its wrist position.
pub fn role_for(hand: &Hand) -> HandRole {
    if hand.wrist().x < ROLE_SPLIT_X {
        HandRole::Left
    } else {
        HandRole::Right
    }
}

/// Assign each hand of the frame to a role.  When two hands land on the same
/// side the later one in detector order replaces the earlier one.
pub fn classify(frame: &DetectionFrame) -> ClassifiedHands {
    let mut out = ClassifiedHands::default();
    for hand in &frame.hands {
        let role = role_for(hand);
        let slot = match role {
            HandRole::Left => &mut out.left,
            HandRole::Right => &mut out.right,
        };
        if slot.is_some() {
            trace!("two hands classified {}, keeping the later one", role.as_str());
        }
        *slot = Some(hand.clone());
    }
    out
}

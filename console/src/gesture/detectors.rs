//! Stateless per-hand gesture predicates.
//!
//! Everything here is a pure function of one `Hand`; hysteresis and other
//! memory live in the manipulation controller.  All distances are measured in
//! the image plane (x, y only).

use super::landmarks::{Hand, HandLandmark};
use super::math::distance;

/// Tip must be this many times farther from the wrist than its PIP joint.
pub const EXTENSION_RATIO: f32 = 1.2;
/// Extended fingers among middle/ring/pinky needed for the rotate trigger.
pub const ROTATE_TRIGGER_MIN_FINGERS: usize = 2;
/// Wrist must sit this far below the middle fingertip.
pub const UPRIGHT_MARGIN: f32 = 0.1;
/// Middle fingertip must sit this far above every other fingertip.
pub const MIDDLE_RAISE_MARGIN: f32 = 0.03;

/// Fingers that can be tested for extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    /// (tip, pip) landmark pair.
    pub fn joints(&self) -> (HandLandmark, HandLandmark) {
        match self {
            Self::Index => (HandLandmark::IndexTip, HandLandmark::IndexPip),
            Self::Middle => (HandLandmark::MiddleTip, HandLandmark::MiddlePip),
            Self::Ring => (HandLandmark::RingTip, HandLandmark::RingPip),
            Self::Pinky => (HandLandmark::PinkyTip, HandLandmark::PinkyPip),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Middle => "middle",
            Self::Ring => "ring",
            Self::Pinky => "pinky",
        }
    }
}

fn landmark_distance(hand: &Hand, a: HandLandmark, b: HandLandmark) -> f32 {
    let p = hand.get(a);
    let q = hand.get(b);
    distance(p.x, p.y, q.x, q.y)
}

/// Thumb tip to index tip.
pub fn pinch_distance(hand: &Hand) -> f32 {
    landmark_distance(hand, HandLandmark::ThumbTip, HandLandmark::IndexTip)
}

/// Wrist to middle-finger MCP; a proxy for how close the hand is to the camera.
pub fn hand_span(hand: &Hand) -> f32 {
    landmark_distance(hand, HandLandmark::Wrist, HandLandmark::MiddleMcp)
}

/// Straightness heuristic tolerant of in-plane rotation.
pub fn is_finger_extended(hand: &Hand, tip: HandLandmark, pip: HandLandmark) -> bool {
    landmark_distance(hand, HandLandmark::Wrist, tip)
        > landmark_distance(hand, HandLandmark::Wrist, pip) * EXTENSION_RATIO
}

/// Number of middle/ring/pinky fingers currently extended.
pub fn extended_trigger_fingers(hand: &Hand) -> usize {
    [Finger::Middle, Finger::Ring, Finger::Pinky]
        .iter()
        .filter(|f| {
            let (tip, pip) = f.joints();
            is_finger_extended(hand, tip, pip)
        })
        .count()
}

/// The "OK" sign layered on top of a grab.  Only meaningful while grabbing;
/// the caller owns that condition.
pub fn is_rotate_trigger(hand: &Hand) -> bool {
    extended_trigger_fingers(hand) >= ROTATE_TRIGGER_MIN_FINGERS
}

/// Upright hand with the middle finger alone raised.  Arms the elimination
/// sequence.
pub fn is_offensive_gesture(hand: &Hand) -> bool {
    let tip_y = hand.get(HandLandmark::MiddleTip).y;
    let wrist_y = hand.wrist().y;

    let upright = wrist_y > tip_y + UPRIGHT_MARGIN;
    let highest = [
        HandLandmark::IndexTip,
        HandLandmark::RingTip,
        HandLandmark::PinkyTip,
    ]
    .iter()
    .all(|&other| tip_y < hand.get(other).y - MIDDLE_RAISE_MARGIN);

    upright && highest
}

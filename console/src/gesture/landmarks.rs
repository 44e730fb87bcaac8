//! Hand landmark data model.
//!
//! Models the 21 landmarks per hand produced by the camera hand-landmark
//! detector.  Coordinates are normalized to the camera frame: x and y in
//! [0, 1] with y growing downward, z a relative depth.

// ── Landmark definitions ───────────────────────────────────

/// The 21 hand landmarks, in detector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandLandmark {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Total number of landmarks per hand.
pub const LANDMARK_COUNT: usize = 21;

impl HandLandmark {
    /// Position of this landmark in the detector's output (0-20).
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// String representation for HUD and logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wrist => "wrist",
            Self::ThumbCmc => "thumb-cmc",
            Self::ThumbMcp => "thumb-mcp",
            Self::ThumbIp => "thumb-ip",
            Self::ThumbTip => "thumb-tip",
            Self::IndexMcp => "index-mcp",
            Self::IndexPip => "index-pip",
            Self::IndexDip => "index-dip",
            Self::IndexTip => "index-tip",
            Self::MiddleMcp => "middle-mcp",
            Self::MiddlePip => "middle-pip",
            Self::MiddleDip => "middle-dip",
            Self::MiddleTip => "middle-tip",
            Self::RingMcp => "ring-mcp",
            Self::RingPip => "ring-pip",
            Self::RingDip => "ring-dip",
            Self::RingTip => "ring-tip",
            Self::PinkyMcp => "pinky-mcp",
            Self::PinkyPip => "pinky-pip",
            Self::PinkyDip => "pinky-dip",
            Self::PinkyTip => "pinky-tip",
        }
    }
}

// ── Role ───────────────────────────────────────────────────

/// Which control role a hand plays in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandRole {
    Left,
    Right,
}

impl HandRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

// ── Landmark / Hand ────────────────────────────────────────

/// One normalized landmark.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// All 21 landmarks of one detected hand.  Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Hand {
    landmarks: [Landmark; LANDMARK_COUNT],
}

impl Hand {
    pub fn new(landmarks: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { landmarks }
    }

    /// Build a hand from detector output.  Returns `None` unless exactly
    /// 21 points are supplied.
    pub fn from_points(points: &[Landmark]) -> Option<Self> {
        let landmarks: [Landmark; LANDMARK_COUNT] = points.try_into().ok()?;
        Some(Self { landmarks })
    }

    /// Landmark lookup by name.
    pub fn get(&self, landmark: HandLandmark) -> Landmark {
        self.landmarks[landmark.index()]
    }

    pub fn wrist(&self) -> Landmark {
        self.get(HandLandmark::Wrist)
    }

    pub fn landmarks(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.landmarks
    }

    /// Copy of this hand with one landmark moved.
    pub fn with(mut self, landmark: HandLandmark, x: f32, y: f32) -> Self {
        self.landmarks[landmark.index()] = Landmark::new(x, y, 0.0);
        self
    }
}

/// Hands produced by the detector for one video frame (0-2).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionFrame {
    pub hands: Vec<Hand>,
}

impl DetectionFrame {
    pub fn new(hands: Vec<Hand>) -> Self {
        Self { hands }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.hands.is_empty()
    }
}

// ── Test helpers ───────────────────────────────────────────

/// A relaxed, half-open hand with its wrist at (`wrist_x`, `wrist_y`).
///
/// Fingers point up the frame, thumb and index are spread wide (no pinch),
/// the middle finger is not raised above its neighbours, and middle, ring and
/// pinky are curled back toward the palm.
#[cfg(test)]
pub(crate) fn test_hand(wrist_x: f32, wrist_y: f32) -> Hand {
    use HandLandmark::*;

    let offsets: [(HandLandmark, f32, f32); LANDMARK_COUNT] = [
        (Wrist, 0.0, 0.0),
        (ThumbCmc, -0.04, -0.03),
        (ThumbMcp, -0.07, -0.06),
        (ThumbIp, -0.09, -0.09),
        (ThumbTip, -0.11, -0.12),
        (IndexMcp, -0.03, -0.12),
        (IndexPip, -0.03, -0.17),
        (IndexDip, -0.03, -0.19),
        (IndexTip, -0.03, -0.21),
        (MiddleMcp, 0.0, -0.12),
        (MiddlePip, 0.0, -0.17),
        (MiddleDip, 0.0, -0.15),
        (MiddleTip, 0.0, -0.13),
        (RingMcp, 0.03, -0.11),
        (RingPip, 0.03, -0.16),
        (RingDip, 0.03, -0.14),
        (RingTip, 0.03, -0.12),
        (PinkyMcp, 0.06, -0.10),
        (PinkyPip, 0.06, -0.14),
        (PinkyDip, 0.06, -0.12),
        (PinkyTip, 0.06, -0.11),
    ];

    let mut landmarks = [Landmark::default(); LANDMARK_COUNT];
    for (joint, dx, dy) in offsets {
        landmarks[joint.index()] = Landmark::new(wrist_x + dx, wrist_y + dy, 0.0);
    }
    Hand::new(landmarks)
}

/// `test_hand` with the thumb tip 0.02 from the index tip.
#[cfg(test)]
pub(crate) fn test_pinch_hand(wrist_x: f32, wrist_y: f32) -> Hand {
    test_hand(wrist_x, wrist_y).with(HandLandmark::ThumbTip, wrist_x - 0.01, wrist_y - 0.21)
}

/// Pinching hand with middle, ring and pinky straightened (the "OK" sign).
#[cfg(test)]
pub(crate) fn test_ok_hand(wrist_x: f32, wrist_y: f32) -> Hand {
    test_pinch_hand(wrist_x, wrist_y)
        .with(HandLandmark::MiddleTip, wrist_x, wrist_y - 0.25)
        .with(HandLandmark::RingTip, wrist_x + 0.03, wrist_y - 0.24)
        .with(HandLandmark::PinkyTip, wrist_x + 0.06, wrist_y - 0.21)
}

/// Upright hand with only the middle finger raised.
#[cfg(test)]
pub(crate) fn test_offensive_hand(wrist_x: f32, wrist_y: f32) -> Hand {
    test_hand(wrist_x, wrist_y).with(HandLandmark::MiddleTip, wrist_x, wrist_y - 0.30)
}

// ── Tests ──────────────────────────────────────────────────

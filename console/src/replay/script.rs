//! Replay script parsing and playback.
//!
//! ```text
//! ((:hands (HAND ...))            ; one frame
//!  (:stale t)                     ; a tick with nothing new
//!  (:repeat 30 :hands (HAND)))    ; the same frame 30 times
//! ```
//!
//! `HAND` is a list of 21 `(x y)` or `(x y z)` points in landmark order,
//! normalized to the camera image.  `(:hands ())` is a frame with no hands.

use std::path::Path;

use lexpr::Value;
use tracing::{debug, info};

use super::plist::{as_number, get_bool, get_int, get_value, list_items};
use crate::gesture::landmarks::{DetectionFrame, Hand, Landmark, LANDMARK_COUNT};
use crate::gesture::orchestrator::HandDetector;

/// Upper bound on ticks in one script after repeats are expanded
/// (about an hour at 30 Hz).
pub const MAX_SCRIPT_TICKS: usize = 108_000;

/// Hands a detector reports per frame at most.
const MAX_HANDS: usize = 2;

/// One tick's worth of detector output.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayEntry {
    Frame(DetectionFrame),
    Stale,
}

fn parse_point(value: &Value) -> Option<Landmark> {
    let coords = list_items(value)?;
    let nums: Option<Vec<f64>> = coords.into_iter().map(as_number).collect();
    match nums?.as_slice() {
        [x, y] => Some(Landmark::new(*x as f32, *y as f32, 0.0)),
        [x, y, z] => Some(Landmark::new(*x as f32, *y as f32, *z as f32)),
        _ => None,
    }
}

fn parse_hand(value: &Value, entry: usize, index: usize) -> anyhow::Result<Hand> {
    let points = list_items(value)
        .ok_or_else(|| anyhow::anyhow!("entry {} hand {}: not a list of points", entry, index))?;
    if points.len() != LANDMARK_COUNT {
        return Err(anyhow::anyhow!(
            "entry {} hand {}: expected {} points, got {}",
            entry,
            index,
            LANDMARK_COUNT,
            points.len()
        ));
    }

    let mut landmarks = Vec::with_capacity(LANDMARK_COUNT);
    for (i, point) in points.into_iter().enumerate() {
        let lm = parse_point(point).ok_or_else(|| {
            anyhow::anyhow!("entry {} hand {} point {}: expected (x y [z]), got {}", entry, index, i, point)
        })?;
        landmarks.push(lm);
    }
    Hand::from_points(&landmarks)
        .ok_or_else(|| anyhow::anyhow!("entry {} hand {}: bad landmark count", entry, index))
}

fn parse_entry(value: &Value, entry: usize) -> anyhow::Result<(usize, ReplayEntry)> {
    let repeat = match get_value(value, "repeat") {
        None => 1,
        Some(_) => match get_int(value, "repeat") {
            Some(n) if n >= 1 && n as u64 <= MAX_SCRIPT_TICKS as u64 => n as usize,
            Some(n) if n >= 1 => {
                return Err(anyhow::anyhow!(
                    "entry {}: :repeat {} exceeds the limit of {} ticks",
                    entry,
                    n,
                    MAX_SCRIPT_TICKS
                ))
            }
            _ => {
                return Err(anyhow::anyhow!(
                    "entry {}: :repeat must be a positive integer",
                    entry
                ))
            }
        },
    };

    if get_bool(value, "stale").unwrap_or(false) {
        return Ok((repeat, ReplayEntry::Stale));
    }

    let hands_value = get_value(value, "hands")
        .ok_or_else(|| anyhow::anyhow!("entry {}: expected :hands or :stale", entry))?;
    let hand_values = list_items(hands_value)
        .ok_or_else(|| anyhow::anyhow!("entry {}: :hands must be a list", entry))?;
    if hand_values.len() > MAX_HANDS {
        return Err(anyhow::anyhow!(
            "entry {}: {} hands in one frame, at most {} allowed",
            entry,
            hand_values.len(),
            MAX_HANDS
        ));
    }

    let hands = hand_values
        .into_iter()
        .enumerate()
        .map(|(i, h)| parse_hand(h, entry, i))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok((repeat, ReplayEntry::Frame(DetectionFrame::new(hands))))
}

/// Parse a replay script into one entry per tick, with repeats expanded.
pub fn parse_script(text: &str) -> anyhow::Result<Vec<ReplayEntry>> {
    let value =
        lexpr::from_str(text).map_err(|e| anyhow::anyhow!("malformed replay script: {}", e))?;
    let items =
        list_items(&value).ok_or_else(|| anyhow::anyhow!("replay script must be a list"))?;

    let mut entries = Vec::new();
    for (i, item) in items.into_iter().enumerate() {
        let (repeat, entry) = parse_entry(item, i)?;
        if entries.len() + repeat > MAX_SCRIPT_TICKS {
            return Err(anyhow::anyhow!(
                "entry {}: replay script exceeds the limit of {} ticks",
                i,
                MAX_SCRIPT_TICKS
            ));
        }
        entries.extend(std::iter::repeat(entry).take(repeat));
    }
    if entries.is_empty() {
        return Err(anyhow::anyhow!("replay script has no entries"));
    }
    Ok(entries)
}

/// Read and parse a replay script from disk.
pub fn load_script(path: &Path) -> anyhow::Result<Vec<ReplayEntry>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read replay script {:?}: {}", path, e))?;
    parse_script(&text)
}

// ── Detector ───────────────────────────────────────────────

/// Plays a parsed script back one entry per `detect` call.
#[derive(Debug)]
pub struct ScriptedDetector {
    name: String,
    entries: Vec<ReplayEntry>,
    cursor: usize,
    looping: bool,
    exhausted_logged: bool,
}

impl ScriptedDetector {
    pub fn new(name: impl Into<String>, entries: Vec<ReplayEntry>, looping: bool) -> Self {
        Self {
            name: name.into(),
            entries,
            cursor: 0,
            looping,
            exhausted_logged: false,
        }
    }

    pub fn from_file(path: &Path, looping: bool) -> anyhow::Result<Self> {
        let entries = load_script(path)?;
        info!("loaded replay script {:?} ({} entries)", path, entries.len());
        Ok(Self::new(path.display().to_string(), entries, looping))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True once every entry has been played and the script does not loop.
    pub fn is_exhausted(&self) -> bool {
        !self.looping && self.cursor >= self.entries.len()
    }
}

impl HandDetector for ScriptedDetector {
    fn name(&self) -> &str {
        &self.name
    }

    fn detect(&mut self, _now_s: f64) -> Option<DetectionFrame> {
        if self.cursor >= self.entries.len() {
            if !self.looping || self.entries.is_empty() {
                if !self.exhausted_logged {
                    info!("replay script {} exhausted", self.name);
                    self.exhausted_logged = true;
                }
                return None;
            }
            debug!("replay script {} looping", self.name);
            self.cursor = 0;
        }

        let entry = &self.entries[self.cursor];
        self.cursor += 1;
        match entry {
            ReplayEntry::Frame(frame) => Some(frame.clone()),
            ReplayEntry::Stale => None,
        }
    }
}

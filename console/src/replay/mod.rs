//! Recorded landmark input.
//!
//! A replay script is an s-expression list of frame entries that a
//! `ScriptedDetector` plays back one per tick, standing in for a live camera.

pub mod plist;
pub mod script;

pub use script::{parse_script, ReplayEntry, ScriptedDetector};

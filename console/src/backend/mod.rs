//! Host loop: drives the frame orchestrator from a calloop timer.

pub mod headless;

pub use headless::{run, HeadlessConfig, TracingEffects};

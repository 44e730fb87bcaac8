//! HoloNet console: hand-gesture control of a holographic globe.
//!
//! The `gesture` module is the interaction core and never fails; `replay`
//! feeds it recorded landmark frames and `backend` drives it from an event
//! loop.

pub mod backend;
pub mod gesture;
pub mod replay;
